use chrono::Duration;
use portcullis_common::{AuthorizationContext, Clock};
use url::Url;

use crate::{TOKEN_QUERY_PARAM, Token, TokenCodec, TokenError};

/// Per-link issuance policy.
///
/// Exactly one condition ends up on the issued token, resolved in the order
/// role, session binding, expiry (see [TokenIssuer::issue]).
#[derive(Clone, Debug)]
pub struct IssuerPolicy {
    /// Require the verifying caller to hold this role.
    pub required_role: Option<String>,

    /// Bind the token to the issuing caller's session fingerprint. On by
    /// default; only consulted when no role is required.
    pub bind_to_session: bool,

    /// Expire the token this long after issuance. Only consulted when the
    /// token ends up neither role- nor session-bound.
    pub expires_in: Option<Duration>,
}

impl Default for IssuerPolicy {
    fn default() -> Self {
        Self {
            required_role: None,
            bind_to_session: true,
            expires_in: None,
        }
    }
}

impl IssuerPolicy {
    /// A policy producing a token that never expires and binds to nothing:
    /// the link is usable by anyone who obtains it.
    pub fn public() -> Self {
        Self {
            bind_to_session: false,
            ..Self::default()
        }
    }

    /// A policy producing a token that expires `lifetime` after issuance.
    pub fn expiring(lifetime: Duration) -> Self {
        Self {
            bind_to_session: false,
            expires_in: Some(lifetime),
            ..Self::default()
        }
    }

    /// A policy producing a token bound to possession of `role`.
    pub fn for_role(role: impl Into<String>) -> Self {
        Self {
            required_role: Some(role.into()),
            ..Self::default()
        }
    }
}

/// Builds, signs and renders tokens into callable URLs.
///
/// The issuer holds the signing codec, the clock, the base URL under which
/// the gateway is mounted, and an optional set of exempt roles: callers
/// holding any exempt role are not session-bound even under a
/// session-binding policy, so that links they generate (typically for
/// handing to third parties) outlive their own session.
pub struct TokenIssuer<C> {
    codec: TokenCodec,
    clock: C,
    base_url: Url,
    exempt_roles: Vec<String>,
}

impl<C> TokenIssuer<C>
where
    C: Clock,
{
    /// Creates an issuer rendering URLs under `base_url`.
    pub fn new(codec: TokenCodec, clock: C, base_url: Url) -> Self {
        Self {
            codec,
            clock,
            base_url,
            exempt_roles: Vec::new(),
        }
    }

    /// Declares roles whose holders are exempt from session binding.
    pub fn with_exempt_roles(
        mut self,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.exempt_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Issues a signed URL for `resource_identifier` under `policy`.
    ///
    /// Policy resolution, first match wins:
    ///
    /// 1. a required role is embedded as the token's role condition;
    /// 2. session binding (unless opted out, or the caller holds an exempt
    ///    role) embeds the caller's current fingerprint;
    /// 3. a lifetime embeds an expiry instant relative to the clock;
    /// 4. otherwise the token carries only the resource identifier.
    pub fn issue(
        &self,
        resource_identifier: &str,
        policy: &IssuerPolicy,
        auth: &dyn AuthorizationContext,
    ) -> Result<Url, TokenError> {
        let token = self.resolve(resource_identifier, policy, auth);
        let signed = self.codec.encode(&token)?;

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(TOKEN_QUERY_PARAM, &signed);
        Ok(url)
    }

    fn resolve(
        &self,
        resource_identifier: &str,
        policy: &IssuerPolicy,
        auth: &dyn AuthorizationContext,
    ) -> Token {
        let token = Token::for_resource(resource_identifier);

        if let Some(role) = &policy.required_role {
            token.requiring_role(role.clone())
        } else if policy.bind_to_session && !self.session_exempt(auth) {
            token.bound_to_context(auth.context_hash())
        } else if let Some(lifetime) = policy.expires_in {
            token.expiring_at(self.clock.now() + lifetime)
        } else {
            token
        }
    }

    fn session_exempt(&self, auth: &dyn AuthorizationContext) -> bool {
        self.exempt_roles.iter().any(|role| auth.has_role(role))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use portcullis_common::{FixedClock, StaticAuthorizationContext};

    use super::*;
    use crate::Signer;

    fn issuer() -> TokenIssuer<FixedClock> {
        TokenIssuer::new(
            TokenCodec::new(Signer::new(b"top secret")),
            FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 7, 5, 48, 59).unwrap()),
            "https://example.com/".parse().unwrap(),
        )
    }

    fn decode(url: &Url) -> Token {
        let (_, signed) = url
            .query_pairs()
            .find(|(key, _)| key == TOKEN_QUERY_PARAM)
            .expect("token parameter present");
        TokenCodec::new(Signer::new(b"top secret"))
            .decode(&signed)
            .expect("token decodes")
    }

    #[test]
    fn it_prefers_a_required_role_over_everything_else() {
        let auth = StaticAuthorizationContext::new("fingerprint", ["editor"]);
        let policy = IssuerPolicy {
            required_role: Some("editor".into()),
            bind_to_session: true,
            expires_in: Some(Duration::hours(1)),
        };

        let token = decode(&issuer().issue("0a1b2c3d", &policy, &auth).unwrap());

        assert_eq!(token.privileged_role.as_deref(), Some("editor"));
        assert_eq!(token.security_context_hash, None);
        assert_eq!(token.expiration_date_time, None);
    }

    #[test]
    fn it_binds_to_the_session_by_default() {
        let auth = StaticAuthorizationContext::new("fingerprint", Vec::<String>::new());

        let token = decode(
            &issuer()
                .issue("0a1b2c3d", &IssuerPolicy::default(), &auth)
                .unwrap(),
        );

        assert_eq!(token.security_context_hash.as_deref(), Some("fingerprint"));
        assert_eq!(token.privileged_role, None);
    }

    #[test]
    fn it_falls_through_session_binding_for_exempt_roles() {
        let auth = StaticAuthorizationContext::new("fingerprint", ["editor"]);
        let policy = IssuerPolicy {
            expires_in: Some(Duration::hours(1)),
            ..IssuerPolicy::default()
        };

        let token = decode(
            &issuer()
                .with_exempt_roles(["editor"])
                .issue("0a1b2c3d", &policy, &auth)
                .unwrap(),
        );

        assert_eq!(token.security_context_hash, None);
        assert_eq!(
            token.expiration_date_time,
            Some(Utc.with_ymd_and_hms(2025, 5, 7, 6, 48, 59).unwrap())
        );
    }

    #[test]
    fn it_embeds_an_expiry_relative_to_the_clock() {
        let auth = StaticAuthorizationContext::anonymous();

        let token = decode(
            &issuer()
                .issue("0a1b2c3d", &IssuerPolicy::expiring(Duration::seconds(30)), &auth)
                .unwrap(),
        );

        assert_eq!(
            token.expiration_date_time,
            Some(Utc.with_ymd_and_hms(2025, 5, 7, 5, 49, 29).unwrap())
        );
    }

    #[test]
    fn it_issues_a_bare_token_for_the_public_policy() {
        let auth = StaticAuthorizationContext::new("fingerprint", ["editor"]);

        let token = decode(
            &issuer()
                .issue("0a1b2c3d", &IssuerPolicy::public(), &auth)
                .unwrap(),
        );

        assert_eq!(token, Token::for_resource("0a1b2c3d"));
    }
}
