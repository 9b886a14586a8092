use portcullis_common::{AuthorizationContext, Clock};
use portcullis_token::{Token, TokenCodec, TokenError};

use crate::DenialReason;

/// A failed verification: the reason, plus the decoded token when decoding
/// got far enough to produce one, so that denial notifications can carry it.
#[derive(Clone, Debug)]
pub struct Denial {
    /// The decoded token, absent for signature/shape failures.
    pub token: Option<Token>,

    /// Why verification failed.
    pub reason: DenialReason,
}

/// Runs the ordered verification pipeline against a signed payload and the
/// live request's authorization context.
///
/// The stages run strictly in order and short-circuit:
///
/// 1. signature and shape, via the codec - nothing downstream ever sees an
///    unauthenticated payload;
/// 2. expiry, against a single reading of the injected clock;
/// 3. authorization, judged by whichever condition the token carries (role
///    first when both are present, as the narrower explicit grant).
///
/// Verification is a pure function of its inputs; notification of denials
/// is the caller's concern.
pub struct TokenVerifier<C> {
    codec: TokenCodec,
    clock: C,
}

impl<C> TokenVerifier<C>
where
    C: Clock,
{
    /// Creates a verifier decoding with `codec` and reading time from
    /// `clock`.
    pub fn new(codec: TokenCodec, clock: C) -> Self {
        Self { codec, clock }
    }

    /// Verifies `signed`, returning the decoded token on success.
    pub fn verify(
        &self,
        signed: &str,
        auth: &dyn AuthorizationContext,
    ) -> Result<Token, Denial> {
        let token = self.codec.decode(signed).map_err(|error| Denial {
            token: None,
            reason: match error {
                TokenError::InvalidSignature => DenialReason::InvalidSignature,
                TokenError::MalformedToken(detail) => DenialReason::MalformedToken(detail),
            },
        })?;

        // One clock reading per verification; a token is either expired for
        // the whole pipeline run or not at all.
        let now = self.clock.now();
        if let Some(expires_at) = token.expiration_date_time {
            if expires_at <= now {
                return Err(Denial {
                    reason: DenialReason::Expired { at: expires_at },
                    token: Some(token),
                });
            }
        }

        if let Some(required) = &token.privileged_role {
            if !auth.has_role(required) {
                return Err(Denial {
                    reason: DenialReason::RoleMismatch {
                        required: required.clone(),
                        held: auth.roles(),
                    },
                    token: Some(token.clone()),
                });
            }
        } else if let Some(bound_hash) = &token.security_context_hash {
            if *bound_hash != auth.context_hash() {
                return Err(Denial {
                    reason: DenialReason::ContextMismatch,
                    token: Some(token.clone()),
                });
            }
        }

        Ok(token)
    }
}
