use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the query parameter that carries a signed token. Part of the
/// stable wire contract: changing it invalidates all outstanding links.
pub const TOKEN_QUERY_PARAM: &str = "__protectedResource";

/// The authorization claim embedded in a signed URL.
///
/// A token names the resource a bearer may fetch and carries at most one of
/// three conditions: an expiry instant, a binding to the issuing caller's
/// session fingerprint, or a role the verifying caller must hold. A token
/// with none of the three is valid forever for anyone holding the link.
///
/// Tokens are immutable once issued and are never persisted server side;
/// validity is a pure function of (token, current time, current
/// authorization context). A token may be verified any number of times
/// until its condition stops holding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Content identifier of the target resource.
    pub resource_identifier: String,

    /// The token is invalid at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date_time: Option<DateTime<Utc>>,

    /// Fingerprint of the session the token is bound to; must equal the
    /// verifying caller's current fingerprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_context_hash: Option<String>,

    /// Role the verifying caller must hold. Takes precedence over
    /// `security_context_hash` should a token ever carry both.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privileged_role: Option<String>,
}

impl Token {
    /// An unconditional token for the given resource.
    pub fn for_resource(resource_identifier: impl Into<String>) -> Self {
        Self {
            resource_identifier: resource_identifier.into(),
            expiration_date_time: None,
            security_context_hash: None,
            privileged_role: None,
        }
    }

    /// Binds the token to an expiry instant.
    pub fn expiring_at(mut self, instant: DateTime<Utc>) -> Self {
        self.expiration_date_time = Some(instant);
        self
    }

    /// Binds the token to a session fingerprint.
    pub fn bound_to_context(mut self, hash: impl Into<String>) -> Self {
        self.security_context_hash = Some(hash.into());
        self
    }

    /// Binds the token to possession of a role.
    pub fn requiring_role(mut self, role: impl Into<String>) -> Self {
        self.privileged_role = Some(role.into());
        self
    }
}
