use chrono::{DateTime, Utc};
use hyper::StatusCode;
use portcullis_store::StoreError;
use thiserror::Error;

/// Why a request was denied.
///
/// The distinction between reasons exists for server-side audit only;
/// callers observe a single undifferentiated "access denied" response so
/// that a rejected token leaks nothing about how close it was to passing.
#[derive(Clone, Debug, PartialEq)]
pub enum DenialReason {
    /// The integrity tag was missing, malformed, or did not match.
    InvalidSignature,

    /// The payload behind a valid tag was not a well-formed token.
    MalformedToken(String),

    /// The token's expiry instant has passed.
    Expired {
        /// The instant the token expired at.
        at: DateTime<Utc>,
    },

    /// The token requires a role the caller does not hold.
    RoleMismatch {
        /// The role the token was signed for.
        required: String,
        /// The roles the caller does hold, for diagnostics.
        held: Vec<String>,
    },

    /// The token is bound to a session fingerprint other than the caller's.
    ContextMismatch,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::InvalidSignature => write!(f, "invalid integrity tag"),
            DenialReason::MalformedToken(detail) => write!(f, "malformed token: {detail}"),
            DenialReason::Expired { at } => {
                write!(f, "token expired at {}", at.to_rfc3339())
            }
            DenialReason::RoleMismatch { required, held } => write!(
                f,
                "signed for role \"{required}\" but only the following roles are authenticated: {}",
                held.join(", ")
            ),
            DenialReason::ContextMismatch => write!(f, "security context hash mismatch"),
        }
    }
}

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The token failed verification; terminal for the request.
    #[error("Access denied: {0}")]
    AccessDenied(DenialReason),

    /// The token named a resource the store does not hold.
    #[error("Could not find resource with identifier \"{0}\"")]
    ResourceNotFound(String),

    /// The gateway's static configuration cannot serve this request.
    #[error("Gateway misconfigured: {0}")]
    Misconfigured(String),

    /// The resource store failed while resolving or reading.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GatewayError {
    /// The HTTP status this error translates to at the transport boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::AccessDenied(_) => StatusCode::FORBIDDEN,
            GatewayError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Misconfigured(_) | GatewayError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The response body text exposed to the caller. Deliberately uniform
    /// within each error family: the denial sub-reason stays server side.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::AccessDenied(_) => "Access denied",
            GatewayError::ResourceNotFound(_) => "Not found",
            GatewayError::Misconfigured(_) | GatewayError::Store(_) => "Internal server error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_maps_every_error_family_to_a_status() {
        assert_eq!(
            GatewayError::AccessDenied(DenialReason::ContextMismatch).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::ResourceNotFound("cafe".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::Misconfigured("no strategy".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn it_never_exposes_the_denial_sub_reason() {
        let reasons = [
            DenialReason::InvalidSignature,
            DenialReason::MalformedToken("bad json".into()),
            DenialReason::Expired { at: Utc::now() },
            DenialReason::RoleMismatch {
                required: "editor".into(),
                held: vec!["viewer".into()],
            },
            DenialReason::ContextMismatch,
        ];

        for reason in reasons {
            assert_eq!(
                GatewayError::AccessDenied(reason).public_message(),
                "Access denied"
            );
        }
    }
}
