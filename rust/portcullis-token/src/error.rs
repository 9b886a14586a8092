use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum TokenError {
    /// The integrity tag is missing, malformed, or does not match the
    /// payload it is attached to.
    #[error("Invalid integrity tag")]
    InvalidSignature,

    /// The payload carried a valid tag but could not be decoded into a
    /// token (bad base64, bad JSON, or a missing resource identifier).
    #[error("Malformed token payload: {0}")]
    MalformedToken(String),
}
