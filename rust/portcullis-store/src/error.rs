use thiserror::Error;

/// The common error type used by this crate
#[derive(Error, Debug)]
pub enum StoreError {
    /// An error that occurs when working with the storage substrate
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The identifier is not a value this store could ever have produced
    #[error("Invalid resource identifier: {0}")]
    InvalidIdentifier(String),
}
