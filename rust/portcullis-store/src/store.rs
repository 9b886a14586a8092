use std::fmt::Write as FmtWrite;
use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::io::AsyncRead;

use crate::{ResourceMetadata, StoreError};

mod fs;
pub use fs::*;

mod memory;
pub use memory::*;

/// An open handle onto a resource's bytes, consumed at most once.
pub type ByteSource = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// A [ResourceStore] resolves content identifiers to resource metadata and
/// bytes.
///
/// Implementations are externally synchronized; every method takes `&self`
/// and may be called concurrently from independent requests.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Resolves the metadata stored against `identifier`.
    async fn lookup(&self, identifier: &str) -> Result<Option<ResourceMetadata>, StoreError>;

    /// Opens the byte content stored against `identifier`.
    async fn open(&self, identifier: &str) -> Result<Option<ByteSource>, StoreError>;

    /// Whether [ResourceStore::resolve_path] can ever return a path.
    ///
    /// Delivery modes that delegate byte transfer to a downstream proxy
    /// refuse to operate against a store that answers `false` here.
    fn resolves_filesystem_paths(&self) -> bool {
        false
    }

    /// Resolves `identifier` to the blob's path on the local filesystem,
    /// `None` when the blob does not currently exist on disk.
    async fn resolve_path(&self, _identifier: &str) -> Result<Option<PathBuf>, StoreError> {
        Ok(None)
    }
}

/// Derives the content identifier for a byte sequence: its lowercase-hex
/// SHA-256 digest.
pub fn derive_identifier(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let mut identifier = String::with_capacity(digest.len() * 2);
    for byte in digest {
        write!(identifier, "{byte:02x}").expect("writing to a String is infallible");
    }
    identifier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_derives_the_documented_identifier() {
        // SHA-256 of the empty input, a fixed point of the scheme.
        assert_eq!(
            derive_identifier(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(derive_identifier(b"portcullis").len(), 64);
    }
}
