use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{ByteSource, ResourceMetadata, ResourceStore, StoreError, derive_identifier};

/// A content-addressed [ResourceStore] backed by a directory tree.
///
/// A blob with identifier `h` is stored at `root/h[0]/h[1]/h[2]/h[3]/h`,
/// with its metadata document in a sibling file carrying a `.json` suffix.
/// The four-level fan-out keeps directory sizes bounded for large stores.
///
/// Supply an absolute `root_dir` when pairing this store with a
/// proxy-redirect delivery mode; resolved paths are handed to the proxy
/// verbatim.
#[derive(Clone, Debug)]
pub struct FileSystemResourceStore {
    root_dir: PathBuf,
}

impl FileSystemResourceStore {
    /// Creates a store rooted at `root_dir`, creating it if necessary.
    pub async fn new<Pathlike>(root_dir: Pathlike) -> Result<Self, StoreError>
    where
        Pathlike: AsRef<Path>,
    {
        let root_dir = root_dir.as_ref().to_owned();
        tokio::fs::create_dir_all(&root_dir)
            .await
            .map_err(|error| StoreError::Backend(format!("{error}")))?;
        Ok(Self { root_dir })
    }

    /// Stores `content` under its derived identifier, recording the given
    /// filename and media type, and returns the identifier. Storing the
    /// same bytes twice is an idempotent overwrite.
    pub async fn put(
        &self,
        filename: impl Into<String>,
        media_type: impl Into<String>,
        content: &[u8],
    ) -> Result<String, StoreError> {
        let identifier = derive_identifier(content);
        let metadata = ResourceMetadata {
            identifier: identifier.clone(),
            media_type: media_type.into(),
            filename: filename.into(),
            byte_length: content.len() as u64,
        };

        let blob_path = self.blob_path(&identifier)?;
        let parent = blob_path
            .parent()
            .ok_or_else(|| StoreError::Backend("blob path has no parent".to_string()))?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|error| StoreError::Backend(format!("{error}")))?;

        tokio::fs::write(&blob_path, content)
            .await
            .map_err(|error| StoreError::Backend(format!("{error}")))?;

        let document = serde_json::to_vec(&metadata)
            .map_err(|error| StoreError::Backend(format!("{error}")))?;
        tokio::fs::write(self.metadata_path(&identifier)?, document)
            .await
            .map_err(|error| StoreError::Backend(format!("{error}")))?;

        Ok(identifier)
    }

    fn blob_path(&self, identifier: &str) -> Result<PathBuf, StoreError> {
        // Identifiers are hex digests; anything else would escape the root
        // when joined into a path.
        if identifier.len() < 4 || !identifier.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StoreError::InvalidIdentifier(identifier.to_string()));
        }

        let mut path = self.root_dir.clone();
        for shard in identifier.chars().take(4) {
            path.push(shard.to_string());
        }
        path.push(identifier);
        Ok(path)
    }

    fn metadata_path(&self, identifier: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.blob_path(identifier)?.into_os_string();
        path.push(".json");
        Ok(PathBuf::from(path))
    }
}

#[async_trait]
impl ResourceStore for FileSystemResourceStore {
    async fn lookup(&self, identifier: &str) -> Result<Option<ResourceMetadata>, StoreError> {
        let path = self.metadata_path(identifier)?;
        if !path.exists() {
            return Ok(None);
        }

        let document = tokio::fs::read(path)
            .await
            .map_err(|error| StoreError::Backend(format!("{error}")))?;
        let metadata = serde_json::from_slice(&document)
            .map_err(|error| StoreError::Backend(format!("{error}")))?;
        Ok(Some(metadata))
    }

    async fn open(&self, identifier: &str) -> Result<Option<ByteSource>, StoreError> {
        let path = self.blob_path(identifier)?;
        if !path.exists() {
            return Ok(None);
        }

        let file = tokio::fs::File::open(path)
            .await
            .map_err(|error| StoreError::Backend(format!("{error}")))?;
        Ok(Some(Box::new(file)))
    }

    fn resolves_filesystem_paths(&self) -> bool {
        true
    }

    async fn resolve_path(&self, identifier: &str) -> Result<Option<PathBuf>, StoreError> {
        let path = self.blob_path(identifier)?;
        Ok(path.exists().then_some(path))
    }
}
