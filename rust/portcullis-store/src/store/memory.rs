use std::{collections::HashMap, io::Cursor, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use crate::{ByteSource, ResourceMetadata, ResourceStore, StoreError, derive_identifier};

/// A trivial implementation of [ResourceStore] - backed by a [HashMap] -
/// where all resources are kept in memory and never persisted.
///
/// It cannot resolve filesystem paths, so it is incompatible with
/// proxy-redirect delivery modes.
#[derive(Clone, Default)]
pub struct MemoryResourceStore {
    entries: Arc<RwLock<HashMap<String, (ResourceMetadata, Bytes)>>>,
}

impl MemoryResourceStore {
    /// Stores `content` under its derived identifier and returns the
    /// identifier.
    pub async fn put(
        &self,
        filename: impl Into<String>,
        media_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> String {
        let content = content.into();
        let identifier = derive_identifier(&content);
        let metadata = ResourceMetadata {
            identifier: identifier.clone(),
            media_type: media_type.into(),
            filename: filename.into(),
            byte_length: content.len() as u64,
        };

        let mut entries = self.entries.write().await;
        entries.insert(identifier.clone(), (metadata, content));
        identifier
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn lookup(&self, identifier: &str) -> Result<Option<ResourceMetadata>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries.get(identifier).map(|(metadata, _)| metadata.clone()))
    }

    async fn open(&self, identifier: &str) -> Result<Option<ByteSource>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(identifier)
            .map(|(_, content)| Box::new(Cursor::new(content.to_vec())) as ByteSource))
    }
}
