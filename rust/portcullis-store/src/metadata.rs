use serde::{Deserialize, Serialize};

/// Descriptive facts about a stored resource, owned by the store that
/// resolved it and read-only everywhere else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Content identifier of the resource.
    pub identifier: String,

    /// Media type the resource should be served with.
    pub media_type: String,

    /// Filename to suggest to downloading clients.
    pub filename: String,

    /// Exact size of the resource in bytes.
    pub byte_length: u64,
}
