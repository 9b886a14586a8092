#![warn(missing_docs)]

//! Lookup-by-identifier access to protected resources.
//!
//! A [ResourceStore] maps a content identifier to [ResourceMetadata] and to
//! the resource's bytes. Two backends are provided: a content-addressed
//! [FileSystemResourceStore] for production use and an in-memory
//! [MemoryResourceStore] for tests and embedding.
//!
//! Resources are write-once: `put` derives the identifier from the content
//! itself (lowercase-hex SHA-256), so an identifier permanently denotes one
//! byte sequence.

mod error;
pub use error::*;

mod metadata;
pub use metadata::*;

mod store;
pub use store::*;
