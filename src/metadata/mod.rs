//! Metadata source module.
//!
//! Abstractions for fetching entity and attribute metadata from the query
//! service. The transport itself lives behind [`MetadataSource`]; this module
//! owns the typed records, name validation and parallel batching.

mod source;
mod types;

pub use source::{MetadataError, MetadataResult, MetadataSource};
pub use types::{AttributeKind, AttributeMetadata, ChartMetadata, EntityMetadata, OptionLabel};
