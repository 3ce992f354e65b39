//! MetadataSource trait definition.
//!
//! Abstracts the metadata service the chart builder queries before shaping a
//! category model. Implementations perform the transport; provided methods
//! add attribute-name validation and parallel fan-out, so every backend gets
//! the same batching behavior.

use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::{join_all, try_join};
use regex::Regex;
use thiserror::Error;

use crate::query::ColumnSet;

use super::types::{AttributeMetadata, ChartMetadata, EntityMetadata};

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Attribute logical names are lowercase identifiers; anything else is a
/// caller bug, rejected before it reaches the transport.
static ATTRIBUTE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Errors raised while retrieving metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// An attribute name failed the logical-name pattern check.
    #[error("invalid attribute name: '{0}'")]
    InvalidAttributeName(String),

    /// The entity is unknown to the metadata service.
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// The attribute is unknown on the entity.
    #[error("attribute not found: {entity}.{attribute}")]
    AttributeNotFound { entity: String, attribute: String },

    /// Transport-level failure.
    #[error("metadata retrieval failed: {0}")]
    Transport(String),
}

/// Async source of entity and attribute metadata.
///
/// # Example
///
/// ```ignore
/// use fetchchart::metadata::MetadataSource;
///
/// async fn example(source: &impl MetadataSource) -> MetadataResult<()> {
///     let entity = source.retrieve_entity_metadata("account").await?;
///     let attrs = source
///         .retrieve_multiple_attribute_metadata("account", &["revenue", "industrycode"])
///         .await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch metadata for one entity.
    async fn retrieve_entity_metadata(&self, entity: &str) -> MetadataResult<EntityMetadata>;

    /// Fetch metadata for one attribute of an entity.
    async fn retrieve_attribute_metadata(
        &self,
        entity: &str,
        attribute: &str,
    ) -> MetadataResult<AttributeMetadata>;

    /// Batch fetch attribute metadata.
    ///
    /// Validates every name first, then fires the per-attribute requests in
    /// parallel and joins them, failing if any failed.
    async fn retrieve_multiple_attribute_metadata(
        &self,
        entity: &str,
        attributes: &[&str],
    ) -> MetadataResult<Vec<AttributeMetadata>> {
        for name in attributes {
            if !ATTRIBUTE_NAME_PATTERN.is_match(name) {
                return Err(MetadataError::InvalidAttributeName(name.to_string()));
            }
        }

        let futures: Vec<_> = attributes
            .iter()
            .map(|name| self.retrieve_attribute_metadata(entity, name))
            .collect();
        join_all(futures).await.into_iter().collect()
    }

    /// Fetch only the attributes in `wanted` not already covered by `have`.
    /// An all-columns remainder is rejected; callers must enumerate.
    async fn retrieve_missing_attribute_metadata(
        &self,
        entity: &str,
        wanted: &ColumnSet,
        have: &ColumnSet,
    ) -> MetadataResult<Vec<AttributeMetadata>> {
        match wanted.difference(have) {
            ColumnSet::AllColumns => Err(MetadataError::Transport(
                "cannot enumerate an all-columns metadata request".into(),
            )),
            ColumnSet::Columns(names) => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                self.retrieve_multiple_attribute_metadata(entity, &refs).await
            }
        }
    }

    /// Entity and attribute metadata for one chart build, fetched as two
    /// independent requests joined when both complete.
    async fn retrieve_chart_metadata(
        &self,
        entity: &str,
        attributes: &[&str],
    ) -> MetadataResult<ChartMetadata> {
        let (entity, attributes) = try_join(
            self.retrieve_entity_metadata(entity),
            self.retrieve_multiple_attribute_metadata(entity, attributes),
        )
        .await?;
        Ok(ChartMetadata { entity, attributes })
    }
}
