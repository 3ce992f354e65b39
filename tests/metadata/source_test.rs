//! Integration tests for the metadata source trait.
//!
//! A scripted in-memory source exercises the provided batching methods the
//! way a transport-backed implementation would receive them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use fetchchart::metadata::{
    AttributeKind, AttributeMetadata, EntityMetadata, MetadataError, MetadataResult,
    MetadataSource,
};
use fetchchart::query::ColumnSet;

struct ScriptedSource {
    entity: EntityMetadata,
    attributes: HashMap<String, AttributeMetadata>,
    attribute_calls: AtomicUsize,
}

impl ScriptedSource {
    fn account() -> Self {
        let mut attributes = HashMap::new();
        for (name, kind) in [
            ("revenue", AttributeKind::Money),
            ("industrycode", AttributeKind::Picklist),
            ("name", AttributeKind::String),
        ] {
            attributes.insert(
                name.to_string(),
                AttributeMetadata {
                    logical_name: name.to_string(),
                    display_name: name.to_uppercase(),
                    kind,
                    options: Vec::new(),
                },
            );
        }
        Self {
            entity: EntityMetadata {
                logical_name: "account".to_string(),
                display_name: "Account".to_string(),
                primary_id_attribute: "accountid".to_string(),
                primary_name_attribute: "name".to_string(),
            },
            attributes,
            attribute_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn retrieve_entity_metadata(&self, entity: &str) -> MetadataResult<EntityMetadata> {
        if entity == self.entity.logical_name {
            Ok(self.entity.clone())
        } else {
            Err(MetadataError::EntityNotFound(entity.to_string()))
        }
    }

    async fn retrieve_attribute_metadata(
        &self,
        entity: &str,
        attribute: &str,
    ) -> MetadataResult<AttributeMetadata> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.attributes
            .get(attribute)
            .cloned()
            .ok_or_else(|| MetadataError::AttributeNotFound {
                entity: entity.to_string(),
                attribute: attribute.to_string(),
            })
    }
}

#[tokio::test]
async fn test_batch_retrieval_preserves_request_order() {
    let source = ScriptedSource::account();
    let attrs = source
        .retrieve_multiple_attribute_metadata("account", &["industrycode", "revenue"])
        .await
        .unwrap();
    let names: Vec<_> = attrs.iter().map(|a| a.logical_name.as_str()).collect();
    assert_eq!(names, ["industrycode", "revenue"]);
}

#[tokio::test]
async fn test_invalid_attribute_name_rejected_before_transport() {
    let source = ScriptedSource::account();
    let result = source
        .retrieve_multiple_attribute_metadata("account", &["revenue", "Revenue;drop"])
        .await;
    assert_eq!(
        result,
        Err(MetadataError::InvalidAttributeName("Revenue;drop".to_string()))
    );
    // Validation failed up front, nothing reached the transport.
    assert_eq!(source.attribute_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_attribute_fails_the_batch() {
    let source = ScriptedSource::account();
    let result = source
        .retrieve_multiple_attribute_metadata("account", &["revenue", "nosuch"])
        .await;
    assert!(matches!(
        result,
        Err(MetadataError::AttributeNotFound { .. })
    ));
}

#[tokio::test]
async fn test_missing_attribute_retrieval_skips_covered_columns() {
    let source = ScriptedSource::account();
    let wanted = ColumnSet::named(["revenue", "name", "industrycode"]);
    let have = ColumnSet::named(["name"]);
    let attrs = source
        .retrieve_missing_attribute_metadata("account", &wanted, &have)
        .await
        .unwrap();
    let names: Vec<_> = attrs.iter().map(|a| a.logical_name.as_str()).collect();
    assert_eq!(names, ["revenue", "industrycode"]);
}

#[tokio::test]
async fn test_all_columns_remainder_is_rejected() {
    let source = ScriptedSource::account();
    let result = source
        .retrieve_missing_attribute_metadata(
            "account",
            &ColumnSet::AllColumns,
            &ColumnSet::named(["name"]),
        )
        .await;
    assert!(matches!(result, Err(MetadataError::Transport(_))));
}

#[tokio::test]
async fn test_chart_metadata_joins_entity_and_attributes() {
    let source = ScriptedSource::account();
    let chart = source
        .retrieve_chart_metadata("account", &["industrycode", "revenue"])
        .await
        .unwrap();
    assert_eq!(chart.entity.display_name, "Account");
    assert_eq!(chart.attributes.len(), 2);
    assert!(chart.attributes[1].kind.is_numeric());
}

#[tokio::test]
async fn test_unknown_entity_fails_chart_metadata() {
    let source = ScriptedSource::account();
    let result = source.retrieve_chart_metadata("nosuch", &["revenue"]).await;
    assert_eq!(result, Err(MetadataError::EntityNotFound("nosuch".to_string())));
}
