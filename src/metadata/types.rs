//! Typed metadata records returned by the metadata service.

use serde::{Deserialize, Serialize};

/// Metadata for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub logical_name: String,
    pub display_name: String,
    pub primary_id_attribute: String,
    pub primary_name_attribute: String,
}

/// Metadata for one attribute of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    pub logical_name: String,
    pub display_name: String,
    pub kind: AttributeKind,
    /// Option labels, for picklist attributes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionLabel>,
}

/// A picklist option: numeric value plus display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionLabel {
    pub value: i64,
    pub label: String,
}

/// Coarse attribute type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Money,
    Integer,
    Decimal,
    Double,
    DateTime,
    Lookup,
    Picklist,
    String,
    Other,
}

impl AttributeKind {
    /// Can the attribute be aggregated numerically?
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            AttributeKind::Money
                | AttributeKind::Integer
                | AttributeKind::Decimal
                | AttributeKind::Double
        )
    }
}

/// Entity and attribute metadata gathered for one chart build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub entity: EntityMetadata,
    pub attributes: Vec<AttributeMetadata>,
}
