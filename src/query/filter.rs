//! Filter-expression trees.
//!
//! A filter node either holds a flat list of conditions or a list of child
//! filters; the dialect never mixes the two, and [`FilterBody`] makes that
//! exclusivity structural instead of a runtime convention.

use crate::xml::{NodeId, XmlDocument};

use super::error::{QueryError, QueryResult};

/// Boolean combinator of a filter node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOperator {
    #[default]
    And,
    Or,
    Not,
}

impl FilterOperator {
    pub fn from_type_attr(value: &str) -> FilterOperator {
        match value {
            "or" => FilterOperator::Or,
            "not" => FilterOperator::Not,
            _ => FilterOperator::And,
        }
    }

    pub fn type_attr(self) -> &'static str {
        match self {
            FilterOperator::And => "and",
            FilterOperator::Or => "or",
            FilterOperator::Not => "not",
        }
    }
}

/// Value carried by a condition: none (operator needs no operand), one, or an
/// ordered list for multi-value operators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConditionValue {
    #[default]
    None,
    Single(String),
    Multi(Vec<String>),
}

/// One `<condition>` of a filter. Equality compares all fields, with ordered
/// list comparison for multi-values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub attribute: String,
    /// Operator code string, e.g. "eq", "gt", "not-null".
    pub operator: String,
    pub value: ConditionValue,
    /// Target entity for conditions against a linked entity.
    pub entity_name: Option<String>,
    /// Caller-assigned tag for later lookup; never serialized.
    pub condition_name: Option<String>,
}

impl Condition {
    pub fn new(attribute: &str, operator: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
            operator: operator.to_string(),
            value: ConditionValue::None,
            entity_name: None,
            condition_name: None,
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = ConditionValue::Single(value.to_string());
        self
    }

    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.value = ConditionValue::Multi(values);
        self
    }

    pub fn with_entity_name(mut self, entity_name: &str) -> Self {
        self.entity_name = Some(entity_name.to_string());
        self
    }

    pub fn with_name(mut self, condition_name: &str) -> Self {
        self.condition_name = Some(condition_name.to_string());
        self
    }
}

/// Body of a filter node: conditions and child filters are mutually
/// exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterBody {
    Conditions(Vec<Condition>),
    Filters(Vec<FilterExpression>),
}

/// A filter tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    pub operator: FilterOperator,
    /// Caller-assigned tag for later lookup/removal; never serialized.
    pub filter_id: Option<String>,
    pub body: FilterBody,
}

impl FilterExpression {
    /// A filter holding a flat condition list.
    pub fn conditions(operator: FilterOperator, conditions: Vec<Condition>) -> Self {
        Self {
            operator,
            filter_id: None,
            body: FilterBody::Conditions(conditions),
        }
    }

    /// A filter combining child filters.
    pub fn nested(operator: FilterOperator, filters: Vec<FilterExpression>) -> Self {
        Self {
            operator,
            filter_id: None,
            body: FilterBody::Filters(filters),
        }
    }

    pub fn with_id(mut self, filter_id: &str) -> Self {
        self.filter_id = Some(filter_id.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        match &self.body {
            FilterBody::Conditions(c) => c.is_empty(),
            FilterBody::Filters(f) => f.is_empty(),
        }
    }

    /// Find a nested filter by its caller-assigned id.
    pub fn find(&self, filter_id: &str) -> Option<&FilterExpression> {
        if self.filter_id.as_deref() == Some(filter_id) {
            return Some(self);
        }
        if let FilterBody::Filters(children) = &self.body {
            for child in children {
                if let Some(found) = child.find(filter_id) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Parse a `<filter>` element into a filter tree.
    ///
    /// Condition children win over nested filter children when a document
    /// carries both; the dialect never produces that shape.
    pub fn parse(doc: &XmlDocument, node: NodeId) -> QueryResult<FilterExpression> {
        let operator = doc
            .attribute(node, "type")
            .map(FilterOperator::from_type_attr)
            .unwrap_or_default();

        let mut conditions = Vec::new();
        let mut filters = Vec::new();
        for child in doc.child_elements(node) {
            match doc.tag_name(child) {
                Some("condition") => conditions.push(parse_condition(doc, child)?),
                Some("filter") => filters.push(FilterExpression::parse(doc, child)?),
                _ => {}
            }
        }

        let body = if !conditions.is_empty() {
            FilterBody::Conditions(conditions)
        } else {
            FilterBody::Filters(filters)
        };
        Ok(FilterExpression {
            operator,
            filter_id: None,
            body,
        })
    }

    /// Reduce this filter to the shape [`FilterExpression::to_node`] renders:
    /// empty children are pruned and single-child wrapper filters collapse to
    /// the child. A wrapper's id moves onto the child when the child has none,
    /// so [`FilterExpression::find`] keeps working after the collapse.
    pub fn normalized(self) -> FilterExpression {
        match self.body {
            FilterBody::Conditions(_) => self,
            FilterBody::Filters(children) => {
                let mut kept: Vec<FilterExpression> = children
                    .into_iter()
                    .map(FilterExpression::normalized)
                    .filter(|child| !child.is_empty())
                    .collect();
                if kept.len() == 1 {
                    let mut child = kept.remove(0);
                    if child.filter_id.is_none() {
                        child.filter_id = self.filter_id;
                    }
                    child
                } else {
                    FilterExpression {
                        operator: self.operator,
                        filter_id: self.filter_id,
                        body: FilterBody::Filters(kept),
                    }
                }
            }
        }
    }

    /// Serialize this filter into `doc`, returning the detached node.
    ///
    /// Rendering rules: a condition-bodied filter renders as
    /// `<filter type="...">` with one `<condition>` per entry; a filter with a
    /// single child filter collapses to that child; multiple children are
    /// wrapped in a `<filter type="...">` envelope. Empty filters render
    /// nothing.
    pub fn to_node(&self, doc: &mut XmlDocument) -> Option<NodeId> {
        match &self.body {
            FilterBody::Conditions(conditions) => {
                if conditions.is_empty() {
                    return None;
                }
                let filter = doc.create_element("filter");
                doc.set_attribute(filter, "type", self.operator.type_attr());
                for condition in conditions {
                    let node = condition_to_node(doc, condition);
                    doc.append_child(filter, node);
                }
                Some(filter)
            }
            FilterBody::Filters(children) => {
                let rendered: Vec<NodeId> = children
                    .iter()
                    .filter_map(|child| child.to_node(doc))
                    .collect();
                match rendered.len() {
                    0 => None,
                    // Single-child wrapper filters collapse to the child.
                    1 => Some(rendered[0]),
                    _ => {
                        let envelope = doc.create_element("filter");
                        doc.set_attribute(envelope, "type", self.operator.type_attr());
                        for node in rendered {
                            doc.append_child(envelope, node);
                        }
                        Some(envelope)
                    }
                }
            }
        }
    }
}

fn parse_condition(doc: &XmlDocument, node: NodeId) -> QueryResult<Condition> {
    let attribute = doc
        .attribute(node, "attribute")
        .ok_or(QueryError::MissingAttribute {
            element: "condition",
            attribute: "attribute",
        })?
        .to_string();
    let operator = doc
        .attribute(node, "operator")
        .ok_or(QueryError::MissingAttribute {
            element: "condition",
            attribute: "operator",
        })?
        .to_string();

    let value = if let Some(single) = doc.attribute(node, "value") {
        ConditionValue::Single(single.to_string())
    } else {
        let values: Vec<String> = doc
            .child_elements(node)
            .into_iter()
            .filter(|c| doc.tag_name(*c) == Some("value"))
            .map(|c| doc.inner_text(c))
            .collect();
        if values.is_empty() {
            ConditionValue::None
        } else {
            ConditionValue::Multi(values)
        }
    };

    Ok(Condition {
        attribute,
        operator,
        value,
        entity_name: doc.attribute(node, "entityname").map(str::to_string),
        condition_name: None,
    })
}

fn condition_to_node(doc: &mut XmlDocument, condition: &Condition) -> NodeId {
    let node = doc.create_element("condition");
    doc.set_attribute(node, "attribute", &condition.attribute);
    doc.set_attribute(node, "operator", &condition.operator);
    if let Some(entity_name) = &condition.entity_name {
        doc.set_attribute(node, "entityname", entity_name);
    }
    match &condition.value {
        ConditionValue::None => {}
        ConditionValue::Single(value) => doc.set_attribute(node, "value", value),
        ConditionValue::Multi(values) => {
            for value in values {
                let value_el = doc.create_element("value");
                let text = doc.create_text(value);
                doc.append_child(value_el, text);
                doc.append_child(node, value_el);
            }
        }
    }
    node
}
