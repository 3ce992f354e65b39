//! Fetch-expression query model.
//!
//! [`FetchQuery`] parses a fetch-XML document into an object graph and keeps
//! the parsed document alive alongside it. Every mutator updates both the
//! graph and the backing tree, so `fetch_xml()` always re-serializes to a
//! document reflecting all programmatic changes. The two representations are
//! never allowed to drift.

use std::collections::HashMap;

use crate::error::ChartError;
use crate::xml::{EvaluatorFactory, NodeId, XmlDocument, XmlNode};

use super::attribute::{AttributeExpr, AttributeSpec, OrderByExpr};
use super::error::{QueryError, QueryResult};
use super::filter::FilterExpression;
use super::grouping::DateGrouping;

/// Join type of a `<link-entity>`. Absent defaults to inner; anything other
/// than natural/inner/outer is a fatal parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    Natural,
    #[default]
    Inner,
    Outer,
}

impl JoinType {
    fn from_attr(value: Option<&str>) -> QueryResult<JoinType> {
        match value {
            None => Ok(JoinType::Inner),
            Some("natural") => Ok(JoinType::Natural),
            Some("inner") => Ok(JoinType::Inner),
            Some("outer") => Ok(JoinType::Outer),
            Some(other) => Err(QueryError::InvalidJoinType(other.to_string())),
        }
    }

    pub fn attr(self) -> &'static str {
        match self {
            JoinType::Natural => "natural",
            JoinType::Inner => "inner",
            JoinType::Outer => "outer",
        }
    }
}

/// One `<entity>` or `<link-entity>` node of a fetch query.
#[derive(Debug, Clone)]
pub struct EntityQuery {
    name: String,
    node: NodeId,
    attributes: Vec<AttributeExpr>,
    /// alias-or-name → position in `attributes`.
    attribute_index: HashMap<String, usize>,
    order_by: Vec<OrderByExpr>,
    /// Positions of attributes flagged groupby, in declaration order.
    group_by: Vec<usize>,
    /// Positions of attributes flagged aggregate, in declaration order.
    aggregates: Vec<usize>,
    linked: Vec<LinkedEntityQuery>,
    filter: Option<FilterExpression>,
    table_alias: Option<String>,
}

/// A joined sub-query nested inside a parent entity.
#[derive(Debug, Clone)]
pub struct LinkedEntityQuery {
    pub entity: EntityQuery,
    /// Join attribute on the linked entity.
    pub from_attribute: String,
    /// Join attribute on the parent entity.
    pub to_attribute: String,
    pub join_type: JoinType,
}

impl EntityQuery {
    fn parse(doc: &XmlDocument, node: NodeId) -> QueryResult<EntityQuery> {
        let name = doc
            .attribute(node, "name")
            .ok_or(QueryError::MissingAttribute {
                element: "entity",
                attribute: "name",
            })?
            .to_string();

        let mut entity = EntityQuery {
            name,
            node,
            attributes: Vec::new(),
            attribute_index: HashMap::new(),
            order_by: Vec::new(),
            group_by: Vec::new(),
            aggregates: Vec::new(),
            linked: Vec::new(),
            filter: None,
            table_alias: doc.attribute(node, "alias").map(str::to_string),
        };

        for child in doc.child_elements(node) {
            match doc.tag_name(child) {
                Some("attribute") => {
                    let attr = parse_attribute(doc, child)?;
                    entity.register_attribute(attr);
                }
                Some("order") => {
                    entity.order_by.push(OrderByExpr {
                        name: doc.attribute(child, "attribute").map(str::to_string),
                        alias: doc.attribute(child, "alias").map(str::to_string),
                        descending: doc.attribute(child, "descending") == Some("true"),
                    });
                }
                Some("link-entity") => {
                    entity.linked.push(LinkedEntityQuery::parse(doc, child)?);
                }
                Some("filter") => {
                    if entity.filter.is_none() {
                        entity.filter = Some(FilterExpression::parse(doc, child)?);
                    }
                }
                _ => {}
            }
        }
        Ok(entity)
    }

    fn register_attribute(&mut self, attr: AttributeExpr) {
        let index = self.attributes.len();
        self.attribute_index
            .insert(attr.alias_or_name().to_string(), index);
        if attr.has_group_by {
            self.group_by.push(index);
        }
        if attr.has_aggregate {
            self.aggregates.push(index);
        }
        self.attributes.push(attr);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing DOM node of this entity.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn table_alias(&self) -> Option<&str> {
        self.table_alias.as_deref()
    }

    /// Selected attributes in declaration order.
    pub fn attributes(&self) -> &[AttributeExpr] {
        &self.attributes
    }

    /// Look an attribute up by alias-or-name.
    pub fn attribute_by_key(&self, key: &str) -> Option<&AttributeExpr> {
        self.attribute_index
            .get(key)
            .map(|index| &self.attributes[*index])
    }

    pub fn order_by(&self) -> &[OrderByExpr] {
        &self.order_by
    }

    /// Attributes flagged groupby, in declaration order.
    pub fn group_by_attributes(&self) -> impl Iterator<Item = &AttributeExpr> {
        self.group_by.iter().map(|i| &self.attributes[*i])
    }

    /// Attributes flagged aggregate, in declaration order.
    pub fn aggregate_attributes(&self) -> impl Iterator<Item = &AttributeExpr> {
        self.aggregates.iter().map(|i| &self.attributes[*i])
    }

    pub fn linked_entities(&self) -> &[LinkedEntityQuery] {
        &self.linked
    }

    pub fn filter(&self) -> Option<&FilterExpression> {
        self.filter.as_ref()
    }

    /// Group-by attributes of this entity and every nested linked entity,
    /// paired with the owning entity's name, in document order.
    pub fn group_by_attributes_deep(&self) -> Vec<(&str, &AttributeExpr)> {
        let mut out = Vec::new();
        self.collect_deep(&mut out, true);
        out
    }

    /// Aggregate attributes of this entity and every nested linked entity.
    pub fn aggregate_attributes_deep(&self) -> Vec<(&str, &AttributeExpr)> {
        let mut out = Vec::new();
        self.collect_deep(&mut out, false);
        out
    }

    fn collect_deep<'a>(&'a self, out: &mut Vec<(&'a str, &'a AttributeExpr)>, group_by: bool) {
        let indices = if group_by { &self.group_by } else { &self.aggregates };
        for &i in indices {
            out.push((self.name.as_str(), &self.attributes[i]));
        }
        for link in &self.linked {
            link.entity.collect_deep(out, group_by);
        }
    }

    /// Append an `<attribute>` element and register it in the graph.
    pub fn insert_attribute(&mut self, doc: &mut XmlDocument, spec: &AttributeSpec) {
        let node = doc.create_element("attribute");
        doc.set_attribute(node, "name", &spec.name);
        if let Some(alias) = &spec.alias {
            doc.set_attribute(node, "alias", alias);
        }
        if spec.group_by {
            doc.set_attribute(node, "groupby", "true");
        }
        if let Some(aggregate) = &spec.aggregate {
            doc.set_attribute(node, "aggregate", aggregate);
        }
        if let Some(grouping) = spec.date_grouping {
            doc.set_attribute(node, "dategrouping", grouping.name());
            // usertimezone defaults on when a date grouping is requested.
            let user_tz = spec.user_time_zone.unwrap_or(true);
            doc.set_attribute(node, "usertimezone", if user_tz { "true" } else { "false" });
        } else if let Some(user_tz) = spec.user_time_zone {
            doc.set_attribute(node, "usertimezone", if user_tz { "true" } else { "false" });
        }
        doc.append_child(self.node, node);

        self.register_attribute(AttributeExpr {
            name: spec.name.clone(),
            alias: spec.alias.clone(),
            date_grouping: spec.date_grouping,
            has_group_by: spec.group_by,
            has_aggregate: spec.aggregate.is_some(),
            aggregate_type: spec.aggregate.clone(),
        });
    }

    /// Insert an `<order>` element.
    ///
    /// `order_index` counts existing `order` siblings only; other sibling tags
    /// are ignored for positioning. A negative or out-of-range index appends.
    pub fn insert_order_by(&mut self, doc: &mut XmlDocument, order: OrderByExpr, order_index: i32) {
        let node = doc.create_element("order");
        if let Some(name) = &order.name {
            doc.set_attribute(node, "attribute", name);
        }
        if let Some(alias) = &order.alias {
            doc.set_attribute(node, "alias", alias);
        }
        doc.set_attribute(node, "descending", if order.descending { "true" } else { "false" });

        let existing: Vec<NodeId> = doc
            .child_elements(self.node)
            .into_iter()
            .filter(|c| doc.tag_name(*c) == Some("order"))
            .collect();
        let position = usize::try_from(order_index).ok().filter(|i| *i < existing.len());
        match position {
            Some(i) => doc.insert_before(self.node, node, existing[i]),
            None => doc.append_child(self.node, node),
        }

        match position {
            Some(i) => self.order_by.insert(i, order),
            None => self.order_by.push(order),
        }
    }

    /// Strip every `<attribute>` and `<order>` element from this entity and
    /// all nested link-entities, leaving link-entity and filter structure
    /// untouched.
    pub fn remove_all_attributes_and_orders(&mut self, doc: &mut XmlDocument) {
        let doomed: Vec<NodeId> = doc
            .child_elements(self.node)
            .into_iter()
            .filter(|c| matches!(doc.tag_name(*c), Some("attribute") | Some("order")))
            .collect();
        for node in doomed {
            doc.remove_child(self.node, node);
        }
        self.attributes.clear();
        self.attribute_index.clear();
        self.group_by.clear();
        self.aggregates.clear();
        self.order_by.clear();
        for link in &mut self.linked {
            link.entity.remove_all_attributes_and_orders(doc);
        }
    }

    /// Serialize `filter` into the entity, replacing an existing `<filter>`
    /// child in place or appending when none exists. An empty filter is a
    /// no-op. The retained model filter is the normalized shape, so reading
    /// it back matches what the document serializes.
    pub fn insert_filter_expression(&mut self, doc: &mut XmlDocument, filter: FilterExpression) {
        let filter = filter.normalized();
        let Some(rendered) = filter.to_node(doc) else {
            return;
        };
        let existing = doc
            .child_elements(self.node)
            .into_iter()
            .find(|c| doc.tag_name(*c) == Some("filter"));
        match existing {
            Some(old) => {
                doc.insert_before(self.node, rendered, old);
                doc.remove_child(self.node, old);
            }
            None => doc.append_child(self.node, rendered),
        }
        self.filter = Some(filter);
    }
}

impl LinkedEntityQuery {
    fn parse(doc: &XmlDocument, node: NodeId) -> QueryResult<LinkedEntityQuery> {
        let join_type = JoinType::from_attr(doc.attribute(node, "link-type"))?;
        let from_attribute = doc
            .attribute(node, "from")
            .ok_or(QueryError::MissingAttribute {
                element: "link-entity",
                attribute: "from",
            })?
            .to_string();
        let to_attribute = doc
            .attribute(node, "to")
            .ok_or(QueryError::MissingAttribute {
                element: "link-entity",
                attribute: "to",
            })?
            .to_string();
        Ok(LinkedEntityQuery {
            entity: EntityQuery::parse(doc, node)?,
            from_attribute,
            to_attribute,
            join_type,
        })
    }
}

/// A parsed fetch-XML document plus its object graph.
#[derive(Debug, Clone)]
pub struct FetchQuery {
    doc: XmlDocument,
    root: EntityQuery,
    alias_counter: u32,
    table_aliases: Vec<String>,
}

impl FetchQuery {
    /// Parse a fetch-XML string.
    ///
    /// A document carrying an `<Error>` node is a server error payload, not a
    /// query; it surfaces as [`QueryError::Server`] without further parsing.
    pub fn parse(fetch_xml: &str) -> QueryResult<FetchQuery> {
        Self::parse_with(fetch_xml, EvaluatorFactory::global())
    }

    /// Parse with an explicitly injected evaluator strategy.
    pub fn parse_with(fetch_xml: &str, factory: &EvaluatorFactory) -> QueryResult<FetchQuery> {
        let doc = XmlDocument::parse(fetch_xml)?;
        let wrapper = factory.wrap(&doc, doc.root());

        if let Some(error_node) = wrapper.select_single_node("//Error") {
            let detail = error_node.inner_text();
            return Err(QueryError::Server(ChartError::malformed_document(
                if detail.is_empty() {
                    "the query service returned an error payload".to_string()
                } else {
                    detail
                },
            )));
        }

        let entity_node = wrapper
            .select_single_node("/fetch/entity")
            .ok_or_else(|| QueryError::Structure("missing fetch/entity element".into()))?
            .id();
        let root = EntityQuery::parse(&doc, entity_node)?;
        Ok(FetchQuery {
            doc,
            root,
            alias_counter: 0,
            table_aliases: Vec::new(),
        })
    }

    /// Re-serialize the backing document, reflecting all mutations.
    pub fn fetch_xml(&self) -> String {
        self.doc.to_xml()
    }

    pub fn document(&self) -> &XmlDocument {
        &self.doc
    }

    /// Wrap the document root for path queries.
    pub fn root_node(&self) -> XmlNode<'_> {
        XmlNode::for_document(&self.doc)
    }

    pub fn entity(&self) -> &EntityQuery {
        &self.root
    }

    /// Split borrow for callers that mutate a nested linked entity: the root
    /// of the graph and the backing document, together.
    pub fn parts_mut(&mut self) -> (&mut EntityQuery, &mut XmlDocument) {
        (&mut self.root, &mut self.doc)
    }

    /// Aliases handed out so far, in assignment order.
    pub fn table_aliases(&self) -> &[String] {
        &self.table_aliases
    }

    /// Next process-unique table alias for this base query: monotonic
    /// counter, never reused even if an entity is later removed.
    pub fn generate_table_alias(&mut self, entity_name: &str) -> String {
        let alias = format!("{}{}", entity_name, self.alias_counter);
        self.alias_counter += 1;
        self.table_aliases.push(alias.clone());
        alias
    }

    // Root-entity conveniences; nested entities go through `parts_mut`.

    pub fn insert_attribute(&mut self, spec: &AttributeSpec) {
        self.root.insert_attribute(&mut self.doc, spec);
    }

    pub fn insert_order_by(&mut self, order: OrderByExpr, order_index: i32) {
        self.root.insert_order_by(&mut self.doc, order, order_index);
    }

    pub fn remove_all_attributes_and_orders(&mut self) {
        self.root.remove_all_attributes_and_orders(&mut self.doc);
    }

    pub fn insert_filter_expression(&mut self, filter: FilterExpression) {
        self.root.insert_filter_expression(&mut self.doc, filter);
    }
}

fn parse_attribute(doc: &XmlDocument, node: NodeId) -> QueryResult<AttributeExpr> {
    let name = doc
        .attribute(node, "name")
        .ok_or(QueryError::MissingAttribute {
            element: "attribute",
            attribute: "name",
        })?
        .to_string();
    let aggregate_type = doc.attribute(node, "aggregate").map(str::to_string);
    Ok(AttributeExpr {
        name,
        alias: doc.attribute(node, "alias").map(str::to_string),
        // Unrecognized grouping names parse to the sentinel, not an error.
        date_grouping: doc
            .attribute(node, "dategrouping")
            .and_then(DateGrouping::from_name),
        has_group_by: doc.attribute(node, "groupby") == Some("true"),
        has_aggregate: aggregate_type.is_some(),
        aggregate_type,
    })
}
