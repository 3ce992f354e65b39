//! Integration tests for filter-expression parsing and serialization.

use fetchchart::query::{
    Condition, ConditionValue, FetchQuery, FilterBody, FilterExpression, FilterOperator,
};

#[test]
fn test_parse_flat_condition_filter() {
    let query = FetchQuery::parse(
        r#"<fetch><entity name="account"><filter type="or"><condition attribute="statecode" operator="eq" value="0"/><condition attribute="statecode" operator="eq" value="1"/></filter></entity></fetch>"#,
    )
    .unwrap();
    let filter = query.entity().filter().unwrap();
    assert_eq!(filter.operator, FilterOperator::Or);
    let FilterBody::Conditions(conditions) = &filter.body else {
        panic!("expected a condition body");
    };
    assert_eq!(conditions.len(), 2);
    assert_eq!(conditions[0].attribute, "statecode");
    assert_eq!(conditions[0].value, ConditionValue::Single("0".into()));
}

#[test]
fn test_missing_type_attribute_defaults_to_and() {
    let query = FetchQuery::parse(
        r#"<fetch><entity name="account"><filter><condition attribute="name" operator="not-null"/></filter></entity></fetch>"#,
    )
    .unwrap();
    let filter = query.entity().filter().unwrap();
    assert_eq!(filter.operator, FilterOperator::And);
    let FilterBody::Conditions(conditions) = &filter.body else {
        panic!("expected a condition body");
    };
    assert_eq!(conditions[0].value, ConditionValue::None);
}

#[test]
fn test_parse_multi_value_condition() {
    let query = FetchQuery::parse(
        r#"<fetch><entity name="account"><filter type="and"><condition attribute="industrycode" operator="in"><value>1</value><value>3</value></condition></filter></entity></fetch>"#,
    )
    .unwrap();
    let filter = query.entity().filter().unwrap();
    let FilterBody::Conditions(conditions) = &filter.body else {
        panic!("expected a condition body");
    };
    assert_eq!(
        conditions[0].value,
        ConditionValue::Multi(vec!["1".into(), "3".into()])
    );
}

#[test]
fn test_parse_nested_filter_tree() {
    let query = FetchQuery::parse(
        r#"<fetch><entity name="account"><filter type="or"><filter type="and"><condition attribute="revenue" operator="gt" value="1000"/></filter><filter type="and"><condition attribute="numberofemployees" operator="gt" value="50"/></filter></filter></entity></fetch>"#,
    )
    .unwrap();
    let filter = query.entity().filter().unwrap();
    assert_eq!(filter.operator, FilterOperator::Or);
    let FilterBody::Filters(children) = &filter.body else {
        panic!("expected nested filters");
    };
    assert_eq!(children.len(), 2);
    assert!(matches!(children[0].body, FilterBody::Conditions(_)));
}

#[test]
fn test_condition_on_linked_entity_keeps_entityname() {
    let query = FetchQuery::parse(
        r#"<fetch><entity name="opportunity"><filter type="and"><condition attribute="industrycode" operator="eq" value="3" entityname="account"/></filter></entity></fetch>"#,
    )
    .unwrap();
    let filter = query.entity().filter().unwrap();
    let FilterBody::Conditions(conditions) = &filter.body else {
        panic!("expected a condition body");
    };
    assert_eq!(conditions[0].entity_name.as_deref(), Some("account"));
}

#[test]
fn test_insert_filter_serializes_conditions() {
    let mut query =
        FetchQuery::parse(r#"<fetch><entity name="account"><attribute name="name"/></entity></fetch>"#)
            .unwrap();
    query.insert_filter_expression(FilterExpression::conditions(
        FilterOperator::And,
        vec![Condition::new("revenue", "gt").with_value("1000")],
    ));
    assert_eq!(
        query.fetch_xml(),
        r#"<fetch><entity name="account"><attribute name="name"/><filter type="and"><condition attribute="revenue" operator="gt" value="1000"/></filter></entity></fetch>"#
    );
}

#[test]
fn test_insert_filter_replaces_existing_in_place() {
    let mut query = FetchQuery::parse(
        r#"<fetch><entity name="account"><filter type="and"><condition attribute="statecode" operator="eq" value="0"/></filter><attribute name="name"/></entity></fetch>"#,
    )
    .unwrap();
    query.insert_filter_expression(FilterExpression::conditions(
        FilterOperator::Or,
        vec![Condition::new("revenue", "null")],
    ));
    // The replacement occupies the old filter's slot, before the attribute.
    assert_eq!(
        query.fetch_xml(),
        r#"<fetch><entity name="account"><filter type="or"><condition attribute="revenue" operator="null"/></filter><attribute name="name"/></entity></fetch>"#
    );
}

#[test]
fn test_insert_empty_filter_is_a_no_op() {
    let original = r#"<fetch><entity name="account"><attribute name="name"/></entity></fetch>"#;
    let mut query = FetchQuery::parse(original).unwrap();
    query.insert_filter_expression(FilterExpression::conditions(FilterOperator::And, vec![]));
    assert_eq!(query.fetch_xml(), original);
}

#[test]
fn test_multi_value_condition_serializes_value_children() {
    let mut query =
        FetchQuery::parse(r#"<fetch><entity name="account"/></fetch>"#).unwrap();
    query.insert_filter_expression(FilterExpression::conditions(
        FilterOperator::And,
        vec![Condition::new("industrycode", "in").with_values(vec!["1".into(), "3".into()])],
    ));
    assert_eq!(
        query.fetch_xml(),
        r#"<fetch><entity name="account"><filter type="and"><condition attribute="industrycode" operator="in"><value>1</value><value>3</value></condition></filter></entity></fetch>"#
    );
}

#[test]
fn test_nested_multi_child_filter_keeps_envelope() {
    let mut query =
        FetchQuery::parse(r#"<fetch><entity name="account"/></fetch>"#).unwrap();
    let combined = FilterExpression::nested(
        FilterOperator::Or,
        vec![
            FilterExpression::conditions(
                FilterOperator::And,
                vec![Condition::new("revenue", "gt").with_value("1000")],
            ),
            FilterExpression::conditions(
                FilterOperator::And,
                vec![Condition::new("numberofemployees", "gt").with_value("50")],
            ),
        ],
    );
    query.insert_filter_expression(combined);
    assert_eq!(
        query.fetch_xml(),
        r#"<fetch><entity name="account"><filter type="or"><filter type="and"><condition attribute="revenue" operator="gt" value="1000"/></filter><filter type="and"><condition attribute="numberofemployees" operator="gt" value="50"/></filter></filter></entity></fetch>"#
    );
}

#[test]
fn test_single_child_wrapper_collapses_on_serialization() {
    let mut query =
        FetchQuery::parse(r#"<fetch><entity name="account"/></fetch>"#).unwrap();
    let wrapped = FilterExpression::nested(
        FilterOperator::And,
        vec![FilterExpression::conditions(
            FilterOperator::Or,
            vec![Condition::new("statecode", "eq").with_value("0")],
        )],
    );
    query.insert_filter_expression(wrapped);
    // The and-wrapper around a single child renders as the child alone.
    assert_eq!(
        query.fetch_xml(),
        r#"<fetch><entity name="account"><filter type="or"><condition attribute="statecode" operator="eq" value="0"/></filter></entity></fetch>"#
    );
}

#[test]
fn test_inserted_filter_reads_back_in_serialized_shape() {
    let mut query =
        FetchQuery::parse(r#"<fetch><entity name="account"/></fetch>"#).unwrap();
    let wrapped = FilterExpression::nested(
        FilterOperator::And,
        vec![FilterExpression::conditions(
            FilterOperator::Or,
            vec![Condition::new("statecode", "eq").with_value("0")],
        )],
    );
    query.insert_filter_expression(wrapped);
    // The model keeps the collapsed shape the document shows.
    let stored = query.entity().filter().unwrap();
    assert_eq!(stored.operator, FilterOperator::Or);
    assert!(matches!(stored.body, FilterBody::Conditions(_)));
    let reparsed = FetchQuery::parse(&query.fetch_xml()).unwrap();
    assert_eq!(reparsed.entity().filter(), Some(stored));
}

#[test]
fn test_find_locates_tagged_nested_filter() {
    let tagged = FilterExpression::conditions(
        FilterOperator::And,
        vec![Condition::new("revenue", "gt").with_value("1000")],
    )
    .with_id("revenue-band");
    let tree = FilterExpression::nested(FilterOperator::Or, vec![tagged]);
    assert!(tree.find("revenue-band").is_some());
    assert!(tree.find("missing").is_none());
}
