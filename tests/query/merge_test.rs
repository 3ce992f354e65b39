//! Integration tests for filter-fragment merging.

use fetchchart::query::{merge_fetch_xml_filter_expression_xml, merge_fetch_xml_filter_xml};

#[test]
fn test_empty_fragment_returns_original_byte_for_byte() {
    let fetch = "<fetch version=\"1.0\"  mapping=\"logical\">\n  <entity name=\"account\"/>\n</fetch>";
    assert_eq!(merge_fetch_xml_filter_xml(fetch, "").unwrap(), fetch);
    assert_eq!(merge_fetch_xml_filter_xml(fetch, "   \n ").unwrap(), fetch);
}

#[test]
fn test_bare_condition_gains_an_and_filter() {
    let fetch = r#"<fetch><entity name="account"><attribute name="name"/></entity></fetch>"#;
    let fragment = r#"<condition attribute="revenue" operator="gt" value="1000"/>"#;
    let merged = merge_fetch_xml_filter_xml(fetch, fragment).unwrap();
    assert_eq!(
        merged,
        r#"<fetch><entity name="account"><attribute name="name"/><filter type="and"><condition attribute="revenue" operator="gt" value="1000"/></filter></entity></fetch>"#
    );
}

#[test]
fn test_filter_fragment_imports_as_is() {
    let fetch = r#"<fetch><entity name="account"><attribute name="name"/></entity></fetch>"#;
    let fragment = r#"<filter type="or"><condition attribute="statecode" operator="eq" value="0"/><condition attribute="statecode" operator="eq" value="1"/></filter>"#;
    let merged = merge_fetch_xml_filter_xml(fetch, fragment).unwrap();
    assert_eq!(
        merged,
        r#"<fetch><entity name="account"><attribute name="name"/><filter type="or"><condition attribute="statecode" operator="eq" value="0"/><condition attribute="statecode" operator="eq" value="1"/></filter></entity></fetch>"#
    );
}

#[test]
fn test_existing_filter_wraps_with_new_in_and_envelope() {
    let fetch = r#"<fetch><entity name="account"><filter type="or"><condition attribute="statecode" operator="eq" value="0"/></filter><attribute name="name"/></entity></fetch>"#;
    let fragment = r#"<filter type="and"><condition attribute="revenue" operator="gt" value="1000"/></filter>"#;
    let merged = merge_fetch_xml_filter_xml(fetch, fragment).unwrap();
    assert_eq!(
        merged,
        r#"<fetch><entity name="account"><attribute name="name"/><filter type="and"><filter type="or"><condition attribute="statecode" operator="eq" value="0"/></filter><filter type="and"><condition attribute="revenue" operator="gt" value="1000"/></filter></filter></entity></fetch>"#
    );
}

#[test]
fn test_only_allow_listed_fetch_attributes_survive() {
    let fetch = r#"<fetch version="1.0" count="50" custom="x" distinct="true"><entity name="account" unknownattr="y"/></fetch>"#;
    let fragment = r#"<condition attribute="name" operator="not-null"/>"#;
    let merged = merge_fetch_xml_filter_xml(fetch, fragment).unwrap();
    assert_eq!(
        merged,
        r#"<fetch version="1.0" count="50" distinct="true"><entity name="account"><filter type="and"><condition attribute="name" operator="not-null"/></filter></entity></fetch>"#
    );
}

#[test]
fn test_plain_merge_passes_link_entities_through_verbatim() {
    let fetch = r#"<fetch><entity name="account"><link-entity name="contact" from="parentcustomerid" to="accountid" extra="kept"><attribute name="fullname"/></link-entity></entity></fetch>"#;
    let fragment = r#"<condition attribute="name" operator="not-null"/>"#;
    let merged = merge_fetch_xml_filter_xml(fetch, fragment).unwrap();
    // Verbatim pass-through keeps even non-allow-listed link attributes.
    assert!(merged.contains(r#"extra="kept""#));
}

#[test]
fn test_expression_merge_rebuilds_link_entity_attributes() {
    let fetch = r#"<fetch><entity name="account"><link-entity name="contact" from="parentcustomerid" to="accountid" extra="dropped"><attribute name="fullname"/></link-entity></entity></fetch>"#;
    let fragment = r#"<condition attribute="name" operator="not-null"/>"#;
    let merged = merge_fetch_xml_filter_expression_xml(fetch, fragment).unwrap();
    assert!(!merged.contains("extra"));
    assert!(merged.contains(r#"<link-entity name="contact" from="parentcustomerid" to="accountid">"#));
}

#[test]
fn test_expression_merge_auto_aliases_filtered_link_entities() {
    let fetch = r#"<fetch><entity name="opportunity"><link-entity name="account" from="accountid" to="customerid" link-type="outer"><filter type="and"><condition attribute="statecode" operator="eq" value="0"/></filter></link-entity></entity></fetch>"#;
    let fragment = r#"<condition attribute="name" operator="not-null"/>"#;
    let merged = merge_fetch_xml_filter_expression_xml(fetch, fragment).unwrap();
    assert!(merged.contains(r#"alias="account__alias""#));
}

#[test]
fn test_expression_merge_leaves_unfiltered_link_entities_unaliased() {
    let fetch = r#"<fetch><entity name="opportunity"><link-entity name="account" from="accountid" to="customerid"><attribute name="name"/></link-entity></entity></fetch>"#;
    let fragment = r#"<condition attribute="name" operator="not-null"/>"#;
    let merged = merge_fetch_xml_filter_expression_xml(fetch, fragment).unwrap();
    assert!(!merged.contains("__alias"));
}

#[test]
fn test_non_fetch_root_is_rejected() {
    let result = merge_fetch_xml_filter_xml(
        "<entity name=\"account\"/>",
        "<condition attribute=\"name\" operator=\"not-null\"/>",
    );
    assert!(result.is_err());
}

#[test]
fn test_invalid_fragment_root_is_rejected() {
    let result = merge_fetch_xml_filter_xml(
        r#"<fetch><entity name="account"/></fetch>"#,
        "<order attribute=\"name\"/>",
    );
    assert!(result.is_err());
}
