//! Integration tests for the chart definition model.

use fetchchart::chart::{ChartDataDefinition, ChartKind, ChartPresentation};
use fetchchart::query::{ColumnSet, DateGrouping};

const SIMPLE_FETCH: &str = r#"<fetch mapping="logical" aggregate="true"><entity name="account"><attribute name="industrycode" alias="industry" groupby="true"/><attribute name="revenue" alias="sum_revenue" aggregate="sum"/></entity></fetch>"#;

const SIMPLE_PRESENTATION: &str = r#"<Chart><Series><Series ChartType="Column" Color="54,120,195"/></Series><Legends><Legend Enabled="true" Docking="Bottom"/></Legends></Chart>"#;

#[test]
fn test_build_pairs_group_by_with_measures() {
    let definition = ChartDataDefinition::build(SIMPLE_FETCH, SIMPLE_PRESENTATION).unwrap();
    assert_eq!(definition.categories.len(), 1);
    let category = &definition.categories[0];
    assert_eq!(category.group_by.alias, "industry");
    assert_eq!(category.group_by.attribute, "industrycode");
    assert_eq!(category.group_by.entity, "account");
    assert_eq!(category.group_by.grouping, None);

    let measures: Vec<_> = category.measures().collect();
    assert_eq!(measures.len(), 1);
    assert_eq!(measures[0].alias, "sum_revenue");
    assert_eq!(measures[0].aggregate, "sum");
    assert!(category.secondary_group_by().is_none());
}

#[test]
fn test_second_group_by_becomes_the_series_split() {
    let fetch = r#"<fetch aggregate="true"><entity name="opportunity"><attribute name="stepname" alias="step" groupby="true"/><attribute name="ownerid" alias="owner" groupby="true"/><attribute name="estimatedvalue" alias="total" aggregate="sum"/></entity></fetch>"#;
    let definition = ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).unwrap();
    let category = &definition.categories[0];
    assert_eq!(category.group_by.alias, "step");
    assert_eq!(category.secondary_group_by().unwrap().alias, "owner");
}

#[test]
fn test_aggregate_function_passes_through() {
    let fetch = r#"<fetch aggregate="true"><entity name="account"><attribute name="industrycode" alias="industry" groupby="true"/><attribute name="accountid" alias="total" aggregate="countcolumn"/></entity></fetch>"#;
    let definition = ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).unwrap();
    let measures: Vec<_> = definition.categories[0].measures().collect();
    assert_eq!(measures[0].aggregate, "countcolumn");
}

#[test]
fn test_build_requires_a_group_by() {
    let fetch = r#"<fetch aggregate="true"><entity name="account"><attribute name="revenue" alias="total" aggregate="sum"/></entity></fetch>"#;
    assert!(ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).is_err());
}

#[test]
fn test_build_requires_a_measure() {
    let fetch = r#"<fetch aggregate="true"><entity name="account"><attribute name="industrycode" groupby="true"/></entity></fetch>"#;
    assert!(ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).is_err());
}

#[test]
fn test_calendar_groupings_merge_into_a_range() {
    let fetch = r#"<fetch aggregate="true"><entity name="opportunity"><attribute name="createdon" alias="bucket" groupby="true" dategrouping="quarter"/><attribute name="estimatedvalue" alias="total" aggregate="sum"/></entity></fetch>"#;
    let definition = ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).unwrap();
    let category = &definition.categories[0];
    assert_eq!(category.group_by.grouping, Some(DateGrouping::Quarter));
    let ranges = category.aggregators.date_ranges();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].attribute, "createdon");
    assert_eq!(ranges[0].min, DateGrouping::Quarter);
    assert_eq!(ranges[0].max, DateGrouping::Quarter);
}

#[test]
fn test_same_field_groupings_widen_the_range() {
    let fetch = r#"<fetch aggregate="true"><entity name="opportunity"><attribute name="createdon" alias="m" groupby="true" dategrouping="month"/><attribute name="createdon" alias="y" groupby="true" dategrouping="year"/><attribute name="estimatedvalue" alias="total" aggregate="sum"/></entity></fetch>"#;
    let definition = ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).unwrap();
    let ranges = definition.categories[0].aggregators.date_ranges();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].min, DateGrouping::Month);
    assert_eq!(ranges[0].max, DateGrouping::Year);
}

#[test]
fn test_fiscal_period_aggregator_registers_once() {
    let fetch = r#"<fetch aggregate="true"><entity name="opportunity"><attribute name="createdon" alias="fp" groupby="true" dategrouping="fiscal-period"/><attribute name="estimatedvalue" alias="total" aggregate="sum"/></entity></fetch>"#;
    let definition = ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).unwrap();
    let aggregators = &definition.categories[0].aggregators;
    assert_eq!(aggregators.fiscal_period(), Some("createdon"));
    assert_eq!(aggregators.fiscal_year(), None);
    assert!(aggregators.date_ranges().is_empty());
}

#[test]
fn test_duplicate_fiscal_grouping_fails_the_build() {
    let fetch = r#"<fetch aggregate="true"><entity name="opportunity"><attribute name="createdon" alias="a" groupby="true" dategrouping="fiscal-period"/><attribute name="actualclosedate" alias="b" groupby="true" dategrouping="fiscal-period"/><attribute name="estimatedvalue" alias="total" aggregate="sum"/></entity></fetch>"#;
    assert!(ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).is_err());
}

#[test]
fn test_required_columns_enumerate_unique_attributes() {
    let fetch = r#"<fetch aggregate="true"><entity name="opportunity"><attribute name="stepname" alias="step" groupby="true"/><attribute name="ownerid" alias="owner" groupby="true"/><attribute name="estimatedvalue" alias="total" aggregate="sum"/></entity></fetch>"#;
    let definition = ChartDataDefinition::build(fetch, SIMPLE_PRESENTATION).unwrap();
    assert_eq!(
        definition.required_columns(),
        ColumnSet::named(["stepname", "ownerid", "estimatedvalue"])
    );
}

#[test]
fn test_presentation_series_and_legend() {
    let presentation = ChartPresentation::parse(SIMPLE_PRESENTATION).unwrap();
    assert_eq!(presentation.series.len(), 1);
    assert_eq!(presentation.series[0].chart_kind().unwrap(), ChartKind::Column);
    assert_eq!(presentation.series[0].color.as_deref(), Some("54,120,195"));
    assert_eq!(presentation.legends.len(), 1);
    assert!(presentation.legends[0].enabled);
    assert_eq!(presentation.legends[0].docking.as_deref(), Some("Bottom"));
}

#[test]
fn test_chart_element_found_inside_an_envelope() {
    let wrapped = r##"<visualization><presentationdescription><Chart PaletteCustomColors="#AA0000;#00AA00"><Series><Series ChartType="pie"/></Series></Chart></presentationdescription></visualization>"##;
    let presentation = ChartPresentation::parse(wrapped).unwrap();
    assert_eq!(presentation.series[0].chart_kind().unwrap(), ChartKind::Pie);
    assert_eq!(presentation.palette, ["#AA0000", "#00AA00"]);
}

#[test]
fn test_stacked_variants_map_to_their_base_kind() {
    let presentation = ChartPresentation::parse(
        r#"<Chart><Series><Series ChartType="StackedColumn100"/><Series ChartType="stackedbar"/></Series></Chart>"#,
    )
    .unwrap();
    assert_eq!(presentation.series[0].chart_kind().unwrap(), ChartKind::Column);
    assert_eq!(presentation.series[1].chart_kind().unwrap(), ChartKind::Bar);
}

#[test]
fn test_missing_series_type_charts_as_column() {
    let presentation =
        ChartPresentation::parse(r#"<Chart><Series><Series Color="red"/></Series></Chart>"#)
            .unwrap();
    assert_eq!(presentation.series[0].chart_kind().unwrap(), ChartKind::Column);
}

#[test]
fn test_unsupported_series_type_is_an_error() {
    let presentation = ChartPresentation::parse(
        r#"<Chart><Series><Series ChartType="Radar"/></Series></Chart>"#,
    )
    .unwrap();
    assert!(presentation.series[0].chart_kind().is_err());
}

#[test]
fn test_presentation_without_chart_element_is_rejected() {
    assert!(ChartPresentation::parse("<visualization/>").is_err());
}
