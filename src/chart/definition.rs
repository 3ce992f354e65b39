//! Chart data-definition model.
//!
//! Pairs a parsed fetch query with its presentation description: group-by
//! attributes become categories, aggregate attributes become measures. The
//! model references attributes from the fetch graph by alias, identity rather than
//! copies; the [`FetchQuery`] owns the whole graph.

use crate::error::{ChartError, ChartResult};
use crate::query::{DateGrouping, FetchQuery};

use super::presentation::ChartPresentation;

/// Separator bucket for rows with no group-by value.
pub const EMPTY_BUCKET: &str = "(empty)";

/// A categorical bucketing axis: one group-by attribute of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartGroupBy {
    /// Result-column alias the retrieved rows are keyed by.
    pub alias: String,
    /// Underlying attribute logical name.
    pub attribute: String,
    /// Entity the attribute belongs to (root or linked).
    pub entity: String,
    pub grouping: Option<DateGrouping>,
}

/// A numeric summarization: one aggregate attribute of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartMeasure {
    pub alias: String,
    pub attribute: String,
    /// Aggregation function name ("sum", "count", ...).
    pub aggregate: String,
    /// Index of the value axis this measure plots against.
    pub y_axis: usize,
}

/// Measures sharing one series split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureCollection {
    pub measures: Vec<ChartMeasure>,
    /// Second group-by splitting the rows into one series per value.
    pub secondary_group_by: Option<ChartGroupBy>,
}

/// One chart category: a primary group-by plus its measure collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartCategory {
    pub group_by: ChartGroupBy,
    pub measure_collections: Vec<MeasureCollection>,
    pub aggregators: CategoryAggregators,
}

impl ChartCategory {
    /// All measures of the category, flattened in declaration order.
    pub fn measures(&self) -> impl Iterator<Item = &ChartMeasure> {
        self.measure_collections.iter().flat_map(|c| c.measures.iter())
    }

    pub fn secondary_group_by(&self) -> Option<&ChartGroupBy> {
        self.measure_collections
            .iter()
            .find_map(|c| c.secondary_group_by.as_ref())
    }
}

/// Min/max date-grain range collected for one date-grouped field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeAggregator {
    pub attribute: String,
    pub min: DateGrouping,
    pub max: DateGrouping,
}

/// Date and fiscal aggregators of one category.
///
/// Calendar grains (day through year) on the same field merge into one
/// combined min/max range; fiscal-period and fiscal-year are exclusive. A
/// category supports at most one of each, and a second is a programmer error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryAggregators {
    date_ranges: Vec<DateRangeAggregator>,
    fiscal_period: Option<String>,
    fiscal_year: Option<String>,
}

impl CategoryAggregators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a date grouping on `attribute`.
    pub fn add(&mut self, attribute: &str, grouping: DateGrouping) -> ChartResult<()> {
        match grouping {
            DateGrouping::FiscalPeriod => {
                if self.fiscal_period.is_some() {
                    return Err(ChartError::invalid_definition(
                        "a category supports at most one fiscal-period aggregator",
                    ));
                }
                self.fiscal_period = Some(attribute.to_string());
            }
            DateGrouping::FiscalYear => {
                if self.fiscal_year.is_some() {
                    return Err(ChartError::invalid_definition(
                        "a category supports at most one fiscal-year aggregator",
                    ));
                }
                self.fiscal_year = Some(attribute.to_string());
            }
            _ => match self
                .date_ranges
                .iter_mut()
                .find(|range| range.attribute == attribute)
            {
                Some(range) => {
                    range.min = range.min.min(grouping);
                    range.max = range.max.max(grouping);
                }
                None => self.date_ranges.push(DateRangeAggregator {
                    attribute: attribute.to_string(),
                    min: grouping,
                    max: grouping,
                }),
            },
        }
        Ok(())
    }

    pub fn date_ranges(&self) -> &[DateRangeAggregator] {
        &self.date_ranges
    }

    pub fn fiscal_period(&self) -> Option<&str> {
        self.fiscal_period.as_deref()
    }

    pub fn fiscal_year(&self) -> Option<&str> {
        self.fiscal_year.as_deref()
    }
}

/// A complete chart definition: the owning fetch query, the presentation
/// description and the category/measure model derived from both.
#[derive(Debug, Clone)]
pub struct ChartDataDefinition {
    pub query: FetchQuery,
    pub presentation: ChartPresentation,
    pub categories: Vec<ChartCategory>,
}

impl ChartDataDefinition {
    /// Parse fetch and presentation XML and derive the category model.
    ///
    /// Group-by and aggregate attributes pair up in declaration order: the
    /// first group-by is the primary category axis, a second becomes the
    /// series split. A query without at least one of each cannot chart.
    pub fn build(fetch_xml: &str, presentation_xml: &str) -> ChartResult<ChartDataDefinition> {
        let query = FetchQuery::parse(fetch_xml)?;
        let presentation = ChartPresentation::parse(presentation_xml)?;

        let group_bys: Vec<ChartGroupBy> = query
            .entity()
            .group_by_attributes_deep()
            .into_iter()
            .map(|(entity, attr)| ChartGroupBy {
                alias: attr.alias_or_name().to_string(),
                attribute: attr.name.clone(),
                entity: entity.to_string(),
                grouping: attr.date_grouping,
            })
            .collect();
        let measures: Vec<ChartMeasure> = query
            .entity()
            .aggregate_attributes_deep()
            .into_iter()
            .map(|(_, attr)| ChartMeasure {
                alias: attr.alias_or_name().to_string(),
                attribute: attr.name.clone(),
                aggregate: attr
                    .aggregate_type
                    .clone()
                    .unwrap_or_else(|| "count".to_string()),
                y_axis: 0,
            })
            .collect();

        let mut group_bys = group_bys.into_iter();
        let primary = group_bys.next().ok_or_else(|| {
            ChartError::invalid_definition("chart query defines no group-by attribute")
        })?;
        if measures.is_empty() {
            return Err(ChartError::invalid_definition(
                "chart query defines no aggregate attribute",
            ));
        }
        let secondary = group_bys.next();

        let mut aggregators = CategoryAggregators::new();
        if let Some(grouping) = primary.grouping {
            aggregators.add(&primary.attribute, grouping)?;
        }
        if let Some(secondary) = &secondary {
            if let Some(grouping) = secondary.grouping {
                aggregators.add(&secondary.attribute, grouping)?;
            }
        }

        let category = ChartCategory {
            group_by: primary,
            measure_collections: vec![MeasureCollection {
                measures,
                secondary_group_by: secondary,
            }],
            aggregators,
        };

        Ok(ChartDataDefinition {
            query,
            presentation,
            categories: vec![category],
        })
    }

    /// Result-column aliases the chart reads, for metadata retrieval.
    pub fn required_columns(&self) -> crate::query::ColumnSet {
        let mut names = Vec::new();
        for category in &self.categories {
            names.push(category.group_by.attribute.clone());
            if let Some(secondary) = category.secondary_group_by() {
                names.push(secondary.attribute.clone());
            }
            for measure in category.measures() {
                names.push(measure.attribute.clone());
            }
        }
        let mut seen = std::collections::HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
        crate::query::ColumnSet::Columns(names)
    }
}
