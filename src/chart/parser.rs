//! Row-to-series mapping.
//!
//! The query service returns aggregated rows as JSON objects keyed by
//! result-column alias. A data parser maps those rows through the category
//! model into a label axis and numeric series. Three shapes exist: normal
//! (single group-by), comparison (second group-by splits the series), and
//! date-time (categories ordered by bucket value instead of arrival order).

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ChartResult;

use super::definition::{ChartCategory, EMPTY_BUCKET};

/// One retrieved row, keyed by result-column alias.
pub type DataRow = serde_json::Map<String, Value>;

/// One plotted series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub label: String,
    /// One slot per category; `None` where the bucket has no value.
    pub values: Vec<Option<f64>>,
}

/// Parsed chart data: category labels plus aligned series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    pub categories: Vec<String>,
    pub series: Vec<SeriesData>,
}

/// Maps retrieved rows through a category model.
pub trait ChartDataParser {
    fn parse_rows(&self, rows: &[DataRow]) -> ChartResult<ChartData>;
}

/// Pick the parser variant the category calls for: date-time when the primary
/// group-by has a date grain, comparison when a secondary group-by exists,
/// normal otherwise.
pub fn parser_for(category: &ChartCategory) -> Box<dyn ChartDataParser + '_> {
    if category.group_by.grouping.is_some() {
        Box::new(DateTimeDataParser::new(category))
    } else if category.secondary_group_by().is_some() {
        Box::new(ComparisonDataParser::new(category))
    } else {
        Box::new(NormalDataParser::new(category))
    }
}

/// Single group-by: one category per row, one series per measure.
pub struct NormalDataParser<'a> {
    category: &'a ChartCategory,
}

impl<'a> NormalDataParser<'a> {
    pub fn new(category: &'a ChartCategory) -> Self {
        Self { category }
    }
}

impl ChartDataParser for NormalDataParser<'_> {
    fn parse_rows(&self, rows: &[DataRow]) -> ChartResult<ChartData> {
        let mut data = ChartData {
            categories: Vec::new(),
            series: self
                .category
                .measures()
                .map(|m| SeriesData {
                    label: m.alias.clone(),
                    values: Vec::new(),
                })
                .collect(),
        };
        let group_key = &self.category.group_by.alias;
        for row in rows {
            data.categories.push(label_cell(row, group_key));
            for (slot, measure) in data.series.iter_mut().zip(self.category.measures()) {
                slot.values.push(numeric_cell(row, &measure.alias));
            }
        }
        Ok(data)
    }
}

/// Second group-by splits rows into one series per distinct secondary value;
/// cells without a row stay `None`.
pub struct ComparisonDataParser<'a> {
    category: &'a ChartCategory,
}

impl<'a> ComparisonDataParser<'a> {
    pub fn new(category: &'a ChartCategory) -> Self {
        Self { category }
    }
}

impl ChartDataParser for ComparisonDataParser<'_> {
    fn parse_rows(&self, rows: &[DataRow]) -> ChartResult<ChartData> {
        let group_key = &self.category.group_by.alias;
        let series_key = self
            .category
            .secondary_group_by()
            .map(|g| g.alias.clone())
            .unwrap_or_default();
        // Comparison charts plot a single measure against the split.
        let measure_key = self
            .category
            .measures()
            .next()
            .map(|m| m.alias.clone())
            .unwrap_or_default();

        let mut categories: Vec<String> = Vec::new();
        let mut category_index: HashMap<String, usize> = HashMap::new();
        let mut labels: Vec<String> = Vec::new();
        let mut label_index: HashMap<String, usize> = HashMap::new();
        let mut cells: HashMap<(usize, usize), f64> = HashMap::new();

        for row in rows {
            let category = label_cell(row, group_key);
            let label = label_cell(row, &series_key);
            let cat = *category_index.entry(category.clone()).or_insert_with(|| {
                categories.push(category.clone());
                categories.len() - 1
            });
            let ser = *label_index.entry(label.clone()).or_insert_with(|| {
                labels.push(label.clone());
                labels.len() - 1
            });
            if let Some(value) = numeric_cell(row, &measure_key) {
                cells.insert((cat, ser), value);
            }
        }

        let series = labels
            .iter()
            .enumerate()
            .map(|(ser, label)| SeriesData {
                label: label.clone(),
                values: (0..categories.len())
                    .map(|cat| cells.get(&(cat, ser)).copied())
                    .collect(),
            })
            .collect();

        Ok(ChartData { categories, series })
    }
}

/// Date-grouped primary axis: categories ordered by numeric bucket value
/// ascending, rows without a bucket last.
pub struct DateTimeDataParser<'a> {
    category: &'a ChartCategory,
}

impl<'a> DateTimeDataParser<'a> {
    pub fn new(category: &'a ChartCategory) -> Self {
        Self { category }
    }
}

impl ChartDataParser for DateTimeDataParser<'_> {
    fn parse_rows(&self, rows: &[DataRow]) -> ChartResult<ChartData> {
        let group_key = &self.category.group_by.alias;
        let mut ordered: Vec<(f64, &DataRow)> = rows
            .iter()
            .map(|row| (numeric_cell(row, group_key).unwrap_or(f64::MAX), row))
            .collect();
        ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut data = ChartData {
            categories: Vec::new(),
            series: self
                .category
                .measures()
                .map(|m| SeriesData {
                    label: m.alias.clone(),
                    values: Vec::new(),
                })
                .collect(),
        };
        for (_, row) in ordered {
            data.categories.push(label_cell(row, group_key));
            for (slot, measure) in data.series.iter_mut().zip(self.category.measures()) {
                slot.values.push(numeric_cell(row, &measure.alias));
            }
        }
        Ok(data)
    }
}

/// Category label of a cell: strings pass through, numbers and booleans
/// format, null/missing falls into the empty bucket.
fn label_cell(row: &DataRow, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => EMPTY_BUCKET.to_string(),
    }
}

/// Numeric value of a cell: JSON numbers and numeric strings; anything else
/// is no value.
fn numeric_cell(row: &DataRow, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
