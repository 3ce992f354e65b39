//! Presentation-XML parsing.
//!
//! The presentation dialect describes visual shape independent of the data
//! query: per-series type and colors under `Chart/Series/Series`, legend
//! placement under `Chart/Legends/Legend`, and an optional custom palette on
//! the `Chart` root. Styling values pass through as strings; only the series
//! type is interpreted, because an unsupported type aborts the build.

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};
use crate::xml::{XmlDocument, XmlNode};

/// Series types this renderer knows how to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Column,
    Bar,
    Line,
    Area,
    Pie,
    Funnel,
    Scatter,
    Bubble,
}

impl ChartKind {
    fn from_type_name(name: &str) -> Option<ChartKind> {
        match name.to_ascii_lowercase().as_str() {
            "column" | "stackedcolumn" | "stackedcolumn100" => Some(ChartKind::Column),
            "bar" | "stackedbar" | "stackedbar100" => Some(ChartKind::Bar),
            "line" => Some(ChartKind::Line),
            "area" | "stackedarea" | "stackedarea100" => Some(ChartKind::Area),
            "pie" => Some(ChartKind::Pie),
            "funnel" => Some(ChartKind::Funnel),
            "scatter" | "point" => Some(ChartKind::Scatter),
            "bubble" => Some(ChartKind::Bubble),
            _ => None,
        }
    }
}

/// One `Chart/Series/Series` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDescription {
    pub chart_type: Option<String>,
    pub color: Option<String>,
    pub name: Option<String>,
    pub custom_properties: Option<String>,
    pub border_color: Option<String>,
    pub border_width: Option<u32>,
    pub value_shown_as_label: bool,
}

impl SeriesDescription {
    /// The resolved series kind. A missing type charts as a column series;
    /// an unrecognized one is an unsupported-chart error.
    pub fn chart_kind(&self) -> ChartResult<ChartKind> {
        match &self.chart_type {
            None => Ok(ChartKind::Column),
            Some(name) => ChartKind::from_type_name(name)
                .ok_or_else(|| ChartError::unsupported_chart_type(name)),
        }
    }
}

/// One `Chart/Legends/Legend` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendDescription {
    pub alignment: Option<String>,
    pub docking: Option<String>,
    pub fore_color: Option<String>,
    pub enabled: bool,
}

/// Parsed presentation description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPresentation {
    pub series: Vec<SeriesDescription>,
    pub legends: Vec<LegendDescription>,
    /// Semicolon-delimited `PaletteCustomColors`, split.
    pub palette: Vec<String>,
}

impl ChartPresentation {
    pub fn parse(presentation_xml: &str) -> ChartResult<ChartPresentation> {
        let doc = XmlDocument::parse(presentation_xml)
            .map_err(|e| ChartError::malformed_document(e.to_string()))?;
        let root = XmlNode::for_document(&doc);

        // The Chart element is either the document root or nested in an
        // outer visualization envelope.
        let chart = if root.tag_name() == Some("Chart") {
            root
        } else {
            root.select_single_node("//Chart").ok_or_else(|| {
                ChartError::malformed_document("presentation XML has no Chart element")
            })?
        };

        let series = chart
            .select_nodes("Series/Series")
            .into_iter()
            .map(|node| SeriesDescription {
                chart_type: node.get_attribute("ChartType").map(str::to_string),
                color: node.get_attribute("Color").map(str::to_string),
                name: node.get_attribute("Name").map(str::to_string),
                custom_properties: node.get_attribute("CustomProperties").map(str::to_string),
                border_color: node.get_attribute("BorderColor").map(str::to_string),
                border_width: node
                    .get_attribute("BorderWidth")
                    .and_then(|w| w.parse().ok()),
                value_shown_as_label: node
                    .get_attribute("IsValueShownAsLabel")
                    .is_some_and(|v| v.eq_ignore_ascii_case("true")),
            })
            .collect();

        let legends = chart
            .select_nodes("Legends/Legend")
            .into_iter()
            .map(|node| LegendDescription {
                alignment: node.get_attribute("Alignment").map(str::to_string),
                docking: node.get_attribute("Docking").map(str::to_string),
                fore_color: node.get_attribute("ForeColor").map(str::to_string),
                enabled: node
                    .get_attribute("Enabled")
                    .map_or(true, |v| v.eq_ignore_ascii_case("true")),
            })
            .collect();

        let palette = chart
            .get_attribute("PaletteCustomColors")
            .map(|colors| {
                colors
                    .split(';')
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(ChartPresentation {
            series,
            legends,
            palette,
        })
    }
}
