//! Chart model: query definition, presentation description, data parsing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────────┐
//! │    fetch XML      │   │   presentation XML    │
//! └──────────────────┘   └──────────────────────┘
//!          │                        │
//!          ▼ [FetchQuery]           ▼ [ChartPresentation]
//! ┌─────────────────────────────────────────────────────────┐
//! │          ChartDataDefinition (categories/measures)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [parser_for + retrieved rows]
//! ┌─────────────────────────────────────────────────────────┐
//! │          ChartData (category labels + series)            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The final mapping of [`ChartData`] into a chart-library configuration
//! object is the rendering target's concern, not this crate's.

mod definition;
mod parser;
mod presentation;

pub use definition::{
    CategoryAggregators, ChartCategory, ChartDataDefinition, ChartGroupBy, ChartMeasure,
    DateRangeAggregator, MeasureCollection, EMPTY_BUCKET,
};
pub use parser::{
    parser_for, ChartData, ChartDataParser, ComparisonDataParser, DataRow, DateTimeDataParser,
    NormalDataParser, SeriesData,
};
pub use presentation::{ChartKind, ChartPresentation, LegendDescription, SeriesDescription};
