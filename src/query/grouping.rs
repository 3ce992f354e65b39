//! Date/time grouping buckets for charted attributes.

use serde::{Deserialize, Serialize};

/// Bucket granularity for a date-grouped attribute, ranked from finest to
/// coarsest. The ordinal order is load-bearing: date-range aggregation merges
/// buckets by min/max rank.
///
/// The dialect's "none" sentinel is `Option::<DateGrouping>::None`;
/// [`DateGrouping::from_name`] returns `None` for unrecognized names rather
/// than failing, and callers must check before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateGrouping {
    Day,
    Week,
    Month,
    Quarter,
    Year,
    FiscalPeriod,
    FiscalYear,
}

impl DateGrouping {
    /// Every defined grouping, in ordinal order.
    pub const ALL: [DateGrouping; 7] = [
        DateGrouping::Day,
        DateGrouping::Week,
        DateGrouping::Month,
        DateGrouping::Quarter,
        DateGrouping::Year,
        DateGrouping::FiscalPeriod,
        DateGrouping::FiscalYear,
    ];

    /// Parse a dialect name. Unrecognized names are the "none" sentinel.
    pub fn from_name(name: &str) -> Option<DateGrouping> {
        match name {
            "day" => Some(DateGrouping::Day),
            "week" => Some(DateGrouping::Week),
            "month" => Some(DateGrouping::Month),
            "quarter" => Some(DateGrouping::Quarter),
            "year" => Some(DateGrouping::Year),
            "fiscal-period" => Some(DateGrouping::FiscalPeriod),
            "fiscal-year" => Some(DateGrouping::FiscalYear),
            _ => None,
        }
    }

    /// The dialect name, round-trippable through [`from_name`](Self::from_name).
    pub fn name(self) -> &'static str {
        match self {
            DateGrouping::Day => "day",
            DateGrouping::Week => "week",
            DateGrouping::Month => "month",
            DateGrouping::Quarter => "quarter",
            DateGrouping::Year => "year",
            DateGrouping::FiscalPeriod => "fiscal-period",
            DateGrouping::FiscalYear => "fiscal-year",
        }
    }

    /// Rank ordinal, 0 (finest) through 6 (coarsest).
    pub fn ordinal(self) -> u8 {
        match self {
            DateGrouping::Day => 0,
            DateGrouping::Week => 1,
            DateGrouping::Month => 2,
            DateGrouping::Quarter => 3,
            DateGrouping::Year => 4,
            DateGrouping::FiscalPeriod => 5,
            DateGrouping::FiscalYear => 6,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<DateGrouping> {
        DateGrouping::ALL.get(ordinal as usize).copied()
    }

    /// Fiscal buckets are exclusive per category; calendar buckets merge.
    pub fn is_fiscal(self) -> bool {
        matches!(self, DateGrouping::FiscalPeriod | DateGrouping::FiscalYear)
    }
}
