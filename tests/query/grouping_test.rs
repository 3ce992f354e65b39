//! Integration tests for date-grouping buckets.

use fetchchart::query::DateGrouping;

#[test]
fn test_every_grouping_round_trips_through_its_name() {
    for grouping in DateGrouping::ALL {
        assert_eq!(DateGrouping::from_name(grouping.name()), Some(grouping));
    }
}

#[test]
fn test_ordinals_cover_zero_through_six() {
    let ordinals: Vec<u8> = DateGrouping::ALL.iter().map(|g| g.ordinal()).collect();
    assert_eq!(ordinals, [0, 1, 2, 3, 4, 5, 6]);
    for grouping in DateGrouping::ALL {
        assert_eq!(DateGrouping::from_ordinal(grouping.ordinal()), Some(grouping));
    }
    assert_eq!(DateGrouping::from_ordinal(7), None);
}

#[test]
fn test_rank_order_matches_granularity() {
    assert!(DateGrouping::Day < DateGrouping::Week);
    assert!(DateGrouping::Week < DateGrouping::Month);
    assert!(DateGrouping::Month < DateGrouping::Quarter);
    assert!(DateGrouping::Quarter < DateGrouping::Year);
    assert!(DateGrouping::Year < DateGrouping::FiscalPeriod);
    assert!(DateGrouping::FiscalPeriod < DateGrouping::FiscalYear);
}

#[test]
fn test_unknown_names_are_the_none_sentinel() {
    assert_eq!(DateGrouping::from_name("none"), None);
    assert_eq!(DateGrouping::from_name("Month"), None);
    assert_eq!(DateGrouping::from_name(""), None);
}

#[test]
fn test_fiscal_classification() {
    assert!(DateGrouping::FiscalPeriod.is_fiscal());
    assert!(DateGrouping::FiscalYear.is_fiscal());
    assert!(!DateGrouping::Year.is_fiscal());
    assert!(!DateGrouping::Day.is_fiscal());
}

#[test]
fn test_serde_uses_dialect_names() {
    let json = serde_json::to_string(&DateGrouping::FiscalPeriod).unwrap();
    assert_eq!(json, "\"fiscal-period\"");
    let parsed: DateGrouping = serde_json::from_str("\"quarter\"").unwrap();
    assert_eq!(parsed, DateGrouping::Quarter);
}
