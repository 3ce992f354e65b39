//! Selected attributes and sort orders of an entity query.

use super::grouping::DateGrouping;

/// One `<attribute>` of an entity query.
///
/// Immutable after parsing apart from the group-by/aggregate flags, which the
/// parser sets while walking the element's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeExpr {
    pub name: String,
    pub alias: Option<String>,
    /// Date bucketing, when the attribute is grouped by a date grain.
    pub date_grouping: Option<DateGrouping>,
    pub has_group_by: bool,
    pub has_aggregate: bool,
    /// Aggregation function name ("sum", "count", ...) when aggregated.
    pub aggregate_type: Option<String>,
}

impl AttributeExpr {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            date_grouping: None,
            has_group_by: false,
            has_aggregate: false,
            aggregate_type: None,
        }
    }

    /// The key the attribute is registered under: alias when present, else
    /// the attribute name.
    pub fn alias_or_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// One `<order>` of an entity query. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByExpr {
    pub name: Option<String>,
    pub alias: Option<String>,
    pub descending: bool,
}

impl OrderByExpr {
    pub fn by_name(name: &str, descending: bool) -> Self {
        Self {
            name: Some(name.to_string()),
            alias: None,
            descending,
        }
    }

    pub fn by_alias(alias: &str, descending: bool) -> Self {
        Self {
            name: None,
            alias: Some(alias.to_string()),
            descending,
        }
    }
}

/// Descriptor for programmatically appending an `<attribute>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct AttributeSpec {
    pub name: String,
    pub alias: Option<String>,
    pub group_by: bool,
    pub aggregate: Option<String>,
    pub date_grouping: Option<DateGrouping>,
    /// `usertimezone` flag; when a date grouping is present and no explicit
    /// choice is made, serialization defaults this to `true`.
    pub user_time_zone: Option<bool>,
}

impl AttributeSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            alias: None,
            group_by: false,
            aggregate: None,
            date_grouping: None,
            user_time_zone: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    pub fn with_group_by(mut self) -> Self {
        self.group_by = true;
        self
    }

    pub fn with_aggregate(mut self, aggregate: &str) -> Self {
        self.aggregate = Some(aggregate.to_string());
        self
    }

    pub fn with_date_grouping(mut self, grouping: DateGrouping) -> Self {
        self.date_grouping = Some(grouping);
        self
    }

    pub fn with_user_time_zone(mut self, user_time_zone: bool) -> Self {
        self.user_time_zone = Some(user_time_zone);
        self
    }
}
