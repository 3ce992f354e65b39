//! Column-set selection for metadata retrieval.

/// Which attribute columns a metadata query should cover: everything, or a
/// named subset. A closed two-variant sum instead of a runtime type test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSet {
    AllColumns,
    Columns(Vec<String>),
}

impl ColumnSet {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSet::Columns(names.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ColumnSet::AllColumns)
    }

    /// Columns in `self` not covered by `other`, order preserved.
    ///
    /// `AllColumns` minus anything enumerable is still `AllColumns`; anything
    /// minus `AllColumns` is empty.
    pub fn difference(&self, other: &ColumnSet) -> ColumnSet {
        match (self, other) {
            (_, ColumnSet::AllColumns) => ColumnSet::Columns(Vec::new()),
            (ColumnSet::AllColumns, ColumnSet::Columns(_)) => ColumnSet::AllColumns,
            (ColumnSet::Columns(mine), ColumnSet::Columns(theirs)) => ColumnSet::Columns(
                mine.iter()
                    .filter(|name| !theirs.contains(name))
                    .cloned()
                    .collect(),
            ),
        }
    }
}
