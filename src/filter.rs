//! Filtering of a transaction snapshot by search term, category and branch.

use crate::model::{Category, Transaction};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The sentinel meaning "no restriction on this dimension".
pub const ALL: &str = "all";

/// A restriction on one dimension of a transaction: either everything, or one exact value.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn only(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr,
{
    type Err = T::Err;

    /// `all` (in any case) or an empty string parses to `Selection::All`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL) {
            return Ok(Selection::All);
        }
        T::from_str(trimmed).map(Selection::Only)
    }
}

impl<T: Display> Display for Selection<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Only(v) => Display::fmt(v, f),
        }
    }
}

/// The three filter controls, ANDed together.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Case-insensitive substring matched against description, branch and reference number.
    /// Empty matches everything.
    pub search: String,
    pub category: Selection<Category>,
    pub branch: Selection<String>,
}

impl Filter {
    /// A filter with every control at its sentinel.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Selection::Only(category);
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Selection::Only(branch.into());
        self
    }

    /// True when no control restricts anything.
    pub fn is_unrestricted(&self) -> bool {
        self.search.is_empty() && self.category.is_all() && self.branch.is_all()
    }

    /// Whether `t` passes all three controls.
    pub fn matches(&self, t: &Transaction) -> bool {
        self.matches_search(t) && self.category.matches(&t.category) && self.branch.matches(&t.branch)
    }

    fn matches_search(&self, t: &Transaction) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        contains(&t.description)
            || contains(&t.branch)
            || t.reference_number.as_deref().is_some_and(contains)
    }

    /// The matching transactions, in snapshot order.
    pub fn apply(&self, snapshot: &[Transaction]) -> Vec<Transaction> {
        snapshot.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_snapshot;

    #[test]
    fn test_unrestricted_filter_returns_snapshot() {
        let snapshot = sample_snapshot();
        assert!(Filter::all().is_unrestricted());
        assert_eq!(Filter::all().apply(&snapshot), snapshot);
    }

    #[test]
    fn test_branch_filter() {
        let snapshot = sample_snapshot();
        let filtered = Filter::all().branch("Central").apply(&snapshot);
        assert_eq!(filtered, vec![snapshot[0].clone()]);
    }

    #[test]
    fn test_category_filter() {
        let snapshot = sample_snapshot();
        let filtered = Filter::all().category(Category::Printing).apply(&snapshot);
        assert_eq!(filtered, vec![snapshot[1].clone()]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let snapshot = sample_snapshot();
        let filtered = Filter::all().search("QUIJOTE").apply(&snapshot);
        assert_eq!(filtered, vec![snapshot[0].clone()]);

        let by_branch = Filter::all().search("engin").apply(&snapshot);
        assert_eq!(by_branch, vec![snapshot[1].clone()]);
    }

    #[test]
    fn test_search_matches_reference_number() {
        let snapshot = sample_snapshot();
        let filtered = Filter::all().search("rec-2024").apply(&snapshot);
        assert_eq!(filtered, vec![snapshot[1].clone()]);
    }

    #[test]
    fn test_controls_are_anded() {
        let snapshot = sample_snapshot();
        let filtered = Filter::all()
            .branch("Central")
            .category(Category::Printing)
            .apply(&snapshot);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let snapshot = sample_snapshot();
        let filters = [
            Filter::all(),
            Filter::all().search("e"),
            Filter::all().branch("Engineering"),
            Filter::all().category(Category::Fines).search("multa"),
        ];
        for filter in filters {
            let once = filter.apply(&snapshot);
            let twice = filter.apply(&once);
            assert_eq!(once, twice, "{filter:?}");
        }
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(Filter::all().search("x").apply(&[]).is_empty());
    }

    #[test]
    fn test_selection_from_str() {
        assert_eq!(Selection::<Category>::from_str("all").unwrap(), Selection::All);
        assert_eq!(Selection::<Category>::from_str("ALL").unwrap(), Selection::All);
        assert_eq!(Selection::<String>::from_str("").unwrap(), Selection::All);
        assert_eq!(
            Selection::<Category>::from_str("fines").unwrap(),
            Selection::Only(Category::Fines)
        );
        assert!(Selection::<Category>::from_str("parking").is_err());
        assert_eq!(Selection::Only(Category::Donation).to_string(), "Donaciones");
    }
}
