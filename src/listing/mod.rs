//! Filtering, search and sorting for exhibitor and event listings
//!
//! Everything in here is pure: filters take a borrowed slice plus the
//! visitor's favorite ids and return a fresh `Vec`, leaving the source
//! untouched. The same filters back the `GET /api/exhibitors` and
//! `GET /api/events` query strings.

mod events;
mod exhibitors;

pub use events::{EventFilter, EventQuery, EventSortKey};
pub use exhibitors::{ExhibitorFilter, ExhibitorQuery, ExhibitorSortKey};

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

/// Selector value that disables the category/type filter
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "desc" || v == "descending" => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// Inclusive range over a bounded integer scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRange {
    pub min: u32,
    pub max: u32,
}

impl NumericRange {
    pub const fn full(bound: u32) -> Self {
        Self { min: 0, max: bound }
    }

    /// Build a range clamped to `0..=bound`; reversed ends are swapped
    pub fn clamped(min: u32, max: u32, bound: u32) -> Self {
        let (min, max) = (min.min(bound), max.min(bound));
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn is_full(&self, bound: u32) -> bool {
        self.min == 0 && self.max >= bound
    }
}

/// Case-insensitive substring match; an empty needle matches everything
pub(crate) fn matches_term(term: &str, haystacks: &[&str]) -> bool {
    if term.is_empty() {
        return true;
    }
    haystacks.iter().any(|h| h.to_lowercase().contains(term))
}

pub(crate) fn matches_selector(selector: &str, value: &str) -> bool {
    selector.is_empty() || selector.eq_ignore_ascii_case(ALL) || selector.to_lowercase() == value.to_lowercase()
}

pub(crate) fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub(crate) fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Comma-separated ids (`favorites=1,2,3`); tokens that are not integers are skipped
pub(crate) fn id_list<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = crate::validation::string_list(deserializer)?;
    Ok(items.iter().filter_map(|s| s.parse().ok()).collect())
}
