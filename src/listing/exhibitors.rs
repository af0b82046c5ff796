//! Exhibitor directory filter

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{cmp_text, id_list, matches_selector, matches_term, normalize_term, NumericRange, SortDirection, ALL};
use crate::models::Exhibitor;
use crate::validation::{checkbox, lenient_option};

/// Upper bound of the stand size scale
pub const MAX_STAND_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExhibitorSortKey {
    #[default]
    Name,
    Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExhibitorFilter {
    pub search: String,
    pub category: String,
    pub size: NumericRange,
    pub favorites_only: bool,
    pub sort_by: ExhibitorSortKey,
    pub direction: SortDirection,
}

impl Default for ExhibitorFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL.to_string(),
            size: NumericRange::full(MAX_STAND_SIZE),
            favorites_only: false,
            sort_by: ExhibitorSortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl ExhibitorFilter {
    pub fn clear_filters(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, exhibitor: &Exhibitor, favorites: &HashSet<i64>) -> bool {
        let term = normalize_term(&self.search);
        matches_term(
            &term,
            &[
                &exhibitor.name,
                &exhibitor.description,
                &exhibitor.category,
                &exhibitor.location,
            ],
        ) && matches_selector(self.category.trim(), &exhibitor.category)
            && self.size.contains(exhibitor.stand_size())
            && (!self.favorites_only || favorites.contains(&exhibitor.id))
    }

    /// Filter then sort a copy of `exhibitors`
    pub fn apply(&self, exhibitors: &[Exhibitor], favorites: &HashSet<i64>) -> Vec<Exhibitor> {
        let mut result: Vec<Exhibitor> = exhibitors
            .iter()
            .filter(|e| self.matches(e, favorites))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            let ordering = match self.sort_by {
                ExhibitorSortKey::Name => cmp_text(&a.name, &b.name),
                ExhibitorSortKey::Category => cmp_text(&a.category, &b.category),
            };
            self.direction.apply(ordering)
        });
        result
    }
}

/// Query string accepted by `GET /api/exhibitors`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExhibitorQuery {
    #[serde(default, alias = "search")]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub min_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub max_size: Option<u32>,
    #[serde(default, deserialize_with = "checkbox")]
    pub favorites_only: bool,
    #[serde(default, deserialize_with = "id_list")]
    pub favorites: Vec<i64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

impl ExhibitorQuery {
    pub fn into_parts(self) -> (ExhibitorFilter, HashSet<i64>) {
        let defaults = ExhibitorFilter::default();
        let sort_by = match self.sort.as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("category") => ExhibitorSortKey::Category,
            _ => ExhibitorSortKey::Name,
        };
        let filter = ExhibitorFilter {
            search: self.q.unwrap_or_default(),
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.category),
            size: NumericRange::clamped(
                self.min_size.unwrap_or(0),
                self.max_size.unwrap_or(MAX_STAND_SIZE),
                MAX_STAND_SIZE,
            ),
            favorites_only: self.favorites_only,
            sort_by,
            direction: SortDirection::parse(self.order.as_deref()),
        };
        (filter, self.favorites.into_iter().collect())
    }
}
