//! Event schedule filter

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{cmp_text, id_list, matches_selector, matches_term, normalize_term, NumericRange, SortDirection, ALL};
use crate::models::Event;
use crate::validation::{checkbox, lenient_option};

/// Upper bound of the hour-of-day scale
pub const MAX_HOUR: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSortKey {
    #[default]
    Date,
    Time,
    Title,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    pub search: String,
    pub event_type: String,
    pub hours: NumericRange,
    pub favorites_only: bool,
    pub sort_by: EventSortKey,
    pub direction: SortDirection,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            event_type: ALL.to_string(),
            hours: NumericRange::full(MAX_HOUR),
            favorites_only: false,
            sort_by: EventSortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl EventFilter {
    pub fn clear_filters(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, event: &Event, favorites: &HashSet<i64>) -> bool {
        let term = normalize_term(&self.search);
        matches_term(
            &term,
            &[&event.title, &event.description, &event.location, &event.event_type],
        ) && matches_selector(self.event_type.trim(), &event.event_type)
            && self.hours.contains(event.start_hour())
            && (!self.favorites_only || favorites.contains(&event.id))
    }

    fn compare(&self, a: &Event, b: &Event) -> Ordering {
        match self.sort_by {
            EventSortKey::Date => a.date.cmp(&b.date).then(a.start_time.cmp(&b.start_time)),
            EventSortKey::Time => a.start_time.cmp(&b.start_time),
            EventSortKey::Title => cmp_text(&a.title, &b.title),
        }
    }

    /// Filter then sort a copy of `events`
    pub fn apply(&self, events: &[Event], favorites: &HashSet<i64>) -> Vec<Event> {
        let mut result: Vec<Event> = events
            .iter()
            .filter(|e| self.matches(e, favorites))
            .cloned()
            .collect();
        result.sort_by(|a, b| self.direction.apply(self.compare(a, b)));
        result
    }
}

/// Query string accepted by `GET /api/events`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQuery {
    #[serde(default, alias = "search")]
    pub q: Option<String>,
    #[serde(default, rename = "type", alias = "event_type")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub from_hour: Option<u32>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub to_hour: Option<u32>,
    #[serde(default, deserialize_with = "checkbox")]
    pub favorites_only: bool,
    #[serde(default, deserialize_with = "id_list")]
    pub favorites: Vec<i64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
}

impl EventQuery {
    pub fn into_parts(self) -> (EventFilter, HashSet<i64>) {
        let sort_by = match self.sort.as_deref().map(|s| s.trim().to_lowercase()).as_deref() {
            Some("time") => EventSortKey::Time,
            Some("title") => EventSortKey::Title,
            _ => EventSortKey::Date,
        };
        let filter = EventFilter {
            search: self.q.unwrap_or_default(),
            event_type: self
                .event_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| ALL.to_string()),
            hours: NumericRange::clamped(
                self.from_hour.unwrap_or(0),
                self.to_hour.unwrap_or(MAX_HOUR),
                MAX_HOUR,
            ),
            favorites_only: self.favorites_only,
            sort_by,
            direction: SortDirection::parse(self.order.as_deref()),
        };
        (filter, self.favorites.into_iter().collect())
    }
}
