//! Input validation
//!
//! Admin submissions arrive either as `application/x-www-form-urlencoded`
//! bodies (every value is a string, unchecked boxes are absent) or as JSON.
//! The deserializers here accept both shapes, and [`ValidationErrors`]
//! collects per-field messages so a single response can report every problem.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern is valid")
});

/// Field name to message, ordered by field for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field; the first message per field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn require(&mut self, field: &str, value: &str, label: &str) {
        if value.trim().is_empty() {
            self.add(field, format!("{} é obrigatório", label));
        }
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize, label: &str) {
        let len = value.trim().chars().count();
        if len == 0 {
            self.add(field, format!("{} é obrigatório", label));
        } else if len < min {
            self.add(
                field,
                format!("{} deve ter pelo menos {} caracteres", label, min),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if !EMAIL_RE.is_match(v) {
                self.add(field, "Email inválido");
            }
        }
    }

    pub fn url(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if !is_url(v) {
                self.add(field, "URL inválida");
            }
        }
    }

    /// Parse `YYYY-MM-DD`, recording an error when it fails
    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.add(field, "Data inválida (use AAAA-MM-DD)");
        }
        parsed
    }

    /// Parse `HH:MM`, recording an error when it fails
    pub fn time(&mut self, field: &str, value: &str) -> Option<NaiveTime> {
        let parsed = parse_time(value);
        if parsed.is_none() {
            self.add(field, "Horário inválido (use HH:MM)");
        }
        parsed
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Absolute http(s) URLs, or site-relative paths such as `/uploads/x.png`
pub fn is_url(value: &str) -> bool {
    let value = value.trim();
    URL_RE.is_match(value) || (value.starts_with('/') && !value.starts_with("//"))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Accepts `HH:MM` and `HH:MM:SS`
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Trim and drop empty strings
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Deserialize an optional value that may arrive typed (JSON) or as text
/// (forms). Blank text becomes `None`.
pub fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        Value(T),
        Text(String),
    }

    match Option::<Lenient<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Lenient::Value(v)) => Ok(Some(v)),
        Some(Lenient::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

/// Checkbox semantics: JSON booleans, or form values `on`/`true`/`1`/`yes`
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "on" | "true" | "1" | "yes" | "sim"
        ),
    })
}

/// Same as [`checkbox`] but keeps absence distinguishable
pub fn optional_checkbox<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    checkbox(deserializer).map(Some)
}

/// A list of strings from a JSON array or a comma-separated form value
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum List {
        Items(Vec<String>),
        Text(String),
    }

    let items = match Option::<List>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(List::Items(items)) => items,
        Some(List::Text(text)) => text.split(',').map(str::to_string).collect(),
    };

    Ok(items
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "lenient_option")]
        x: Option<f64>,
        #[serde(default, deserialize_with = "checkbox")]
        featured: bool,
        #[serde(default, deserialize_with = "string_list")]
        tags: Vec<String>,
    }

    #[test]
    fn test_lenient_option_accepts_json_numbers_and_text() {
        let probe: Probe = serde_json::from_str(r#"{"x": 12.5}"#).unwrap();
        assert_eq!(probe.x, Some(12.5));

        let probe: Probe = serde_json::from_str(r#"{"x": "7"}"#).unwrap();
        assert_eq!(probe.x, Some(7.0));

        let probe: Probe = serde_json::from_str(r#"{"x": "  "}"#).unwrap();
        assert_eq!(probe.x, None);

        let probe: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(probe.x, None);
    }

    #[test]
    fn test_lenient_option_rejects_garbage() {
        assert!(serde_json::from_str::<Probe>(r#"{"x": "abc"}"#).is_err());
    }

    #[test]
    fn test_checkbox_and_tag_list() {
        let probe: Probe =
            serde_json::from_str(r#"{"featured": "on", "tags": "gado, leilão ,, máquinas"}"#)
                .unwrap();
        assert!(probe.featured);
        assert_eq!(probe.tags, vec!["gado", "leilão", "máquinas"]);

        let probe: Probe =
            serde_json::from_str(r#"{"featured": false, "tags": ["a", " b "]}"#).unwrap();
        assert!(!probe.featured);
        assert_eq!(probe.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_email_and_url_shapes() {
        assert!(is_email("contato@feira.com.br"));
        assert!(!is_email("contato@feira"));
        assert!(!is_email("con tato@feira.com"));

        assert!(is_url("https://feira.com.br/mapa"));
        assert!(is_url("/uploads/carousel/1.png"));
        assert!(!is_url("//evil.example"));
        assert!(!is_url("feira.com.br"));
    }

    #[test]
    fn test_parse_time_and_date() {
        assert_eq!(parse_time("09:30"), NaiveTime::from_hms_opt(9, 30, 0));
        assert_eq!(parse_time("18:00:00"), NaiveTime::from_hms_opt(18, 0, 0));
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_date("2026-05-04"), NaiveDate::from_ymd_opt(2026, 5, 4));
        assert_eq!(parse_date("04/05/2026"), None);
    }

    #[test]
    fn test_errors_collect_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.min_len("name", "A", 2, "Nome");
        errors.require("name", "", "Nome");
        errors.email("email", Some("nope"));
        errors.url("website", Some(""));

        assert_eq!(errors.get("name"), Some("Nome deve ter pelo menos 2 caracteres"));
        assert_eq!(errors.get("email"), Some("Email inválido"));
        assert_eq!(errors.get("website"), None);
        assert_eq!(errors.fields().len(), 2);
        assert!(errors.into_result().is_err());
    }
}
