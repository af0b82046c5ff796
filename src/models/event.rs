//! Event model: a scheduled happening (talk, auction, show)

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, checkbox, string_list, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(title: String, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            description: String::new(),
            date,
            start_time,
            end_time,
            location: String::new(),
            event_type: String::new(),
            featured: false,
            tags: Vec::new(),
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hour of day the event starts, 0..=23
    pub fn start_hour(&self) -> u32 {
        self.start_time.hour()
    }
}

/// `HH:MM` wire format for times of day
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::validation::parse_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid time of day: {}", raw)))
    }
}

/// Admin form payload for creating or editing an event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub location: String,
    #[serde(rename = "type", alias = "event_type", default)]
    pub event_type: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub featured: bool,
    #[serde(default, deserialize_with = "string_list")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// The typed values an [`EventInput`] carries once it has passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEvent {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub event_type: String,
    pub featured: bool,
    pub tags: Vec<String>,
    pub image: Option<String>,
}

impl EventInput {
    pub fn validate(self) -> Result<ValidEvent, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("title", &self.title, 2, "Título");
        errors.min_len("description", &self.description, 10, "Descrição");
        errors.require("location", &self.location, "Local");
        errors.require("type", &self.event_type, "Tipo");
        errors.url("image", self.image.as_deref());

        let date = errors.date("date", &self.date);
        let start = errors.time("start_time", &self.start_time);
        let end = errors.time("end_time", &self.end_time);
        if let (Some(start), Some(end)) = (start, end) {
            if end <= start {
                errors.add("end_time", "Horário de término deve ser após o início");
            }
        }

        match (errors.into_result(), date, start, end) {
            (Ok(()), Some(date), Some(start_time), Some(end_time)) => Ok(ValidEvent {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                date,
                start_time,
                end_time,
                location: self.location.trim().to_string(),
                event_type: self.event_type.trim().to_string(),
                featured: self.featured,
                tags: self.tags,
                image: validation::non_empty(self.image),
            }),
            (Err(errors), ..) => Err(errors),
            // Unreachable in practice: a failed parse always records an error.
            (Ok(()), ..) => {
                let mut errors = ValidationErrors::new();
                errors.add("date", "Data ou horário inválido");
                Err(errors)
            }
        }
    }
}

impl Event {
    /// Overwrite every editable field from validated values
    pub fn apply(&mut self, valid: ValidEvent) {
        self.title = valid.title;
        self.description = valid.description;
        self.date = valid.date;
        self.start_time = valid.start_time;
        self.end_time = valid.end_time;
        self.location = valid.location;
        self.event_type = valid.event_type;
        self.featured = valid.featured;
        self.tags = valid.tags;
        self.image = valid.image;
    }

    pub fn from_valid(valid: ValidEvent) -> Self {
        let mut event = Event::new(String::new(), valid.date, valid.start_time, valid.end_time);
        event.apply(valid);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EventInput {
        EventInput {
            title: "Leilão de Gado".to_string(),
            description: "Leilão de gado nelore com transmissão ao vivo".to_string(),
            date: "2026-05-04".to_string(),
            start_time: "14:00".to_string(),
            end_time: "17:30".to_string(),
            location: "Arena Principal".to_string(),
            event_type: "leilão".to_string(),
            featured: true,
            tags: vec!["gado".to_string()],
            image: Some(" ".to_string()),
        }
    }

    #[test]
    fn test_valid_input_produces_typed_values() {
        let valid = input().validate().unwrap();
        assert_eq!(valid.date, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        assert_eq!(valid.start_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert_eq!(valid.image, None);

        let event = Event::from_valid(valid);
        assert_eq!(event.start_hour(), 14);
        assert!(event.featured);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let mut bad = input();
        bad.end_time = "13:00".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.get("end_time").is_some());
    }

    #[test]
    fn test_bad_date_and_time_rejected() {
        let mut bad = input();
        bad.date = "04/05/2026".to_string();
        bad.start_time = "2pm".to_string();
        let errors = bad.validate().unwrap_err();
        assert!(errors.get("date").is_some());
        assert!(errors.get("start_time").is_some());
    }

    #[test]
    fn test_event_json_shape() {
        let event = Event::from_valid(input().validate().unwrap());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["start_time"], "14:00");
        assert_eq!(json["end_time"], "17:30");
        assert_eq!(json["date"], "2026-05-04");
        assert_eq!(json["type"], "leilão");

        let back: Event = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
