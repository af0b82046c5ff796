//! Notification model for visitor announcements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    Urgent,
    ScheduleChange,
    Reminder,
    #[default]
    Info,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Urgent => write!(f, "urgent"),
            Self::ScheduleChange => write!(f, "schedule-change"),
            Self::Reminder => write!(f, "reminder"),
            Self::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "urgent" => Ok(Self::Urgent),
            "schedule-change" => Ok(Self::ScheduleChange),
            "reminder" => Ok(Self::Reminder),
            "info" => Ok(Self::Info),
            _ => Err(anyhow::anyhow!("Invalid notification type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn new(title: String, message: String, notification_type: NotificationType) -> Self {
        Self {
            id: 0,
            title,
            message,
            notification_type,
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// Admin form payload for publishing a notification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", alias = "notification_type", default)]
    pub notification_type: String,
}

impl NotificationInput {
    pub fn validate(self) -> Result<Notification, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("title", &self.title, 2, "Título");
        errors.min_len("message", &self.message, 5, "Mensagem");

        let kind = if self.notification_type.trim().is_empty() {
            Some(NotificationType::default())
        } else {
            self.notification_type.parse().ok()
        };
        if kind.is_none() {
            errors.add("type", "Tipo de notificação inválido");
        }

        errors.into_result()?;
        Ok(Notification::new(
            self.title.trim().to_string(),
            self.message.trim().to_string(),
            kind.unwrap_or_default(),
        ))
    }
}
