//! Settings service
//!
//! Site settings live as key/value rows. Reads fill any missing key with its
//! default; updates always write the full set.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use super::{cache_get, cache_set, invalidate, ServiceResult};
use crate::cache::Cache;
use crate::db::repositories::SettingsRepository;
use crate::validation::{self, ValidationErrors};

const CACHE_KEY: &str = "settings:site";
const CACHE_PATTERN: &str = "settings:*";

/// Known setting keys
pub mod keys {
    pub const SITE_NAME: &str = "site_name";
    pub const EVENT_START_DATE: &str = "event_start_date";
    pub const EVENT_END_DATE: &str = "event_end_date";
    pub const CONTACT_EMAIL: &str = "contact_email";
    pub const CONTACT_PHONE: &str = "contact_phone";
    pub const CONTACT_ADDRESS: &str = "contact_address";
    pub const INSTAGRAM: &str = "instagram";
    pub const FACEBOOK: &str = "facebook";
    pub const YOUTUBE: &str = "youtube";
    pub const WHATSAPP: &str = "whatsapp";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub site_name: String,
    /// `YYYY-MM-DD`, empty when not announced yet
    pub event_start_date: String,
    pub event_end_date: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub instagram: String,
    pub facebook: String,
    pub youtube: String,
    pub whatsapp: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "Feira Agropecuária".to_string(),
            event_start_date: String::new(),
            event_end_date: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            contact_address: String::new(),
            instagram: String::new(),
            facebook: String::new(),
            youtube: String::new(),
            whatsapp: String::new(),
        }
    }
}

impl SiteSettings {
    fn from_map(mut map: HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let mut take = |key: &str, default: String| map.remove(key).unwrap_or(default);
        Self {
            site_name: take(keys::SITE_NAME, defaults.site_name),
            event_start_date: take(keys::EVENT_START_DATE, defaults.event_start_date),
            event_end_date: take(keys::EVENT_END_DATE, defaults.event_end_date),
            contact_email: take(keys::CONTACT_EMAIL, defaults.contact_email),
            contact_phone: take(keys::CONTACT_PHONE, defaults.contact_phone),
            contact_address: take(keys::CONTACT_ADDRESS, defaults.contact_address),
            instagram: take(keys::INSTAGRAM, defaults.instagram),
            facebook: take(keys::FACEBOOK, defaults.facebook),
            youtube: take(keys::YOUTUBE, defaults.youtube),
            whatsapp: take(keys::WHATSAPP, defaults.whatsapp),
        }
    }

    fn into_map(self) -> HashMap<String, String> {
        [
            (keys::SITE_NAME, self.site_name),
            (keys::EVENT_START_DATE, self.event_start_date),
            (keys::EVENT_END_DATE, self.event_end_date),
            (keys::CONTACT_EMAIL, self.contact_email),
            (keys::CONTACT_PHONE, self.contact_phone),
            (keys::CONTACT_ADDRESS, self.contact_address),
            (keys::INSTAGRAM, self.instagram),
            (keys::FACEBOOK, self.facebook),
            (keys::YOUTUBE, self.youtube),
            (keys::WHATSAPP, self.whatsapp),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// Settings form payload. Every field is optional on the wire; blanks are
/// stored as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteSettingsInput {
    pub site_name: String,
    pub event_start_date: String,
    pub event_end_date: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub instagram: String,
    pub facebook: String,
    pub youtube: String,
    pub whatsapp: String,
}

impl SiteSettingsInput {
    pub fn validate(self) -> Result<SiteSettings, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("site_name", &self.site_name, 2, "Nome do site");
        errors.email("contact_email", Some(&self.contact_email));
        errors.url("instagram", Some(&self.instagram));
        errors.url("facebook", Some(&self.facebook));
        errors.url("youtube", Some(&self.youtube));

        let start = optional_date(&mut errors, "event_start_date", &self.event_start_date);
        let end = optional_date(&mut errors, "event_end_date", &self.event_end_date);
        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("event_end_date", "Data de término deve ser após o início");
            }
        }
        errors.into_result()?;

        let clean = |value: String| value.trim().to_string();
        Ok(SiteSettings {
            site_name: clean(self.site_name),
            event_start_date: clean(self.event_start_date),
            event_end_date: clean(self.event_end_date),
            contact_email: clean(self.contact_email),
            contact_phone: clean(self.contact_phone),
            contact_address: clean(self.contact_address),
            instagram: clean(self.instagram),
            facebook: clean(self.facebook),
            youtube: clean(self.youtube),
            whatsapp: clean(self.whatsapp),
        })
    }
}

fn optional_date(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
) -> Option<chrono::NaiveDate> {
    if value.trim().is_empty() {
        None
    } else {
        errors.date(field, value)
    }
}

pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    cache: Arc<Cache>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>, cache: Arc<Cache>) -> Self {
        Self { repo, cache }
    }

    pub async fn get(&self) -> ServiceResult<SiteSettings> {
        if let Some(settings) = cache_get(&self.cache, CACHE_KEY).await {
            return Ok(settings);
        }
        let generation = self.cache.generation();
        let stored = self.repo.get_all().await.context("Failed to load settings")?;
        let settings = SiteSettings::from_map(stored);
        cache_set(&self.cache, CACHE_KEY, &settings, generation).await;
        Ok(settings)
    }

    /// Single raw value, without defaults
    pub async fn get_value(&self, key: &str) -> ServiceResult<Option<String>> {
        let value = self.repo.get(key).await.context("Failed to load setting")?;
        Ok(validation::non_empty(value))
    }

    pub async fn update(&self, input: SiteSettingsInput) -> ServiceResult<SiteSettings> {
        let settings = input.validate()?;
        self.repo
            .set_many(&settings.clone().into_map())
            .await
            .context("Failed to save settings")?;
        invalidate(&self.cache, CACHE_PATTERN).await;
        tracing::info!("Site settings updated");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxSettingsRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::services::ServiceError;

    async fn setup_service() -> SettingsService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SettingsService::new(
            SqlxSettingsRepository::boxed(pool),
            create_cache(&CacheConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_defaults_fill_missing_keys() {
        let service = setup_service().await;
        assert_eq!(service.get().await.unwrap(), SiteSettings::default());
        assert_eq!(service.get_value(keys::INSTAGRAM).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_round_trips() {
        let service = setup_service().await;
        let input = SiteSettingsInput {
            site_name: " ExpoAgro ".to_string(),
            event_start_date: "2026-05-04".to_string(),
            event_end_date: "2026-05-10".to_string(),
            contact_email: "contato@expoagro.com.br".to_string(),
            instagram: "https://instagram.com/expoagro".to_string(),
            ..Default::default()
        };
        service.get().await.unwrap();
        service.update(input).await.unwrap();

        let settings = service.get().await.unwrap();
        assert_eq!(settings.site_name, "ExpoAgro");
        assert_eq!(settings.event_end_date, "2026-05-10");
        assert_eq!(settings.facebook, "");
        assert_eq!(
            service.get_value(keys::CONTACT_EMAIL).await.unwrap().as_deref(),
            Some("contato@expoagro.com.br")
        );
    }

    #[tokio::test]
    async fn test_update_validates() {
        let service = setup_service().await;
        let input = SiteSettingsInput {
            site_name: "ExpoAgro".to_string(),
            event_start_date: "2026-05-10".to_string(),
            event_end_date: "2026-05-04".to_string(),
            contact_email: "contato".to_string(),
            ..Default::default()
        };
        match service.update(input).await {
            Err(ServiceError::Validation(errors)) => {
                assert!(errors.get("event_end_date").is_some());
                assert!(errors.get("contact_email").is_some());
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(service.get().await.unwrap(), SiteSettings::default());
    }
}
