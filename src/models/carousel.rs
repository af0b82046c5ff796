//! Carousel slide model for the homepage banner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, optional_checkbox, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselSlide {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: String,
    pub link: Option<String>,
    /// 1-based display position
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CarouselSlide {
    pub fn new(title: String, image: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            description: String::new(),
            image,
            link: None,
            sort_order: 0,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSlideInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "optional_checkbox")]
    pub active: Option<bool>,
}

impl CreateSlideInput {
    pub fn validate(self) -> Result<CarouselSlide, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("title", &self.title, 2, "Título");
        errors.require("image", &self.image, "Imagem");
        errors.url("image", Some(&self.image));
        errors.url("link", self.link.as_deref());
        errors.into_result()?;

        let mut slide = CarouselSlide::new(self.title.trim().to_string(), self.image.trim().to_string());
        slide.description = self.description.trim().to_string();
        slide.link = validation::non_empty(self.link);
        slide.active = self.active.unwrap_or(true);
        Ok(slide)
    }
}

/// Partial update; absent fields are left untouched, an empty `link` clears it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSlideInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    #[serde(default, deserialize_with = "optional_checkbox")]
    pub active: Option<bool>,
}

impl UpdateSlideInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            errors.min_len("title", title, 2, "Título");
        }
        if let Some(image) = &self.image {
            errors.require("image", image, "Imagem");
            errors.url("image", Some(image));
        }
        errors.url("link", self.link.as_deref());
        errors.into_result()
    }

    pub fn apply_to(self, slide: &mut CarouselSlide) {
        if let Some(title) = self.title {
            slide.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            slide.description = description.trim().to_string();
        }
        if let Some(image) = self.image {
            slide.image = image.trim().to_string();
        }
        if self.link.is_some() {
            slide.link = validation::non_empty(self.link);
        }
        if let Some(active) = self.active {
            slide.active = active;
        }
    }
}

/// New display order, first id shown first
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderSlidesInput {
    pub ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults_active() {
        let slide = CreateSlideInput {
            title: "Bem-vindo".to_string(),
            image: "/uploads/carousel/1.png".to_string(),
            link: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert!(slide.active);
        assert_eq!(slide.link, None);
    }

    #[test]
    fn test_create_input_requires_image() {
        let errors = CreateSlideInput {
            title: "Bem-vindo".to_string(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errors.get("image").is_some());
    }

    #[test]
    fn test_update_clears_link_and_keeps_rest() {
        let mut slide = CarouselSlide::new("A".to_string(), "/a.png".to_string());
        slide.link = Some("https://feira.com.br".to_string());

        let update = UpdateSlideInput {
            link: Some(String::new()),
            active: Some(false),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        update.apply_to(&mut slide);

        assert_eq!(slide.link, None);
        assert!(!slide.active);
        assert_eq!(slide.title, "A");
    }

    #[test]
    fn test_slide_serializes_order() {
        let mut slide = CarouselSlide::new("A".to_string(), "/a.png".to_string());
        slide.sort_order = 3;
        let json = serde_json::to_value(&slide).unwrap();
        assert_eq!(json["order"], 3);
    }
}
