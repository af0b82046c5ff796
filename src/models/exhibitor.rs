//! Exhibitor model: a company occupying a booth at the fair

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, lenient_option, ValidationErrors};

/// Marker coordinates on the venue map image, in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exhibitor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Booth identifier, e.g. "Pavilhão A - 12"
    #[serde(default)]
    pub location: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub map_position: Option<MapPosition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exhibitor {
    pub fn new(name: String, category: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            description: String::new(),
            category,
            location: String::new(),
            phone: None,
            email: None,
            website: None,
            logo_url: None,
            map_position: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stand size used by the size-range filter.
    ///
    /// There is no stand area on record yet; the value is derived from the id
    /// so the range filter has something stable to work with.
    pub fn stand_size(&self) -> u32 {
        synthetic_stand_size(self.id)
    }

    /// Overwrite every editable field from a validated input
    pub fn apply(&mut self, input: ExhibitorInput) {
        self.name = input.name.trim().to_string();
        self.description = input.description.trim().to_string();
        self.category = input.category.trim().to_string();
        self.location = input.location.trim().to_string();
        self.phone = validation::non_empty(input.phone);
        self.email = validation::non_empty(input.email);
        self.website = validation::non_empty(input.website);
        self.logo_url = validation::non_empty(input.logo_url);
        self.map_position = match (input.map_x, input.map_y) {
            (Some(x), Some(y)) => Some(MapPosition { x, y }),
            _ => None,
        };
    }
}

/// `(id % 10) * 10`, giving sizes 0..=90
pub fn synthetic_stand_size(id: i64) -> u32 {
    (id.rem_euclid(10) * 10) as u32
}

/// Admin form payload for creating or editing an exhibitor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExhibitorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub map_x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub map_y: Option<f64>,
}

impl ExhibitorInput {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_len("name", &self.name, 2, "Nome");
        errors.min_len("description", &self.description, 10, "Descrição");
        errors.require("category", &self.category, "Categoria");
        errors.require("location", &self.location, "Localização");
        errors.email("email", self.email.as_deref());
        errors.url("website", self.website.as_deref());
        errors.url("logo_url", self.logo_url.as_deref());

        match (self.map_x, self.map_y) {
            (Some(_), None) => errors.add("map_y", "Informe as duas coordenadas"),
            (None, Some(_)) => errors.add("map_x", "Informe as duas coordenadas"),
            (Some(x), Some(y)) if x < 0.0 || y < 0.0 => {
                errors.add("map_x", "Coordenadas devem ser positivas")
            }
            _ => {}
        }

        errors.into_result()
    }
}
