//! Feira - content service for an agricultural trade fair
//!
//! Exhibitor directory, event schedule, venue map, notifications and the
//! homepage carousel, served as a JSON API with admin form actions.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod favorites;
pub mod listing;
pub mod map;
pub mod models;
pub mod services;
pub mod validation;
