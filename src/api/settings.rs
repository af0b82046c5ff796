//! Site settings endpoints
//!
//! - GET /api/settings - current settings, defaults for unset keys
//! - PUT /api/settings - replace every setting at once

use axum::{extract::State, routing::get, Router};

use crate::api::extract::ApiJson;
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult};
use crate::services::{SiteSettings, SiteSettingsInput};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    Ok(ApiResponse::ok(state.settings_service.get().await?))
}

async fn update_settings(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SiteSettingsInput>,
) -> ApiResult<SiteSettings> {
    Ok(ApiResponse::ok(state.settings_service.update(input).await?))
}
