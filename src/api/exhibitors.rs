//! Exhibitor directory endpoints
//!
//! - GET /api/exhibitors - filtered, searched and sorted directory
//! - GET /api/exhibitors/{id} - single exhibitor

use axum::{
    extract::State,
    routing::get,
    Router,
};

use crate::api::extract::{ApiPath, ApiQuery};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult};
use crate::listing::ExhibitorQuery;
use crate::models::Exhibitor;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_exhibitors))
        .route("/{id}", get(get_exhibitor))
}

/// Query: `q`, `category`, `min_size`, `max_size`, `favorites_only`,
/// `favorites=1,2,3`, `sort=name|category`, `order=asc|desc`
async fn list_exhibitors(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExhibitorQuery>,
) -> ApiResult<Vec<Exhibitor>> {
    let (filter, favorites) = query.into_parts();
    let exhibitors = state.exhibitor_service.search(&filter, &favorites).await?;
    Ok(ApiResponse::ok(exhibitors))
}

async fn get_exhibitor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Exhibitor> {
    Ok(ApiResponse::ok(state.exhibitor_service.get(id).await?))
}
