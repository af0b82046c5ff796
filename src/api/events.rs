//! Schedule endpoints
//!
//! - GET /api/events - filtered and sorted schedule
//! - GET /api/events/{id} - single event

use axum::{
    extract::State,
    routing::get,
    Router,
};

use crate::api::extract::{ApiPath, ApiQuery};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult};
use crate::listing::EventQuery;
use crate::models::Event;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/{id}", get(get_event))
}

/// Query: `q`, `type`, `from_hour`, `to_hour`, `favorites_only`,
/// `favorites=1,2,3`, `sort=date|time|title`, `order=asc|desc`
async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventQuery>,
) -> ApiResult<Vec<Event>> {
    let (filter, favorites) = query.into_parts();
    let events = state.event_service.search(&filter, &favorites).await?;
    Ok(ApiResponse::ok(events))
}

async fn get_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Event> {
    Ok(ApiResponse::ok(state.event_service.get(id).await?))
}
