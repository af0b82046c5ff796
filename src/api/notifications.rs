//! Notification endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};

use crate::api::extract::ApiPath;
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult};
use crate::models::Notification;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{id}/read", post(mark_read))
}

/// GET /api/notifications - newest first
async fn list_notifications(State(state): State<AppState>) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::ok(state.notification_service.list().await?))
}

/// POST /api/notifications/{id}/read
async fn mark_read(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Notification> {
    Ok(ApiResponse::ok(state.notification_service.mark_read(id).await?))
}
