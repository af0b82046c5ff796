//! Admin form actions
//!
//! HTML forms post here as `application/x-www-form-urlencoded`. A successful
//! action answers `303 See Other` back to the list page; invalid input gets
//! a 400 envelope with one message per field. Nothing is rendered.
//!
//! - POST /admin/{exhibitors,events,notifications} - create
//! - POST /admin/{exhibitors,events}/{id} - update
//! - POST /admin/{exhibitors,events,notifications}/{id}/delete - delete

use axum::{extract::State, response::Redirect, routing::post, Router};

use crate::api::extract::{ApiForm, ApiPath};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{EventInput, ExhibitorInput, NotificationInput};

const EXHIBITORS_PAGE: &str = "/admin/exhibitors";
const EVENTS_PAGE: &str = "/admin/events";
const NOTIFICATIONS_PAGE: &str = "/admin/notifications";

type ActionResult = Result<Redirect, ApiError>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/exhibitors", post(create_exhibitor))
        .route("/exhibitors/{id}", post(update_exhibitor))
        .route("/exhibitors/{id}/delete", post(delete_exhibitor))
        .route("/events", post(create_event))
        .route("/events/{id}", post(update_event))
        .route("/events/{id}/delete", post(delete_event))
        .route("/notifications", post(create_notification))
        .route("/notifications/{id}/delete", post(delete_notification))
}

async fn create_exhibitor(
    State(state): State<AppState>,
    ApiForm(input): ApiForm<ExhibitorInput>,
) -> ActionResult {
    state.exhibitor_service.create(input).await?;
    Ok(Redirect::to(EXHIBITORS_PAGE))
}

async fn update_exhibitor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiForm(input): ApiForm<ExhibitorInput>,
) -> ActionResult {
    state.exhibitor_service.update(id, input).await?;
    Ok(Redirect::to(EXHIBITORS_PAGE))
}

async fn delete_exhibitor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ActionResult {
    state.exhibitor_service.delete(id).await?;
    Ok(Redirect::to(EXHIBITORS_PAGE))
}

async fn create_event(
    State(state): State<AppState>,
    ApiForm(input): ApiForm<EventInput>,
) -> ActionResult {
    state.event_service.create(input).await?;
    Ok(Redirect::to(EVENTS_PAGE))
}

async fn update_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiForm(input): ApiForm<EventInput>,
) -> ActionResult {
    state.event_service.update(id, input).await?;
    Ok(Redirect::to(EVENTS_PAGE))
}

async fn delete_event(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ActionResult {
    state.event_service.delete(id).await?;
    Ok(Redirect::to(EVENTS_PAGE))
}

async fn create_notification(
    State(state): State<AppState>,
    ApiForm(input): ApiForm<NotificationInput>,
) -> ActionResult {
    state.notification_service.create(input).await?;
    Ok(Redirect::to(NOTIFICATIONS_PAGE))
}

async fn delete_notification(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ActionResult {
    state.notification_service.delete(id).await?;
    Ok(Redirect::to(NOTIFICATIONS_PAGE))
}
