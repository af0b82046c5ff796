//! Homepage carousel endpoints
//!
//! - GET /api/carousel (`?active=true`)
//! - POST /api/carousel
//! - PUT /api/carousel/reorder - `{ "ids": [3, 1, 2] }`
//! - PUT /api/carousel/{id}
//! - DELETE /api/carousel/{id}

use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use serde::Deserialize;

use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult};
use crate::models::{CarouselSlide, CreateSlideInput, ReorderSlidesInput, UpdateSlideInput};
use crate::validation::checkbox;

#[derive(Debug, Default, Deserialize)]
pub struct CarouselQuery {
    #[serde(default, deserialize_with = "checkbox")]
    pub active: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_slides).post(create_slide))
        .route("/reorder", put(reorder_slides))
        .route("/{id}", put(update_slide).delete(delete_slide))
}

async fn list_slides(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CarouselQuery>,
) -> ApiResult<Vec<CarouselSlide>> {
    Ok(ApiResponse::ok(state.carousel_service.list(query.active).await?))
}

async fn create_slide(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateSlideInput>,
) -> ApiResult<CarouselSlide> {
    Ok(ApiResponse::ok(state.carousel_service.create(input).await?))
}

async fn update_slide(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<UpdateSlideInput>,
) -> ApiResult<CarouselSlide> {
    Ok(ApiResponse::ok(state.carousel_service.update(id, input).await?))
}

async fn delete_slide(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.carousel_service.delete(id).await?;
    Ok(ApiResponse::empty())
}

/// Responds with the full slide list in its new order
async fn reorder_slides(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ReorderSlidesInput>,
) -> ApiResult<Vec<CarouselSlide>> {
    Ok(ApiResponse::ok(state.carousel_service.reorder(&input.ids).await?))
}
