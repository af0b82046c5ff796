//! Venue map endpoint
//!
//! Markers are projected through a [`MapViewer`] sized to the full map, so
//! at the default zoom the screen coordinates equal the stored positions.

use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::extract::ApiQuery;
use crate::api::middleware::AppState;
use crate::api::responses::{ApiResponse, ApiResult};
use crate::map::{MapViewer, MarkerView, MAP_SIZE};
use crate::validation::lenient_option;

#[derive(Debug, Default, Deserialize)]
pub struct MarkersQuery {
    /// Clamped and snapped like the viewer's own zoom controls
    #[serde(default, deserialize_with = "lenient_option")]
    pub zoom: Option<f64>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/markers", get(list_markers))
}

/// GET /api/map/markers - exhibitors without a map position are skipped
async fn list_markers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MarkersQuery>,
) -> ApiResult<Vec<MarkerView>> {
    let exhibitors = state.exhibitor_service.list().await?;
    let mut viewer = MapViewer::new(exhibitors, MAP_SIZE);
    if let Some(zoom) = query.zoom {
        viewer.set_zoom(zoom);
    }
    Ok(ApiResponse::ok(viewer.markers()))
}
