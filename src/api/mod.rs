//! API layer - HTTP handlers and routing
//!
//! - `/api/*` JSON endpoints for the public site and the carousel admin
//! - `/admin/*` form actions
//! - `/uploads/*` uploaded files
//! - `/health` database ping

pub mod admin;
pub mod carousel;
pub mod events;
pub mod extract;
pub mod exhibitors;
pub mod map;
pub mod middleware;
pub mod notifications;
pub mod responses;
pub mod settings;
pub mod upload;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub use middleware::{ApiError, AppState};
pub use responses::{ApiResponse, ApiResult};

/// Build the `/api` router
pub fn build_api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/exhibitors", exhibitors::router())
        .nest("/events", events::router())
        .nest("/notifications", notifications::router())
        .nest("/settings", settings::router())
        .nest("/carousel", carousel::router())
        .nest("/map", map::router())
        .nest("/upload", upload::router(&state.upload_config))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let uploads = ServeDir::new(&state.upload_config.path);

    Router::new()
        .nest("/api", build_api_router(&state))
        .nest("/admin", admin::router())
        .route("/health", get(health))
        .nest_service("/uploads", uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origin)),
        )
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if origin.trim() == "*" {
        return cors.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => cors.allow_origin(value),
        Err(e) => {
            tracing::warn!("Invalid CORS origin {:?} ({}), allowing any origin", origin, e);
            cors.allow_origin(Any)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub database: &'static str,
}

/// GET /health
async fn health(State(state): State<AppState>) -> ApiResult<HealthStatus> {
    match state.pool.ping().await {
        Ok(()) => Ok(ApiResponse::ok(HealthStatus { database: "ok" })),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Banco de dados indisponível"))
        }
    }
}
