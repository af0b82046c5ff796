//! Feira - trade fair content service

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feira::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCarouselRepository, SqlxEventRepository, SqlxExhibitorRepository,
            SqlxNotificationRepository, SqlxSettingsRepository,
        },
    },
    services::{
        CarouselService, EventService, ExhibitorService, NotificationService, SettingsService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feira=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting feira...");

    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized (ttl {}s)", config.cache.ttl_seconds);

    let state = AppState {
        pool: pool.clone(),
        exhibitor_service: Arc::new(ExhibitorService::new(
            SqlxExhibitorRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        event_service: Arc::new(EventService::new(
            SqlxEventRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        notification_service: Arc::new(NotificationService::new(
            SqlxNotificationRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        carousel_service: Arc::new(CarouselService::new(
            SqlxCarouselRepository::boxed(pool.clone()),
            cache.clone(),
        )),
        settings_service: Arc::new(SettingsService::new(
            SqlxSettingsRepository::boxed(pool.clone()),
            cache,
        )),
        upload_config: Arc::new(config.upload.clone()),
    };

    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    pool.close().await;
    Ok(())
}
