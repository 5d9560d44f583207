//! Web server for Stash.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::db::RefreshTokenRepository;
use crate::file::FileStorage;
use crate::{Result, StashError};

use super::handlers::{AppState, SharedDatabase};
use super::middleware::{JwtState, RateLimitState};
use super::openapi::create_swagger_router;
use super::router::{create_health_router, create_media_router, create_router};

/// Interval between sweeps of expired and revoked refresh tokens.
const TOKEN_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// HTTP server for the API and media files.
pub struct WebServer {
    addr: SocketAddr,
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    rate_limit: Arc<RateLimitState>,
    cors_origins: Vec<String>,
    media_url_prefix: String,
}

impl WebServer {
    /// Build the server from configuration. Creates the media directory.
    pub fn new(config: &Config, db: SharedDatabase) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| StashError::Config(format!("invalid listen address: {e}")))?;

        let storage = FileStorage::new(&config.files.storage_path, &config.files.media_url_prefix)?;
        tracing::info!("File storage initialized at: {}", config.files.storage_path);

        let web = &config.web;
        let app_state = AppState::new(
            db,
            &web.jwt_secret,
            web.jwt_access_token_expiry_secs,
            web.jwt_refresh_token_expiry_days,
        )
        .with_file_storage(storage, config.max_upload_bytes());

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&web.jwt_secret)),
            rate_limit: Arc::new(RateLimitState::new(web.login_rate_limit, web.api_rate_limit)),
            cors_origins: web.cors_origins.clone(),
            media_url_prefix: config.files.media_url_prefix.trim_end_matches('/').to_string(),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The complete application: API, media, health and Swagger UI.
    pub fn router(&self) -> Router {
        let mut router = create_router(
            self.app_state.clone(),
            self.jwt_state.clone(),
            self.rate_limit.clone(),
            &self.cors_origins,
        )
        .merge(create_health_router())
        .merge(create_swagger_router());

        if let Some(storage) = &self.app_state.file_storage {
            router = router.merge(create_media_router(storage, &self.media_url_prefix));
        }

        router.layer(CompressionLayer::new())
    }

    fn start_token_cleanup_task(db: SharedDatabase) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TOKEN_CLEANUP_INTERVAL);
            // The first tick fires immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                match RefreshTokenRepository::new(db.pool()).cleanup_expired().await {
                    Ok(0) => tracing::debug!("No expired refresh tokens to clean up"),
                    Ok(count) => {
                        tracing::info!(deleted_count = count, "Cleaned up expired/revoked refresh tokens")
                    }
                    Err(e) => tracing::warn!(error = %e, "Failed to cleanup refresh tokens"),
                }
            }
        });
    }

    /// Bind and serve until the process exits.
    pub async fn run(self) -> Result<()> {
        let router = self.router();

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        Self::start_token_cleanup_task(self.app_state.db.clone());
        self.rate_limit.clone().start_cleanup_task();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }
}
