//! Per-client rate limiting.

use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::web::error::ApiError;

/// Interval between sweeps of idle limiter entries.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

fn per_minute(requests: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN))
}

/// Limiters keyed by client IP, one for login and one for the whole API.
pub struct RateLimitState {
    login: DefaultKeyedRateLimiter<String>,
    api: DefaultKeyedRateLimiter<String>,
}

impl RateLimitState {
    /// Limits are in requests per minute.
    pub fn new(login_rate_limit: u32, api_rate_limit: u32) -> Self {
        Self {
            login: RateLimiter::keyed(per_minute(login_rate_limit)),
            api: RateLimiter::keyed(per_minute(api_rate_limit)),
        }
    }

    pub fn check_login(&self, ip: &str) -> bool {
        self.login.check_key(&ip.to_string()).is_ok()
    }

    pub fn check_api(&self, ip: &str) -> bool {
        self.api.check_key(&ip.to_string()).is_ok()
    }

    /// Drop entries whose quota has fully replenished.
    pub fn cleanup(&self) {
        self.login.retain_recent();
        self.api.retain_recent();
    }

    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                self.cleanup();
            }
        });
    }
}

/// Client IP: first `X-Forwarded-For` hop, then `X-Real-IP`, then the peer.
fn client_ip(req: &Request<Body>) -> String {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(ip) = header("X-Forwarded-For").and_then(|v| v.split(',').next()) {
        return ip.trim().to_string();
    }
    if let Some(ip) = header("X-Real-IP") {
        return ip.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn login_rate_limit(state: Arc<RateLimitState>, req: Request<Body>, next: Next) -> Response {
    let ip = client_ip(&req);
    if !state.check_login(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return ApiError::too_many_requests("Too many login attempts. Please try again later.")
            .into_response();
    }
    next.run(req).await
}

pub async fn api_rate_limit(state: Arc<RateLimitState>, req: Request<Body>, next: Next) -> Response {
    let ip = client_ip(&req);
    if !state.check_api(&ip) {
        tracing::warn!(ip = %ip, "API rate limit exceeded");
        return ApiError::too_many_requests("Too many requests. Please try again later.")
            .into_response();
    }
    next.run(req).await
}
