use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing. `RUST_LOG` wins over the configured level.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Paths polled by uptime monitors and scrapers.
const HEALTH_CHECK_PATHS: &[&str] = &["/health", "/metrics"];

pub fn is_health_check(path: &str) -> bool {
    HEALTH_CHECK_PATHS.contains(&path.trim_end_matches('/'))
}

/// Middleware that logs HTTP requests.
///
/// Monitor polls are logged at DEBUG, other requests at INFO, and any
/// 5xx at WARN regardless of path.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status >= 500 {
        tracing::warn!(%method, %path, status, duration_ms, "HTTP request failed");
    } else if is_health_check(&path) {
        tracing::debug!(%method, %path, status, duration_ms, "Health check");
    } else {
        tracing::info!(%method, %path, status, duration_ms, "HTTP request");
    }

    response
}
