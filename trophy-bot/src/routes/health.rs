use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;

use crate::logging::request_logger;
use crate::store::UserStore;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn metrics(State(store): State<Arc<dyn UserStore>>) -> Response {
    let users = match store.count() {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to count users: {}", e);
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };

    let body = format!(
        "# HELP trophybot_up Whether the service is up\n\
         # TYPE trophybot_up gauge\n\
         trophybot_up 1\n\
         # HELP trophybot_users Number of known users\n\
         # TYPE trophybot_users gauge\n\
         trophybot_users {}\n",
        users
    );
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

pub fn router(store: Arc<dyn UserStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn(request_logger))
        .with_state(store)
}
