use crate::error::AppError;
use awx_exporter_collector::MetricsRegistry;
use axum::{
    extract::State,
    http::header,
    response::{
        IntoResponse,
        Response,
    },
    routing::get,
    Json,
    Router,
};
use chrono::{
    SecondsFormat,
    Utc,
};
use serde::Serialize;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "awx-exporter";

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MetricsRegistry>,
}

pub fn create_router(registry: Arc<MetricsRegistry>) -> Router {
    let state = AppState { registry };

    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
}

async fn metrics(State(state): State<AppState>) -> Result<Response, AppError> {
    let body = state.registry.encode()?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response())
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    timestamp: String,
    service: &'static str,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        service: SERVICE_NAME,
    })
}
