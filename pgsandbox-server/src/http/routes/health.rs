//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::counter::{CounterService, ServiceStatus};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    /// Counter store state, only reported by the count service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<&'static str>,
}

fn health(service: &'static str, store: Option<ServiceStatus>) -> Json<HealthResponse> {
    let status = match store {
        Some(ServiceStatus::Unavailable) => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status,
        service,
        version: env!("CARGO_PKG_VERSION"),
        store: store.map(|s| s.as_str()),
    })
}

/// GET /health for the counter service
async fn counter_health(State(counter): State<CounterService>) -> Json<HealthResponse> {
    health("count", Some(counter.status()))
}

/// Health routes for a stateless service
pub fn router<S>(service: &'static str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(move || async move { health(service, None) }))
}

/// Health routes for the counter service
pub fn counter_router() -> Router<CounterService> {
    Router::new().route("/health", get(counter_health))
}
