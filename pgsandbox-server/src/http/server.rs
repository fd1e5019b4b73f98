//! Axum server setup
//!
//! One builder per standalone service, all sharing the same middleware:
//! - Localhost-only CORS by default
//! - Tracing, request timeout, and panic recovery
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::error::panic_response;
use super::routes;
use crate::counter::CounterService;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,

    /// Upper bound on handling a single request
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8082)),
            cors_permissive: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Counter service: GET/POST /count, GET /health
pub fn count_app(counter: CounterService, config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(routes::count::router())
        .merge(routes::health::counter_router())
        .with_state(counter);
    with_middleware(app, config)
}

/// Random quote service: GET /get, POST /post, GET /health
pub fn hello_app(pool: PgPool, config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(routes::quotes::router())
        .merge(routes::health::router("hello"))
        .with_state(pool);
    with_middleware(app, config)
}

/// User lookup service: GET/POST /api/user, GET /health
pub fn query_app(pool: PgPool, config: &ServerConfig) -> Router {
    let app = Router::new()
        .merge(routes::users::router())
        .merge(routes::health::router("query"))
        .with_state(pool);
    with_middleware(app, config)
}

fn with_middleware(app: Router, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        let port = config.bind_addr.port();
        let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
            .iter()
            .filter_map(|host| format!("http://{}:{}", host, port).parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(cors);

    app.layer(middleware)
}

/// Serve `app` until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = connect_with_retry(&db_config, RetryPolicy::default()).await?;
/// let app = query_app(pool, &config);
/// run_server(app, &config).await?;
/// ```
pub async fn run_server(app: Router, config: &ServerConfig) -> Result<(), ServerError> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::counter::{CounterStore, MemoryStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8082);
        assert!(!config.cors_permissive);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn count_app_serves_count_and_health() {
        let store = Arc::new(MemoryStore::new());
        store.ensure_initialized().await.unwrap();
        let app = count_app(CounterService::new(store), &ServerConfig::default());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/count").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["service"], "count");
        assert_eq!(body["store"], "ready");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let store = Arc::new(MemoryStore::new());
        let app = count_app(CounterService::new(store), &ServerConfig::default());

        let response = app
            .oneshot(Request::builder().uri("/counts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn panicking_handler_is_500() {
        async fn boom() -> &'static str {
            panic!("boom")
        }

        let app = with_middleware(
            Router::new().route("/boom", axum::routing::get(boom)),
            &ServerConfig::default(),
        );

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_handler_is_408() {
        async fn stall() -> &'static str {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "late"
        }

        let config = ServerConfig {
            request_timeout: Duration::from_secs(1),
            ..ServerConfig::default()
        };
        let app = with_middleware(
            Router::new().route("/stall", axum::routing::get(stall)),
            &config,
        );

        let response = app
            .oneshot(Request::builder().uri("/stall").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
