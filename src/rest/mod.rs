//! HTTP API Module
//!
//! Builds the axum router, applies CORS and body-size limits, and runs the
//! server with graceful shutdown and a background expired-token sweeper.

pub mod dto;
pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

use crate::app::App;
use crate::config::ServerConfig;

use self::handlers::{admin, auth, history, text};

/// Creates the axum router
pub fn create_router(app: Arc<App>, config: &ServerConfig) -> Router {
    // Build CORS layer
    let cors = if !config.cors_origins.is_empty() {
        // Explicit origins configured: restrict to those
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| {
                let parsed = s.parse();
                if parsed.is_err() {
                    warn!(origin = %s, "invalid CORS origin ignored");
                }
                parsed.ok()
            })
            .collect();
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if config.cors_allow_all {
        // Explicit dev mode opt-in: allow all origins
        Some(CorsLayer::permissive())
    } else {
        // Default: same-origin only (no CORS layer = axum denies cross-origin)
        None
    };

    let mut router = Router::new()
        .route("/health", get(admin::health))
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/uppercase", post(text::uppercase))
        .route("/api/lowercase", post(text::lowercase))
        .route("/api/titlecase", post(text::titlecase))
        .route("/api/reverse", post(text::reverse))
        .route("/api/analyze", post(text::analyze))
        .route("/api/history", get(history::history))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(Extension(app));

    if let Some(cors) = cors {
        router = router.layer(cors);
    }

    router
}

/// Starts the HTTP server with graceful shutdown support.
///
/// Listens for SIGINT (ctrl-c) and SIGTERM. A background task sweeps expired
/// tokens every 60 seconds and stops on shutdown.
pub async fn start_server(
    app: Arc<App>,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let router = create_router(Arc::clone(&app), config);

    // Cancellation channel for the token sweeper
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

    let sweeper_app = Arc::clone(&app);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let swept = sweeper_app.auth.sweep_expired();
                    if swept > 0 {
                        info!(swept, "removed expired token(s)");
                    }
                }
                _ = shutdown_rx.changed() => {
                    info!("token sweeper: shutting down");
                    break;
                }
            }
        }
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Signal sweeper to stop
    let _ = shutdown_tx.send(true);

    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => { info!("received SIGINT, shutting down"); }
            _ = sigterm.recv() => { info!("received SIGTERM, shutting down"); }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for ctrl-c");
        info!("received SIGINT, shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn make_app() -> (Arc<App>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = tmp.path().to_path_buf();
        (Arc::new(App::from_config(config).unwrap()), tmp)
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let (app, _tmp) = make_app();
        let router = create_router(Arc::clone(&app), &app.config.server);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (app, _tmp) = make_app();
        let router = create_router(Arc::clone(&app), &app.config.server);

        let req = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_limit_applies() {
        let (app, _tmp) = make_app();
        let mut config = app.config.server.clone();
        config.max_body_bytes = 64;
        let router = create_router(Arc::clone(&app), &config);

        let oversized = "x".repeat(1024);
        let req = Request::builder()
            .method("POST")
            .uri("/api/uppercase")
            .header("content-type", "application/json")
            .header("x-session-id", "sess-limit")
            .body(Body::from(format!("{{\"text\":\"{oversized}\"}}")))
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_invalid_cors_origin_is_ignored() {
        let (app, _tmp) = make_app();
        let mut config = app.config.server.clone();
        config.cors_origins = vec!["http://ok.example".to_string(), "\u{7f}bad".to_string()];
        let router = create_router(Arc::clone(&app), &config);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = router.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
