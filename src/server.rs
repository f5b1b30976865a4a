use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::{
    auth::{self, SessionStore},
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::{setup_signal_handlers, ShutdownSignal},
};

/// How often expired admin sessions are swept
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Request bodies are small JSON documents
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Start the quotation server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Loads the rate table and builds shared state
/// 3. Sets up signal handlers for graceful shutdown and config reload
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let rates = config.load_rate_table()?;
    let priced_cells = rates.priced_cells();
    let state = AppState::new(config.clone(), rates);

    // Setup signal handlers (SIGTERM, SIGINT for shutdown; SIGHUP for reload)
    let (shutdown_tx, signal_handle) = setup_signal_handlers(state.clone(), config_path)?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let purge_handle = spawn_session_purge(state.sessions.clone(), shutdown_tx.subscribe());

    let app = create_router(state, metrics_handle);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting shipquote on {}", addr);
    info!(
        "Configuration: currency {}, {} priced rate cells, rate table {}, metrics {}",
        config.pricing.currency,
        priced_cells,
        config
            .pricing
            .rate_table
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "standard".to_string()),
        if config.metrics.enabled { "enabled" } else { "disabled" }
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    purge_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    // Routes behind an admin session
    let admin_routes = Router::new()
        .route("/api/admin/logout", post(handlers::admin::logout))
        .route("/api/quotation/all", get(handlers::quotations::list_all))
        .route(
            "/api/quotation/:id/status",
            patch(handlers::quotations::update_status),
        )
        .route(
            "/api/quotation/:id/shipment",
            patch(handlers::quotations::update_shipment),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::admin_auth_middleware,
        ));

    let metrics_endpoint = state.settings.load().config.metrics.endpoint.clone();
    let metrics_state = metrics_handle.map(|handle| handlers::metrics_handler::MetricsState {
        handle,
        app: state.clone(),
    });

    let mut app = Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api/estimate", post(handlers::estimate::handle_estimate))
        .route("/api/rates", get(handlers::estimate::list_rates))
        .route(
            "/api/quotation",
            post(handlers::quotations::submit_quotation).get(handlers::quotations::list_by_email),
        )
        .route("/api/admin/login", post(handlers::admin::login))
        .merge(admin_routes)
        .with_state(state);

    if let Some(metrics_state) = metrics_state {
        app = app.merge(
            Router::new()
                .route(&metrics_endpoint, get(handlers::metrics_handler::metrics))
                .with_state(metrics_state),
        );
    }

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Periodically drop expired admin sessions until shutdown
fn spawn_session_purge(
    sessions: Arc<SessionStore>,
    mut shutdown_rx: broadcast::Receiver<ShutdownSignal>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let purged = sessions.purge_expired();
                    if purged > 0 {
                        debug!(purged = purged, remaining = sessions.len(), "Purged expired admin sessions");
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::create_test_config;
    use crate::pricing::RateTable;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    fn test_app(metrics: bool) -> Router {
        let state = AppState::new(create_test_config(), RateTable::standard());
        let handle = metrics.then(|| {
            let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
            Arc::new(recorder.handle())
        });
        create_router(state, handle)
    }

    #[tokio::test]
    async fn test_create_router_serves_health() {
        let response = test_app(true)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_route_absent_when_disabled() {
        let response = test_app(false)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_routes_require_session() {
        let response = test_app(false)
            .oneshot(
                Request::builder()
                    .uri("/api/quotation/all")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_purge_stops_on_shutdown() {
        let sessions = Arc::new(SessionStore::new());
        let (tx, _) = broadcast::channel(1);
        let handle = spawn_session_purge(sessions, tx.subscribe());

        tx.send(ShutdownSignal::Graceful).unwrap();
        handle.await.unwrap();
    }
}
