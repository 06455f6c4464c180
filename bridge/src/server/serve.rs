//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::BridgeError;
use crate::server::handlers::{
    device_info_handler, device_list_handler, disconnect_handler, form_config_handler,
    health_handler, notify_handler,
};
use crate::server::state::ServerState;

/// Build the callback router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health
        .route("/health", get(health_handler))
        // Host callbacks
        .route("/api/v1/form/config", get(form_config_handler))
        .route("/api/v1/device/disconnect", post(disconnect_handler))
        .route("/api/v1/notify/event", post(notify_handler))
        .route("/api/v1/plugin/device/list", get(device_list_handler))
        .route("/api/v1/plugin/device/info", get(device_info_handler))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), BridgeError>>, BridgeError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| BridgeError::ServerError(e.to_string()))
    });

    Ok(handle)
}
