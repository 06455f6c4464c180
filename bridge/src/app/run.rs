//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::mqtt::client::MqttConnection;
use crate::errors::BridgeError;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::workers::mqtt;

/// Run the bridge until the shutdown signal resolves
pub async fn run(
    bridge_version: String,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), BridgeError> {
    info!("Initializing voucher bridge {}...", bridge_version);

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.lifecycle.clone());

    if let Err(e) = init(&options, &shutdown_tx, &mut shutdown_manager).await {
        error!("Failed to start bridge: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    shutdown_signal.await;
    info!("Shutdown signal received, shutting down...");

    // Shutdown
    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), BridgeError> {
    let (app_state, connection) = AppState::init(options)?;
    let app_state = Arc::new(app_state);
    shutdown_manager.with_app_state(app_state.clone())?;

    // The worker gets its own signal: it must outlive the app state shutdown
    // so the queued DISCONNECT reaches the broker.
    let mqtt_shutdown_rx = shutdown_manager.mqtt_shutdown_tx.subscribe();
    init_mqtt_worker(
        options.mqtt_worker.clone(),
        connection,
        shutdown_manager,
        mqtt_shutdown_rx,
    )?;

    init_socket_server(
        options,
        app_state,
        shutdown_manager,
        shutdown_tx.subscribe(),
    )
    .await
}

fn init_mqtt_worker(
    options: mqtt::Options,
    connection: MqttConnection,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), BridgeError> {
    info!("Initializing MQTT worker...");

    let mqtt_handle = tokio::spawn(async move {
        mqtt::run(
            &options,
            connection,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    });

    shutdown_manager.with_mqtt_worker_handle(mqtt_handle)
}

async fn init_socket_server(
    options: &AppOptions,
    app_state: Arc<AppState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), BridgeError> {
    info!("Initializing callback HTTP server...");

    let server_state = ServerState::new(app_state.adapter.clone());

    let server_handle = serve(&options.server, Arc::new(server_state), async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_socket_server_handle(server_handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    mqtt_shutdown_tx: broadcast::Sender<()>,
    lifecycle_options: LifecycleOptions,
    app_state: Option<Arc<AppState>>,
    socket_server_handle: Option<JoinHandle<Result<(), BridgeError>>>,
    mqtt_worker_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, lifecycle_options: LifecycleOptions) -> Self {
        let (mqtt_shutdown_tx, _) = broadcast::channel(1);
        Self {
            shutdown_tx,
            mqtt_shutdown_tx,
            lifecycle_options,
            app_state: None,
            socket_server_handle: None,
            mqtt_worker_handle: None,
        }
    }

    pub fn with_app_state(&mut self, state: Arc<AppState>) -> Result<(), BridgeError> {
        if self.app_state.is_some() {
            return Err(BridgeError::ShutdownError("app_state already set".to_string()));
        }
        self.app_state = Some(state);
        Ok(())
    }

    pub fn with_mqtt_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), BridgeError> {
        if self.mqtt_worker_handle.is_some() {
            return Err(BridgeError::ShutdownError("mqtt_handle already set".to_string()));
        }
        self.mqtt_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_socket_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), BridgeError>>,
    ) -> Result<(), BridgeError> {
        if self.socket_server_handle.is_some() {
            return Err(BridgeError::ShutdownError("server_handle already set".to_string()));
        }
        self.socket_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), BridgeError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), BridgeError> {
        info!("Shutting down voucher bridge...");

        // 1. Socket server, so no callback is mid-flight
        if let Some(handle) = self.socket_server_handle.take() {
            handle.await.map_err(|e| BridgeError::ShutdownError(e.to_string()))??;
        }

        // 2. App state, which queues the MQTT DISCONNECT
        if let Some(app_state) = self.app_state.take() {
            app_state.shutdown().await?;
        }

        // 3. MQTT worker, draining until DISCONNECT is sent
        let _ = self.mqtt_shutdown_tx.send(());
        if let Some(handle) = self.mqtt_worker_handle.take() {
            handle.await.map_err(|e| BridgeError::ShutdownError(e.to_string()))?;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
