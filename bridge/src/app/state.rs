//! Application state management

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::CallbackAdapter;
use crate::app::options::AppOptions;
use crate::cache::device::DeviceCache;
use crate::errors::BridgeError;
use crate::http::client::PlatformClient;
use crate::mqtt::client::{MqttClient, MqttConnection};

/// Main application state
pub struct AppState {
    /// Device status cache
    pub cache: Arc<DeviceCache>,

    /// Remote platform client
    pub platform: Arc<PlatformClient>,

    /// MQTT publishing handle
    pub mqtt_client: MqttClient,

    /// Callback adapter served to the host
    pub adapter: Arc<CallbackAdapter>,
}

impl AppState {
    /// Build the state. The MQTT connection is returned for the worker to drive.
    pub fn init(options: &AppOptions) -> Result<(Self, MqttConnection), BridgeError> {
        let cache = Arc::new(DeviceCache::new(options.cache_shards));
        let platform = Arc::new(PlatformClient::new(&options.platform)?);

        let (mqtt_client, connection) = MqttClient::new(
            &options.mqtt_worker.broker_address,
            options.mqtt_worker.publish_timeout,
        )?;

        let adapter = Arc::new(CallbackAdapter::new(
            platform.clone(),
            Arc::new(mqtt_client.clone()),
            cache.clone(),
            options.form_dir.clone(),
        ));

        info!(
            form_dir = %options.form_dir.display(),
            cache_shards = options.cache_shards,
            "App state initialized"
        );

        Ok((
            Self {
                cache,
                platform,
                mqtt_client,
                adapter,
            },
            connection,
        ))
    }

    /// Release resources held by the state.
    ///
    /// Queues the MQTT DISCONNECT, so the worker must still be polling.
    pub async fn shutdown(&self) -> Result<(), BridgeError> {
        info!("Shutting down app state...");
        if let Err(e) = self.mqtt_client.disconnect().await {
            warn!("Failed to disconnect MQTT client: {}", e);
        }
        info!(cached_devices = self.cache.len(), "App state shut down");
        Ok(())
    }
}
