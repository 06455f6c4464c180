//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use crate::http::client::PlatformOptions;
use crate::workers::mqtt;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Remote platform client options
    pub platform: PlatformOptions,

    /// MQTT worker options
    pub mqtt_worker: mqtt::Options,

    /// Directory holding the bundled form schemas
    pub form_dir: PathBuf,

    /// Number of device cache shards
    pub cache_shards: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            server: ServerOptions::default(),
            platform: PlatformOptions::default(),
            mqtt_worker: mqtt::Options::default(),
            form_dir: PathBuf::from("assets"),
            cache_shards: 16,
        }
    }
}

/// Lifecycle options for the bridge
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Host-facing HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
        }
    }
}
