//! Settings file management

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::errors::BridgeError;
use crate::filesys::file::File;
use crate::logs::LogLevel;
use crate::secret;

/// Bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log output configuration
    #[serde(default)]
    pub log: LogSettings,

    /// Host-facing HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Remote platform client configuration
    #[serde(default)]
    pub platform: PlatformSettings,

    /// MQTT broker used for device status
    #[serde(default)]
    pub mqtt: MqttSettings,

    /// Directory holding the bundled form schemas
    #[serde(default = "default_form_dir")]
    pub form_dir: PathBuf,

    /// Number of device cache shards
    #[serde(default = "default_cache_shards")]
    pub cache_shards: usize,
}

fn default_form_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_cache_shards() -> usize {
    16
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log: LogSettings::default(),
            server: ServerSettings::default(),
            platform: PlatformSettings::default(),
            mqtt: MqttSettings::default(),
            form_dir: default_form_dir(),
            cache_shards: default_cache_shards(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub async fn load(file: &File) -> Result<Self, BridgeError> {
        file.read_json().await.map_err(|e| {
            BridgeError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Directory for rolled log files; stdout only when absent
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Log file name prefix
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,

    /// Emit JSON lines on stdout
    #[serde(default)]
    pub json: bool,
}

fn default_log_prefix() -> String {
    "voucher-bridge.log".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            dir: None,
            file_prefix: default_log_prefix(),
            json: false,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8083
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Remote platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// Upper bound for one remote call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// MQTT broker settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MqttSettings {
    #[serde(default = "default_mqtt_host")]
    pub host: String,

    #[serde(default = "default_mqtt_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(
        default = "secret::empty",
        deserialize_with = "secret::deserialize",
        serialize_with = "secret::serialize"
    )]
    pub password: SecretString,

    /// Client id prefix; a random suffix is appended per connection
    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    /// Upper bound for queueing one status publish, in seconds
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout_secs: u64,
}

fn default_mqtt_host() -> String {
    "127.0.0.1".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "voucher-bridge".to_string()
}

fn default_keep_alive() -> u64 {
    30
}

fn default_publish_timeout() -> u64 {
    5
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            username: String::new(),
            password: secret::empty(),
            client_id: default_client_id(),
            keep_alive_secs: default_keep_alive(),
            publish_timeout_secs: default_publish_timeout(),
        }
    }
}
