//! Voucher Bridge - Entry Point
//!
//! Serves the host plugin callbacks and bridges them to the remote device
//! platform named by each request's voucher.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use voucher_bridge::app::options::{AppOptions, ServerOptions};
use voucher_bridge::app::run::run;
use voucher_bridge::filesys::file::File;
use voucher_bridge::http::client::PlatformOptions;
use voucher_bridge::logs::{init_logging, LogOptions};
use voucher_bridge::mqtt::client::MqttAddress;
use voucher_bridge::settings::Settings;
use voucher_bridge::utils::version_info;
use voucher_bridge::workers::mqtt;

use tracing::{error, info};

const DEFAULT_SETTINGS_PATH: &str = "config.json";

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(_) => println!("{}", version.version),
        }
        return;
    }

    // Retrieve the settings file; defaults apply when it does not exist
    let settings_path = cli_args
        .get("config")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings_file = File::new(&settings_path);
    let settings_exists = settings_file.exists().await;
    let settings = if settings_exists {
        match Settings::load(&settings_file).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        }
    } else {
        Settings::default()
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: settings.log.dir.clone(),
        file_prefix: settings.log.file_prefix.clone(),
        json_format: settings.log.json,
        ..Default::default()
    };
    let _log_guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            println!("Failed to initialize logging: {e}");
            None
        }
    };

    if !settings_exists {
        info!("Settings file {} not found, using defaults", settings_path);
    }

    // Run the bridge
    let options = AppOptions {
        server: ServerOptions {
            host: settings.server.host.clone(),
            port: settings.server.port,
        },
        platform: PlatformOptions {
            request_timeout: Duration::from_secs(settings.platform.request_timeout_secs),
            connect_timeout: Duration::from_secs(settings.platform.connect_timeout_secs),
        },
        mqtt_worker: mqtt::Options {
            broker_address: MqttAddress {
                host: settings.mqtt.host.clone(),
                port: settings.mqtt.port,
                username: settings.mqtt.username.clone(),
                password: settings.mqtt.password.clone(),
                client_id: settings.mqtt.client_id.clone(),
                keep_alive: Duration::from_secs(settings.mqtt.keep_alive_secs),
            },
            publish_timeout: Duration::from_secs(settings.mqtt.publish_timeout_secs),
            ..Default::default()
        },
        form_dir: settings.form_dir.clone(),
        cache_shards: settings.cache_shards,
        ..Default::default()
    };

    info!("Running voucher bridge with options: {:?}", options);
    let result = run(version.version, options, await_shutdown_signal()).await;
    if let Err(e) = result {
        error!("Failed to run the bridge: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                _ => {
                    error!("Failed to install signal handlers, waiting for Ctrl+C only");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
        info!("Ctrl+C received, shutting down...");
    }
}
