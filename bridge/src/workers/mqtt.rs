//! MQTT worker driving the status publisher's connection

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{info, warn};

use crate::mqtt::client::{MqttAddress, MqttConnection, PollStatus};

/// MQTT worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// MQTT broker address
    pub broker_address: MqttAddress,

    /// Delay before polling again after a connection error
    pub reconnect_delay: Duration,

    /// Upper bound for queueing one publish
    pub publish_timeout: Duration,

    /// How long to keep polling after shutdown so a queued DISCONNECT is sent
    pub drain_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            broker_address: MqttAddress::default(),
            reconnect_delay: Duration::from_secs(5),
            publish_timeout: Duration::from_secs(5),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// Run the MQTT worker.
///
/// Polls the connection until shutdown. rumqttc reconnects on the next poll
/// after an error, so a failure only costs `reconnect_delay`. Once shutdown is
/// signalled the worker keeps polling, without reconnecting, until the
/// DISCONNECT queued by the client goes out or `drain_timeout` elapses.
pub async fn run<S, F>(
    options: &Options,
    mut connection: MqttConnection,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!(
        "MQTT worker starting, broker {}:{}",
        options.broker_address.host, options.broker_address.port
    );

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => break,
            result = connection.poll() => match result {
                Ok(PollStatus::Running) => {}
                Ok(PollStatus::Closed) => {
                    info!("MQTT worker stopped, connection closed");
                    return;
                }
                Err(_) => {
                    warn!("MQTT connection lost, retrying in {:?}", options.reconnect_delay);
                    tokio::select! {
                        _ = &mut shutdown_signal => break,
                        _ = sleep_fn(options.reconnect_delay) => {}
                    }
                }
            }
        }
    }

    info!("MQTT worker shutting down...");
    match tokio::time::timeout(options.drain_timeout, drain(&mut connection)).await {
        Ok(()) => info!("MQTT worker stopped"),
        Err(_) => warn!(
            "MQTT worker stopped before DISCONNECT was sent (waited {:?})",
            options.drain_timeout
        ),
    }
}

async fn drain(connection: &mut MqttConnection) {
    loop {
        match connection.poll().await {
            Ok(PollStatus::Running) => {}
            Ok(PollStatus::Closed) | Err(_) => return,
        }
    }
}
