//! MQTT client implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::errors::BridgeError;
use crate::secret;

/// MQTT broker address and login
#[derive(Debug, Clone)]
pub struct MqttAddress {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub client_id: String,
    pub keep_alive: Duration,
}

impl Default for MqttAddress {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1883,
            username: "".to_string(),
            password: secret::empty(),
            client_id: "voucher-bridge".to_string(),
            keep_alive: Duration::from_secs(30),
        }
    }
}

/// Cloneable MQTT publishing handle.
///
/// Publishes are refused while the broker session is down; the matching
/// [`MqttConnection`] must be polled (see `workers::mqtt`) to establish it.
#[derive(Clone)]
pub struct MqttClient {
    client: AsyncClient,
    publish_timeout: Duration,
    connected: Arc<AtomicBool>,
}

/// Event loop half of an [`MqttClient`], tracking the broker session state
pub struct MqttConnection {
    eventloop: EventLoop,
    connected: Arc<AtomicBool>,
}

/// Outcome of one event loop step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Running,
    /// DISCONNECT has been written to the broker
    Closed,
}

impl MqttClient {
    /// Create a new MQTT client and its event loop
    pub fn new(
        address: &MqttAddress,
        publish_timeout: Duration,
    ) -> Result<(Self, MqttConnection), BridgeError> {
        if address.host.is_empty() {
            return Err(BridgeError::ConfigError("MQTT host is not configured".to_string()));
        }

        // Unique suffix so several bridge instances can share a broker.
        let client_id = format!("{}-{}", address.client_id, uuid::Uuid::new_v4().simple());

        let mut options = MqttOptions::new(client_id, &address.host, address.port);
        options.set_keep_alive(address.keep_alive);
        if !address.username.is_empty() {
            options.set_credentials(&address.username, address.password.expose_secret());
        }

        let (client, eventloop) = AsyncClient::new(options, 64);
        let connected = Arc::new(AtomicBool::new(false));

        Ok((
            Self {
                client,
                publish_timeout,
                connected: connected.clone(),
            },
            MqttConnection {
                eventloop,
                connected,
            },
        ))
    }

    /// Whether the broker has acknowledged the current session
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Publish a payload with at-least-once delivery
    pub async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BridgeError> {
        if !self.is_connected() {
            return Err(BridgeError::PublishError(format!(
                "MQTT broker not connected, dropping publish to {}",
                topic
            )));
        }

        let publish = self
            .client
            .publish(topic, QoS::AtLeastOnce, false, payload);

        match tokio::time::timeout(self.publish_timeout, publish).await {
            Ok(Ok(())) => {
                debug!("Published to: {}", topic);
                Ok(())
            }
            Ok(Err(e)) => Err(BridgeError::PublishError(e.to_string())),
            Err(_) => Err(BridgeError::PublishError(format!(
                "publish to {} timed out after {:?}",
                topic, self.publish_timeout
            ))),
        }
    }

    /// Queue a DISCONNECT for the broker.
    ///
    /// The connection must keep being polled until it reports
    /// [`PollStatus::Closed`] for the packet to go out.
    pub async fn disconnect(&self) -> Result<(), BridgeError> {
        match tokio::time::timeout(self.publish_timeout, self.client.disconnect()).await {
            Ok(Ok(())) => {
                info!("MQTT disconnect requested");
                Ok(())
            }
            Ok(Err(e)) => Err(BridgeError::PublishError(e.to_string())),
            Err(_) => Err(BridgeError::PublishError(format!(
                "disconnect timed out after {:?}",
                self.publish_timeout
            ))),
        }
    }
}

impl MqttConnection {
    /// Drive the event loop one step, logging connection events
    pub async fn poll(&mut self) -> Result<PollStatus, BridgeError> {
        match self.eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    info!("MQTT connected");
                    self.connected.store(true, Ordering::SeqCst);
                } else {
                    warn!("MQTT connection refused: {:?}", ack.code);
                    self.connected.store(false, Ordering::SeqCst);
                }
                Ok(PollStatus::Running)
            }
            Ok(Event::Incoming(Packet::PubAck(ack))) => {
                debug!("Publish acknowledged: {}", ack.pkid);
                Ok(PollStatus::Running)
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                warn!("MQTT broker closed the session");
                self.connected.store(false, Ordering::SeqCst);
                Ok(PollStatus::Running)
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("MQTT disconnected");
                self.connected.store(false, Ordering::SeqCst);
                Ok(PollStatus::Closed)
            }
            Ok(_) => Ok(PollStatus::Running),
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                warn!("MQTT poll error: {}", e);
                Err(BridgeError::PublishError(e.to_string()))
            }
        }
    }
}
