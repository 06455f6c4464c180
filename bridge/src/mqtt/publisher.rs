//! Device status publishing

use async_trait::async_trait;
use tracing::info;

use crate::errors::BridgeError;
use crate::models::device::DeviceStatus;
use crate::mqtt::client::MqttClient;
use crate::mqtt::topics::Topics;

/// Pushes device presence to the host platform
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    async fn publish_status(&self, device_id: &str, status: DeviceStatus) -> Result<(), BridgeError>;
}

#[async_trait]
impl StatusPublisher for MqttClient {
    async fn publish_status(&self, device_id: &str, status: DeviceStatus) -> Result<(), BridgeError> {
        let topic = Topics::device_status(device_id);
        self.publish(&topic, status.as_payload().as_bytes().to_vec())
            .await?;
        info!(device_id, %status, "Published device status");
        Ok(())
    }
}
