//! Server state

use std::sync::Arc;

use crate::adapter::DeviceCallbacks;

/// Server state shared across handlers
pub struct ServerState {
    pub callbacks: Arc<dyn DeviceCallbacks>,
}

impl ServerState {
    pub fn new(callbacks: Arc<dyn DeviceCallbacks>) -> Self {
        Self { callbacks }
    }
}
