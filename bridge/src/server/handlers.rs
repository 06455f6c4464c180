//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use plugin_api::{
    DeviceDisconnectRequest, DeviceInfoResponse, DeviceListResponse, Envelope,
    GetDeviceInfoRequest, GetDeviceListRequest, GetFormConfigRequest, HealthResponse,
    NotificationRequest,
};
use serde_json::Value;

use crate::errors::BridgeError;
use crate::server::state::ServerState;
use crate::utils::version_info;

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "voucher-bridge".to_string(),
        version: version.version,
    })
}

/// Form configuration handler
pub async fn form_config_handler(
    State(state): State<Arc<ServerState>>,
    Query(req): Query<GetFormConfigRequest>,
) -> Result<Json<Envelope<Option<Value>>>, BridgeError> {
    let form = state.callbacks.get_form_config(&req).await?;
    Ok(Json(Envelope::ok(form)))
}

/// Device disconnect handler
pub async fn disconnect_handler(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<DeviceDisconnectRequest>,
) -> Result<Json<Envelope<()>>, BridgeError> {
    state.callbacks.device_disconnect(&req).await?;
    Ok(Json(Envelope::ok(())))
}

/// Notification handler
pub async fn notify_handler(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<NotificationRequest>,
) -> Result<Json<Envelope<()>>, BridgeError> {
    state.callbacks.notification(&req).await?;
    Ok(Json(Envelope::ok(())))
}

/// Device list handler
pub async fn device_list_handler(
    State(state): State<Arc<ServerState>>,
    Query(req): Query<GetDeviceListRequest>,
) -> Result<Json<DeviceListResponse>, BridgeError> {
    Ok(Json(state.callbacks.get_device_list(&req).await?))
}

/// Device detail handler
pub async fn device_info_handler(
    State(state): State<Arc<ServerState>>,
    Query(req): Query<GetDeviceInfoRequest>,
) -> Result<Json<DeviceInfoResponse>, BridgeError> {
    Ok(Json(state.callbacks.get_device_info(&req).await?))
}
