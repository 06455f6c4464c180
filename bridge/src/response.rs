//! Mapping between remote platform results, bridge errors and host envelopes

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use platform_api::PlatformResponse;
use plugin_api::Envelope;

use crate::errors::BridgeError;

/// Unwrap a platform response, turning a non-zero code into `RemoteLogicError`
/// that keeps the platform's own message.
pub fn remote_result<T: Default>(response: PlatformResponse<T>) -> Result<T, BridgeError> {
    if !response.is_ok() {
        return Err(BridgeError::RemoteLogicError {
            code: response.code,
            msg: response.msg,
        });
    }
    Ok(response.data.unwrap_or_default())
}

/// HTTP status reported to the host for an error
pub fn status_code(err: &BridgeError) -> StatusCode {
    match err {
        BridgeError::ValidationError(_)
        | BridgeError::DecodeError(_)
        | BridgeError::UnsupportedFormType(_) => StatusCode::BAD_REQUEST,
        BridgeError::NotFound(_) => StatusCode::NOT_FOUND,
        BridgeError::TransportError(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        BridgeError::TransportError(_) | BridgeError::RemoteLogicError { .. } => {
            StatusCode::BAD_GATEWAY
        }
        BridgeError::PublishError(_) => StatusCode::SERVICE_UNAVAILABLE,
        BridgeError::IoError(_)
        | BridgeError::ConfigError(_)
        | BridgeError::ServerError(_)
        | BridgeError::ShutdownError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Host envelope describing an error
pub fn error_envelope(err: &BridgeError) -> Envelope<()> {
    Envelope::error(i32::from(status_code(err).as_u16()), err.to_string())
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        (status_code(&self), Json(error_envelope(&self))).into_response()
    }
}
