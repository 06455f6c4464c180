//! Service voucher codec
//!
//! A voucher is the per-tenant credential blob the host attaches to list and
//! detail callbacks. It is decoded fresh for every request and never stored.
//! Decoding is lenient (absent keys become empty); callers check the fields
//! their flow needs with [`Voucher::require_remote`] or
//! [`Voucher::require_binding`] before any remote call.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::errors::BridgeError;
use crate::secret;

pub const FIELD_SERVER_URL: &str = "ServerURL";
pub const FIELD_SECRET: &str = "Secret";
pub const FIELD_AGENT_ID: &str = "AgentId";
pub const FIELD_EXTERNAL_API_KEY: &str = "ThingsPanelApiKey";

/// Decoded service voucher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Base URL of the remote device platform
    #[serde(rename = "ServerURL", default, deserialize_with = "null_as_empty")]
    pub remote_base_url: String,

    /// Platform secret, sent as `x-token` or in the bind body
    #[serde(
        rename = "Secret",
        default = "secret::empty",
        deserialize_with = "secret::deserialize",
        serialize_with = "secret::serialize"
    )]
    pub secret: SecretString,

    #[serde(rename = "AuthType", default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,

    /// Agent the devices are bound to on the remote platform
    #[serde(rename = "AgentId", default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// Host platform API key handed to the remote platform on bind
    #[serde(
        rename = "ThingsPanelApiKey",
        default,
        deserialize_with = "secret::deserialize_option",
        serialize_with = "secret::serialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_api_key: Option<SecretString>,

    /// Host platform API URL the remote platform calls back into
    #[serde(
        rename = "ThingsPanelApiURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_api_url: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Credentials required by the `/device/bind` call, borrowed from a checked voucher
#[derive(Debug, Clone, Copy)]
pub struct Binding<'a> {
    pub base_url: &'a str,
    pub secret: &'a SecretString,
    pub agent_id: &'a str,
    pub external_api_key: &'a SecretString,
}

impl Voucher {
    /// Decode a raw voucher string.
    ///
    /// Only a JSON object is accepted. Unknown keys are ignored and missing
    /// keys decode as empty.
    pub fn decode(raw: &str) -> Result<Self, BridgeError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(BridgeError::DecodeError(
                "voucher must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Encode the voucher back into its wire form
    pub fn encode(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the fields needed for any remote call
    pub fn require_remote(&self) -> Result<(), BridgeError> {
        require_non_empty(FIELD_SERVER_URL, &self.remote_base_url)?;
        require_non_empty(FIELD_SECRET, self.secret.expose_secret())?;
        Url::parse(&self.remote_base_url).map_err(|e| {
            BridgeError::ValidationError(format!(
                "voucher field {} is not a valid URL: {}",
                FIELD_SERVER_URL, e
            ))
        })?;
        Ok(())
    }

    /// Check the fields needed for a device bind and borrow them
    pub fn require_binding(&self) -> Result<Binding<'_>, BridgeError> {
        self.require_remote()?;
        let agent_id = self.agent_id.as_deref().unwrap_or_default();
        require_non_empty(FIELD_AGENT_ID, agent_id)?;
        let external_api_key = match &self.external_api_key {
            Some(key) if !key.expose_secret().is_empty() => key,
            _ => return Err(missing_field(FIELD_EXTERNAL_API_KEY)),
        };

        Ok(Binding {
            base_url: &self.remote_base_url,
            secret: &self.secret,
            agent_id,
            external_api_key,
        })
    }

    /// Absolute URL of a platform endpoint
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.remote_base_url, path)
    }
}

impl Binding<'_> {
    pub fn endpoint(&self, path: &str) -> String {
        join_url(self.base_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

// Only an empty string is missing; whitespace is forwarded as-is.
fn require_non_empty(field: &str, value: &str) -> Result<(), BridgeError> {
    if value.is_empty() {
        return Err(missing_field(field));
    }
    Ok(())
}

fn missing_field(field: &str) -> BridgeError {
    BridgeError::ValidationError(format!("voucher is missing required field {}", field))
}
