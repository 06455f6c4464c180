//! Form configuration callback

use std::path::Path;
use std::str::FromStr;

use plugin_api::GetFormConfigRequest;
use serde_json::Value;
use tracing::{info, warn};

use crate::adapter::CallbackAdapter;
use crate::errors::BridgeError;
use crate::filesys::file::File;

/// Bundled service voucher form, relative to the form directory
pub const SERVICE_VOUCHER_FORM: &str = "form_service_voucher.json";

/// Form types the host may request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    /// Device configuration form (`CFG`)
    DeviceConfig,
    /// Device voucher form (`VCR`)
    DeviceVoucher,
    /// Service access point voucher form (`SVCR`)
    ServiceVoucher,
}

impl FromStr for FormType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CFG" => Ok(FormType::DeviceConfig),
            "VCR" => Ok(FormType::DeviceVoucher),
            "SVCR" => Ok(FormType::ServiceVoucher),
            _ => Err(BridgeError::UnsupportedFormType(s.to_string())),
        }
    }
}

impl CallbackAdapter {
    pub(crate) async fn handle_get_form_config(
        &self,
        req: &GetFormConfigRequest,
    ) -> Result<Option<Value>, BridgeError> {
        info!(
            protocol_type = %req.protocol_type,
            device_type = %req.device_type,
            form_type = %req.form_type,
            "Received form config request"
        );

        let form_type = req.form_type.parse::<FormType>().inspect_err(|e| {
            warn!(operation = "get_form_config", form_type = %req.form_type, error = %e, "Rejected form config request");
        })?;

        match form_type {
            // No schema yet for device-level forms.
            FormType::DeviceConfig | FormType::DeviceVoucher => Ok(None),
            FormType::ServiceVoucher => Ok(read_form(&self.form_dir.join(SERVICE_VOUCHER_FORM)).await),
        }
    }
}

/// Read a form schema at call time. A missing or corrupt file yields `None`.
async fn read_form(path: &Path) -> Option<Value> {
    match File::new(path).read_json::<Value>().await {
        Ok(form) => {
            info!(path = %path.display(), "Loaded form schema");
            Some(form)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load form schema");
            None
        }
    }
}
