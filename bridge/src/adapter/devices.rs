//! Device list and device detail callbacks

use platform_api::{BoundDevice, DeviceSummary, ListDevicesRequest};
use plugin_api::{
    DeviceInfoResponse, DeviceItem, DeviceListData, DeviceListResponse, Envelope,
    GetDeviceInfoRequest, GetDeviceListRequest,
};
use tracing::{error, info};

use crate::adapter::CallbackAdapter;
use crate::errors::BridgeError;
use crate::voucher::Voucher;

impl CallbackAdapter {
    pub(crate) async fn handle_get_device_list(
        &self,
        req: &GetDeviceListRequest,
    ) -> Result<DeviceListResponse, BridgeError> {
        info!(
            service_identifier = %req.service_identifier,
            page = req.page,
            page_size = req.page_size,
            "Received device list request"
        );

        let voucher = Voucher::decode(&req.voucher).inspect_err(|e| {
            error!(operation = "get_device_list", error = %e, "Failed to decode voucher");
        })?;
        voucher.require_remote().inspect_err(|e| {
            error!(operation = "get_device_list", error = %e, "Voucher rejected");
        })?;

        // Paging is forwarded as the host sent it.
        let filter = ListDevicesRequest {
            voucher: req.voucher.clone(),
            service_identifier: req.service_identifier.clone(),
            page: req.page,
            page_size: req.page_size,
        };

        let page = self
            .platform
            .list_devices(&voucher, &filter)
            .await
            .inspect_err(|e| {
                error!(
                    operation = "get_device_list",
                    service_identifier = %req.service_identifier,
                    error = %e,
                    "Failed to list devices"
                );
            })?;

        let data = DeviceListData {
            total: page.total,
            list: page.list.into_iter().map(list_item).collect(),
        };
        info!(total = data.total, returned = data.list.len(), "Device list fetched");

        Ok(Envelope::success(data))
    }

    pub(crate) async fn handle_get_device_info(
        &self,
        req: &GetDeviceInfoRequest,
    ) -> Result<DeviceInfoResponse, BridgeError> {
        info!(device_code = %req.key, "Received device info request");

        if req.key.is_empty() {
            error!(operation = "get_device_info", "Device code is empty");
            return Err(BridgeError::ValidationError(
                "device code must not be empty".to_string(),
            ));
        }
        if req.voucher.is_empty() {
            error!(operation = "get_device_info", device_code = %req.key, "Voucher is empty");
            return Err(BridgeError::ValidationError(
                "voucher must not be empty".to_string(),
            ));
        }

        let voucher = Voucher::decode(&req.voucher).inspect_err(|e| {
            error!(operation = "get_device_info", device_code = %req.key, error = %e, "Failed to decode voucher");
        })?;
        let binding = voucher.require_binding().inspect_err(|e| {
            error!(operation = "get_device_info", device_code = %req.key, error = %e, "Voucher rejected");
        })?;

        let device = self
            .platform
            .get_device_detail(&binding, &req.key)
            .await
            .inspect_err(|e| {
                error!(
                    operation = "get_device_info",
                    device_code = %req.key,
                    error = %e,
                    "Failed to fetch device detail"
                );
            })?;

        info!(device_code = %req.key, device_number = %device.device_number, "Device detail fetched");
        Ok(Envelope::success(detail_item(device)))
    }
}

fn list_item(device: DeviceSummary) -> DeviceItem {
    DeviceItem {
        device_name: device.device_name,
        device_number: device.device_number,
        description: device.description,
    }
}

fn detail_item(device: BoundDevice) -> DeviceItem {
    DeviceItem {
        device_name: device.device_name,
        device_number: device.device_number,
        description: device.device_description,
    }
}
