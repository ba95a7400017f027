//! Fetches a single transaction's items by identifier.

use async_trait::async_trait;
use harvest_core::{RawTransaction, RelevantNumber};
use reqwest::header::{ACCEPT, CONNECTION};

use crate::transport::{build_client, map_reqwest_error, DeviceSettings, TransportError};

/// Seam for the transaction route so the controller can be tested without a
/// device.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_transaction(
        &self,
        number: &RelevantNumber,
    ) -> Result<RawTransaction, TransportError>;
}

/// HTTP client for the device's transaction-by-identifier route.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    settings: DeviceSettings,
}

impl DeviceClient {
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl TransactionSource for DeviceClient {
    async fn fetch_transaction(
        &self,
        number: &RelevantNumber,
    ) -> Result<RawTransaction, TransportError> {
        let client = build_client(&self.settings)?;
        let url = format!("{}/api/v3/transactions/{}", self.settings.base_url, number);

        let response = client
            .get(&url)
            .header(ACCEPT, "application/json")
            .header(CONNECTION, "close")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        response.json::<RawTransaction>().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Decode(err.to_string())
            }
        })
    }
}
