//! HTTP plumbing shared by the pin and transaction routes.

use std::time::Duration;

use thiserror::Error;

/// Connection settings for one fiscal device.
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    /// Base URL of the device, e.g. `http://100.100.2.151:8086`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl DeviceSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Failure reaching or understanding the device, distinct from any business
/// outcome the device itself reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("device request timed out")]
    Timeout,
    #[error("device returned http status {0}")]
    HttpStatus(u16),
    #[error("could not decode device reply: {0}")]
    Decode(String),
    #[error("network error: {0}")]
    Network(String),
}

/// The device's keep-alive handling is unreliable; every request opens a
/// fresh connection.
pub(crate) fn build_client(settings: &DeviceSettings) -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .pool_max_idle_per_host(0)
        .build()
        .map_err(|err| TransportError::Network(err.to_string()))
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    TransportError::Network(err.to_string())
}
