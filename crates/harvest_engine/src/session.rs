//! PIN verification against the device.
//!
//! Authentication is stateless on our side: the device tracks the session,
//! so re-authenticating is simply calling this again.

use async_trait::async_trait;
use harvest_core::PIN_ACCEPTED;
use reqwest::header::{ACCEPT, CONNECTION, CONTENT_TYPE};

use crate::transport::{build_client, map_reqwest_error, DeviceSettings, TransportError};

/// Business outcome of a PIN verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionVerdict {
    Authenticated,
    /// The device replied with something other than the acceptance code.
    /// The raw reply is kept for diagnostics.
    Rejected { reply: String },
}

/// Seam for the pin route so the controller can be tested without a device.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verifies the PIN. A rejected PIN is a verdict, not an error; errors
    /// mean the device could not be reached at all.
    async fn authenticate(&self, pin: &str) -> Result<SessionVerdict, TransportError>;
}

/// Talks to the device's pin route over HTTP.
#[derive(Debug, Clone)]
pub struct PinAuthenticator {
    settings: DeviceSettings,
}

impl PinAuthenticator {
    pub fn new(settings: DeviceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Authenticator for PinAuthenticator {
    async fn authenticate(&self, pin: &str) -> Result<SessionVerdict, TransportError> {
        let client = build_client(&self.settings)?;
        let url = format!("{}/api/v3/pin", self.settings.base_url);

        let response = client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .header(ACCEPT, "application/json")
            .header(CONNECTION, "close")
            .body(pin.to_string())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(interpret_reply(&body))
    }
}

/// The reply is a JSON-decodable scalar. Anything but the acceptance code,
/// including bodies that do not decode at all, is a rejection.
fn interpret_reply(body: &str) -> SessionVerdict {
    let reply = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(code)) => code,
        Ok(other) => other.to_string(),
        Err(_) => body.trim().to_string(),
    };
    if reply == PIN_ACCEPTED {
        SessionVerdict::Authenticated
    } else {
        SessionVerdict::Rejected { reply }
    }
}
