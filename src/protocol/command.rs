use crate::model::DeviceAddress;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Backend message understood by the device's Rings callback.
/// Serializes as `{"PlainText":"<text>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackendMessage {
    PlainText(String),
}

/// Params of the Rings `sendBackendMessage` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendBackendMessageRequest {
    pub destination_did: String,
    pub data: String,
}

/// Parses user text as a weight. Only finite numbers are accepted.
pub fn parse_weight(input: &str) -> Result<f64> {
    let input = input.trim();
    let weight: f64 = input
        .parse()
        .map_err(|_| Error::Command(format!("'{}' is not a number", input)))?;
    if !weight.is_finite() {
        return Err(Error::Command(format!("'{}' is not a finite number", input)));
    }
    Ok(weight)
}

impl SendBackendMessageRequest {
    /// Shortest decimal form of the weight wrapped as plain text.
    pub fn weight(device: &DeviceAddress, weight: f64) -> Result<Self> {
        let message = BackendMessage::PlainText(weight.to_string());
        Ok(Self {
            destination_did: device.as_str().to_string(),
            data: serde_json::to_string(&message)?,
        })
    }
}
