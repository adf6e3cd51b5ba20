use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub const DID_PREFIX: &str = "did:dephy:";
pub const DEFAULT_RELAY_ADDRESS: &str = "wss://relay-poc.dephy.io";
pub const DEFAULT_ASSIST_NODE_ADDRESS: &str = "https://rings-poc.dephy.io";

const ADDRESS_HEX_LEN: usize = 40;
const ADDRESS_LEN: usize = ADDRESS_HEX_LEN + 2;

/// A device identifier: `0x` followed by 40 lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified identifier used in `dephy_from` / `dephy_to` tags.
    pub fn did(&self) -> String {
        format!("{}{}", DID_PREFIX, self.0)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        extract_device_address(s)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Pull the first `0x` + 40 hex token out of free-form text.
///
/// Matching is case-insensitive and the token must sit on word boundaries, so
/// `addr:0xABC…` matches while `x0xABC…` or a 41-digit run does not.
pub fn extract_device_address(input: &str) -> Result<DeviceAddress> {
    let normalized = input.trim().to_lowercase();
    let bytes = normalized.as_bytes();

    if bytes.len() >= ADDRESS_LEN {
        for start in 0..=bytes.len() - ADDRESS_LEN {
            if &bytes[start..start + 2] != b"0x" {
                continue;
            }
            if start > 0 && is_word_byte(bytes[start - 1]) {
                continue;
            }
            let end = start + ADDRESS_LEN;
            let digits = &bytes[start + 2..end];
            if !digits.iter().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
                continue;
            }
            if end < bytes.len() && is_word_byte(bytes[end]) {
                continue;
            }
            return Ok(DeviceAddress(normalized[start..end].to_string()));
        }
    }

    Err(Error::InvalidAddress(
        "input does not contain a 0x-prefixed 40 digit hex address".to_string(),
    ))
}

/// Addresses used when the user leaves the optional fields empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDefaults {
    pub relay_address: String,
    pub assist_node_address: String,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self {
            relay_address: DEFAULT_RELAY_ADDRESS.to_string(),
            assist_node_address: DEFAULT_ASSIST_NODE_ADDRESS.to_string(),
        }
    }
}

/// Fixed for the lifetime of a session once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub device: DeviceAddress,
    pub relay_address: String,
    pub assist_node_address: String,
}

impl ConnectionParams {
    pub fn from_input(
        device_input: &str,
        relay_input: &str,
        assist_input: &str,
        defaults: &ConnectionDefaults,
    ) -> Result<Self> {
        let device = extract_device_address(device_input)?;
        let or_default = |input: &str, default: &str| {
            let input = input.trim();
            if input.is_empty() {
                default.to_string()
            } else {
                input.to_string()
            }
        };

        Ok(Self {
            device,
            relay_address: or_default(relay_input, &defaults.relay_address),
            assist_node_address: or_default(assist_input, &defaults.assist_node_address),
        })
    }

    pub fn did(&self) -> String {
        self.device.did()
    }
}
