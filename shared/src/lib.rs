//! Field Relay Shared Types
//!
//! This crate provides the payload type, radio framing codec and error
//! vocabulary shared between the relay on the sensor device and the ground
//! relay node on the other end of the radio link.

pub mod codec;
pub mod error_log;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub use error_log::{ErrorCode, ErrorReport};

/// Configuration keys read from the process environment
pub mod keys {
    /// Enables forwarding over the radio transceiver
    pub const ENABLE_RADIO_TRANSMISSION: &str = "ENABLE_RADIO_TRANSMISSION";

    /// Enables forwarding to the LAN collection server
    pub const ENABLE_INTERNET_TRANSMISSION: &str = "ENABLE_INTERNET_TRANSMISSION";

    /// Selects `https` instead of `http` for the LAN server
    pub const LAN_SERVER_HTTPS: &str = "LAN_SERVER_HTTPS";

    /// LAN server host
    pub const LAN_SERVER_IP: &str = "LAN_SERVER_IP";

    /// LAN server port
    pub const LAN_PORT: &str = "LAN_PORT";

    /// Directory holding every component's log file
    pub const LOG_DIRECTORY: &str = "LOG_DIRECTORY";

    /// Log file name for the inbound relay handler
    pub const RELAY_LOG_FILE: &str = "RELAY_LOG_FILE";

    /// Log file name for the outbound web client
    pub const WEB_CLIENT_LOG_FILE: &str = "WEB_CLIENT_LOG_FILE";

    /// Log file name for the radio transceiver
    pub const TRANSCEIVER_LOG_FILE: &str = "TRANSCEIVER_LOG_FILE";
}

/// A sensor reading as received from the device's instrumentation.
///
/// The relay treats it as an opaque JSON object: keys and values are passed
/// through untouched and no schema is enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Create an empty payload
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Parse a payload from raw JSON bytes; anything but a JSON object is rejected
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Insert a field, returning the previous value if any
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to compact JSON bytes
    pub fn to_vec(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Compact JSON, which is also what the audit logs record
impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("{}"),
        }
    }
}

/// Outbound channel chosen for a single inbound reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Radio,
    Internet,
    /// No channel enabled; the reading is accepted and dropped
    None,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Radio => write!(f, "radio"),
            Channel::Internet => write!(f, "internet"),
            Channel::None => write!(f, "none"),
        }
    }
}
