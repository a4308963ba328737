//! Field relay
//!
//! Receives sensor readings over HTTP on the device and forwards each one
//! through either the radio transceiver or the LAN collection server,
//! depending on configuration flags read at dispatch time.

pub mod config;
pub mod logger;
pub mod relay;
pub mod transport;

pub use relay_shared::{Channel, Payload};
