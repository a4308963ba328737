//! Outbound channels: the radio transceiver and the LAN web client

pub mod serial;
pub mod tcp;
pub mod traits;
pub mod transceiver;
pub mod web_client;

pub use serial::{SerialConfig, SerialConnector, SerialTransportStream};
pub use tcp::{TcpConnector, TcpTransportStream};
pub use traits::{OutboundChannel, TransmitError, TransportConnector, TransportStream};
pub use transceiver::Transceiver;
pub use web_client::{LanUplink, WebClient};
