use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// How the radio transceiver reaches the modem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RadioMode {
    /// Radio modem on a serial port
    Serial,
    /// TCP stand-in for the radio link (for development)
    #[default]
    TcpSimulation,
}

/// Startup options for the relay; read once when the process starts
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Relays sensor readings over radio or to the LAN server", long_about = None)]
pub struct RelayArgs {
    /// Address the inbound HTTP server binds to
    #[arg(long, env = "RELAY_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Radio transport mode
    #[arg(long, env = "RADIO_MODE", value_enum, default_value_t = RadioMode::TcpSimulation)]
    pub radio_mode: RadioMode,

    /// Serial device of the radio modem
    #[arg(long, env = "RADIO_SERIAL_PORT", default_value = "/dev/ttyUSB0")]
    pub serial_port: String,

    /// Serial baud rate
    #[arg(long, env = "RADIO_BAUD", default_value = "9600")]
    pub baud: u32,

    /// Ground relay node address when the radio link is simulated
    #[arg(long, env = "RADIO_TCP_ADDRESS", default_value = "127.0.0.1:9000")]
    pub radio_tcp_address: String,

    /// Radio link connect timeout in seconds
    #[arg(long, env = "RADIO_CONNECT_TIMEOUT_SECS", default_value = "5")]
    pub radio_connect_timeout_secs: u64,

    /// Explicit LAN server URL, overriding LAN_SERVER_* composition
    #[arg(long, env = "LAN_SERVER_URL")]
    pub server_url: Option<String>,
}

impl RelayArgs {
    pub fn radio_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.radio_connect_timeout_secs)
    }
}
