//! Transport trait abstraction for pluggable outbound channels

use anyhow::Result;
use async_trait::async_trait;
use relay_shared::Payload;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Failure of a single outbound send
///
/// Display is the bare error message so callers can prefix it in their logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransmitError {
    /// The receiver answered with an HTTP error status
    #[error("{message}")]
    Http { status: Option<u16>, message: String },

    /// Anything else: unreachable host, timeout, radio I/O, serialization
    #[error("{0}")]
    Unexpected(String),
}

impl TransmitError {
    pub fn is_http(&self) -> bool {
        matches!(self, TransmitError::Http { .. })
    }
}

/// Something a reading can be forwarded through
#[async_trait]
pub trait OutboundChannel: Send + Sync {
    /// Forward one reading; failures are logged by the channel and returned
    async fn send(&self, payload: &Payload) -> Result<(), TransmitError>;

    /// Human-readable name for this channel
    fn name(&self) -> &'static str;
}

/// A byte stream to the radio modem
#[async_trait]
pub trait TransportStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Close the transport gracefully
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for radio link connections
#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// The stream type this connector produces
    type Stream: TransportStream;

    /// Attempt to connect, returning a stream on success
    async fn connect(&self) -> Result<Self::Stream>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}
