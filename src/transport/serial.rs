//! Serial transport for the radio modem

use crate::transport::traits::{TransportConnector, TransportStream};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Default baud rate for the radio modem
pub const DEFAULT_BAUD: u32 = 9600;

/// Serial stream wrapper implementing TransportStream
pub struct SerialTransportStream {
    inner: SerialStream,
}

impl SerialTransportStream {
    pub fn new(stream: SerialStream) -> Self {
        Self { inner: stream }
    }
}

impl AsyncRead for SerialTransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for SerialTransportStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[async_trait]
impl TransportStream for SerialTransportStream {
    async fn shutdown(&mut self) -> Result<()> {
        tokio::io::AsyncWriteExt::shutdown(&mut self.inner).await?;
        Ok(())
    }
}

/// Configuration for the serial radio modem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`
    pub port: String,
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".into(),
            baud: DEFAULT_BAUD,
        }
    }
}

/// Opens the radio modem's serial port for each transmission
pub struct SerialConnector {
    config: SerialConfig,
}

impl SerialConnector {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

#[async_trait]
impl TransportConnector for SerialConnector {
    type Stream = SerialTransportStream;

    async fn connect(&self) -> Result<Self::Stream> {
        let stream = tokio_serial::new(&self.config.port, self.config.baud)
            .open_native_async()
            .map_err(|e| anyhow!("Serial open {} failed: {}", self.config.port, e))?;
        Ok(SerialTransportStream::new(stream))
    }

    fn name(&self) -> &'static str {
        "Radio (serial)"
    }
}
