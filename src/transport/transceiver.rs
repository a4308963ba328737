//! Radio transceiver channel
//!
//! Each send opens the link, writes exactly one frame and closes it again.
//! Nothing is kept between sends.

use crate::logger::LogSink;
use crate::transport::traits::{OutboundChannel, TransmitError, TransportConnector, TransportStream};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use relay_shared::{codec, Payload};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;

/// Default time allowed to open the radio link
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Transceiver<C: TransportConnector> {
    connector: C,
    logger: Arc<dyn LogSink>,
    connect_timeout: Duration,
}

impl<C: TransportConnector> Transceiver<C> {
    pub fn new(connector: C, logger: Arc<dyn LogSink>) -> Self {
        Self {
            connector,
            logger,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    async fn transmit(&self, payload: &Payload) -> Result<()> {
        let frame = codec::encode(payload)?;

        let mut stream = timeout(self.connect_timeout, self.connector.connect())
            .await
            .map_err(|_| anyhow!("{} connect timed out", self.connector.name()))??;

        stream.write_all(&frame).await?;
        stream.flush().await?;
        TransportStream::shutdown(&mut stream).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: TransportConnector> OutboundChannel for Transceiver<C> {
    async fn send(&self, payload: &Payload) -> Result<(), TransmitError> {
        self.logger.info(&format!(
            "Transmitting via {}: {}",
            self.connector.name(),
            payload
        ));

        self.transmit(payload).await.map_err(|e| {
            let message = format!("{:#}", e);
            self.logger.error(&format!("radio error occurred: {}", message));
            TransmitError::Unexpected(message)
        })
    }

    fn name(&self) -> &'static str {
        "radio"
    }
}
