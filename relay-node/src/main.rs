//! Ground relay node
//!
//! Receiving end of the radio link: decodes payload frames and forwards each
//! one to the LAN collection server. A failed forward is logged and dropped.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use field_relay::config::{ConfigProvider, EnvConfig};
use field_relay::transport::{LanUplink, OutboundChannel};
use relay_shared::codec::FrameDecoder;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Forwards radio frames to the LAN collection server")]
struct NodeArgs {
    /// Address the simulated radio link listens on
    #[arg(long, env = "RELAY_NODE_BIND", default_value = "0.0.0.0:9000")]
    listen: String,

    /// Explicit LAN server URL, overriding LAN_SERVER_* composition
    #[arg(long, env = "LAN_SERVER_URL")]
    server_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = NodeArgs::parse();
    let config: Arc<dyn ConfigProvider> = Arc::new(EnvConfig);
    let uplink: Arc<dyn OutboundChannel> =
        Arc::new(LanUplink::new(config).with_server_url(args.server_url));

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!("Relay node listening on {}", args.listen);

    loop {
        let (socket, addr) = listener.accept().await?;
        info!("Radio link from: {}", addr);

        let uplink = uplink.clone();
        tokio::spawn(async move {
            match forward_frames(socket, uplink.as_ref()).await {
                Ok(count) => info!("Link {} closed after {} readings", addr, count),
                Err(e) => error!("Link {} dropped: {}", addr, e),
            }
        });
    }
}

/// Decode frames from `reader` until EOF, forwarding each payload
///
/// Returns the number of readings forwarded successfully. A malformed frame
/// ends the link since frame boundaries can no longer be trusted.
async fn forward_frames<R>(mut reader: R, uplink: &dyn OutboundChannel) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut buf = vec![0u8; 4096];
    let mut forwarded = 0;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            if decoder.buffer_len() > 0 {
                warn!("Discarding {} bytes of incomplete frame", decoder.buffer_len());
            }
            return Ok(forwarded);
        }
        decoder.extend(&buf[..n]);

        // Process all complete frames
        while let Some(payload) = decoder
            .decode_next()
            .map_err(|e| anyhow!("Malformed frame: {}", e))?
        {
            match uplink.send(&payload).await {
                Ok(()) => forwarded += 1,
                Err(e) => warn!("Reading dropped, {} send failed: {}", uplink.name(), e),
            }
        }
    }
}
