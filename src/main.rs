use anyhow::Context;
use clap::Parser;
use field_relay::config::{ConfigProvider, EnvConfig, RadioMode, RelayArgs};
use field_relay::logger::FileLogger;
use field_relay::relay::{relay_router, RelayState};
use field_relay::transport::{
    LanUplink, OutboundChannel, SerialConfig, SerialConnector, TcpConnector, Transceiver,
};
use relay_shared::keys;
use std::sync::Arc;
use tokio::net::TcpListener;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = RelayArgs::parse();
    let config: Arc<dyn ConfigProvider> = Arc::new(EnvConfig);

    info!("Field relay starting on {}", args.bind);
    info!("  Radio mode: {:?}", args.radio_mode);
    info!(
        "  Radio enabled: {}, internet enabled: {} (re-read per request)",
        config.radio_enabled(),
        config.internet_enabled()
    );

    let radio = build_radio(&args, config.as_ref());
    let internet: Arc<dyn OutboundChannel> = Arc::new(
        LanUplink::new(config.clone()).with_server_url(args.server_url.clone()),
    );
    let logger = Arc::new(FileLogger::from_config(keys::RELAY_LOG_FILE, config.as_ref()));

    let app = relay_router(RelayState::new(config, radio, internet, logger));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Relay listening on {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Relay server failed")?;

    info!("Relay stopped");
    Ok(())
}

/// Radio channel for the configured transport mode
fn build_radio(args: &RelayArgs, config: &dyn ConfigProvider) -> Arc<dyn OutboundChannel> {
    let logger = Arc::new(FileLogger::from_config(keys::TRANSCEIVER_LOG_FILE, config));

    match args.radio_mode {
        RadioMode::Serial => {
            info!("  Radio modem: {} @ {} baud", args.serial_port, args.baud);
            let connector = SerialConnector::new(SerialConfig {
                port: args.serial_port.clone(),
                baud: args.baud,
            });
            Arc::new(
                Transceiver::new(connector, logger)
                    .with_connect_timeout(args.radio_connect_timeout()),
            )
        }
        RadioMode::TcpSimulation => {
            info!("  Radio link simulated over TCP: {}", args.radio_tcp_address);
            let connector = TcpConnector::new(args.radio_tcp_address.clone());
            Arc::new(
                Transceiver::new(connector, logger)
                    .with_connect_timeout(args.radio_connect_timeout()),
            )
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
