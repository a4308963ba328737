//! HTTP(S) client for the LAN collection server
//!
//! The client logs what it is about to send before touching the network and
//! hands every failure back to the caller after logging it. It never retries.

use crate::config::{ConfigError, ConfigProvider};
use crate::logger::{FileLogger, LogSink};
use crate::transport::traits::{OutboundChannel, TransmitError};
use async_trait::async_trait;
use relay_shared::{keys, Payload};
use std::fmt;
use std::sync::Arc;

/// Logger name used when none is given
pub const DEFAULT_LOG_NAME: &str = keys::WEB_CLIENT_LOG_FILE;

/// Request body encoding
enum Body<'a> {
    Json(&'a Payload),
    Raw(String),
}

pub struct WebClient {
    client: reqwest::Client,
    url: String,
    logger: Arc<dyn LogSink>,
}

impl WebClient {
    /// Client for an explicit URL with an injected logger
    pub fn new(url: impl Into<String>, logger: Arc<dyn LogSink>) -> Self {
        Self::with_client(reqwest::Client::new(), url, logger)
    }

    /// Same as [`WebClient::new`] but reusing an existing connection pool
    pub fn with_client(
        client: reqwest::Client,
        url: impl Into<String>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            logger,
        }
    }

    /// Resolve logger and target URL from configuration
    ///
    /// `log_name` defaults to [`DEFAULT_LOG_NAME`]. An explicit `server_url`
    /// is used verbatim; otherwise the URL is composed from `LAN_SERVER_HTTPS`,
    /// `LAN_SERVER_IP` and `LAN_PORT`.
    pub fn from_config(
        config: &dyn ConfigProvider,
        log_name: Option<&str>,
        server_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_config_with_client(reqwest::Client::new(), config, log_name, server_url)
    }

    pub fn from_config_with_client(
        client: reqwest::Client,
        config: &dyn ConfigProvider,
        log_name: Option<&str>,
        server_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = match server_url {
            Some(url) => url,
            None => server_url_from_config(config)?,
        };
        let logger = FileLogger::from_config(log_name.unwrap_or(DEFAULT_LOG_NAME), config);

        Ok(Self::with_client(client, url, Arc::new(logger)))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn logger(&self) -> &dyn LogSink {
        self.logger.as_ref()
    }

    /// POST the payload as a JSON body
    pub async fn send(&self, payload: &Payload) -> Result<(), TransmitError> {
        self.post(Body::Json(payload)).await
    }

    /// POST `data` as the raw request body
    pub async fn send_raw(&self, data: impl Into<String>) -> Result<(), TransmitError> {
        self.post(Body::Raw(data.into())).await
    }

    async fn post(&self, body: Body<'_>) -> Result<(), TransmitError> {
        self.logger.info(&format!("Pinging: {}", self.url));

        let request = self.client.post(&self.url);
        let request = match body {
            Body::Json(payload) => {
                self.logger.info(&format!("data: {}", payload));
                request.json(payload)
            }
            Body::Raw(data) => {
                self.logger.info(&format!("data: {}", data));
                request.body(data)
            }
        };

        match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(_) => Ok(()),
            Err(e) => Err(self.report(e)),
        }
    }

    fn report(&self, e: reqwest::Error) -> TransmitError {
        let message = e.to_string();
        match e.status() {
            Some(status) => {
                self.logger.error(&format!("HTTP error occurred: {}", message));
                TransmitError::Http {
                    status: Some(status.as_u16()),
                    message,
                }
            }
            None => {
                self.logger.error(&format!("error occurred: {}", message));
                TransmitError::Unexpected(message)
            }
        }
    }
}

impl fmt::Debug for WebClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebClient")
            .field("url", &self.url)
            .field("logger", &self.logger.name())
            .finish()
    }
}

#[async_trait]
impl OutboundChannel for WebClient {
    async fn send(&self, payload: &Payload) -> Result<(), TransmitError> {
        WebClient::send(self, payload).await
    }

    fn name(&self) -> &'static str {
        "internet"
    }
}

/// `scheme://host:port` from the LAN server settings
pub fn server_url_from_config(config: &dyn ConfigProvider) -> Result<String, ConfigError> {
    let scheme = if config.flag(keys::LAN_SERVER_HTTPS) {
        "https"
    } else {
        "http"
    };
    let host = config.require(keys::LAN_SERVER_IP)?;
    let port = config.require(keys::LAN_PORT)?;

    Ok(format!("{}://{}:{}", scheme, host, port))
}

/// Web channel that resolves a fresh [`WebClient`] from configuration on
/// every send, so changes to the LAN server settings apply to the next
/// reading. The connection pool is shared.
pub struct LanUplink {
    client: reqwest::Client,
    config: Arc<dyn ConfigProvider>,
    log_name: String,
    server_url: Option<String>,
}

impl LanUplink {
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            log_name: DEFAULT_LOG_NAME.to_string(),
            server_url: None,
        }
    }

    pub fn with_log_name(mut self, log_name: impl Into<String>) -> Self {
        self.log_name = log_name.into();
        self
    }

    pub fn with_server_url(mut self, server_url: Option<String>) -> Self {
        self.server_url = server_url;
        self
    }

    /// Build the client for the current configuration
    pub fn resolve(&self) -> Result<WebClient, ConfigError> {
        WebClient::from_config_with_client(
            self.client.clone(),
            self.config.as_ref(),
            Some(&self.log_name),
            self.server_url.clone(),
        )
    }
}

#[async_trait]
impl OutboundChannel for LanUplink {
    async fn send(&self, payload: &Payload) -> Result<(), TransmitError> {
        let client = self
            .resolve()
            .map_err(|e| TransmitError::Unexpected(e.to_string()))?;
        client.send(payload).await
    }

    fn name(&self) -> &'static str {
        "internet"
    }
}
