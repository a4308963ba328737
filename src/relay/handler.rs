//! HTTP handlers for the relay

use super::selection::select_channel;
use crate::config::ConfigProvider;
use crate::logger::LogSink;
use crate::transport::OutboundChannel;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use relay_shared::{Channel, ErrorCode, ErrorReport, Payload};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const LIVENESS_PAGE: &str =
    "<html><head><title>Field Relay</title></head><body><p>Relay is running.</p></body></html>";

/// Shared handler state
#[derive(Clone)]
pub struct RelayState {
    config: Arc<dyn ConfigProvider>,
    radio: Arc<dyn OutboundChannel>,
    internet: Arc<dyn OutboundChannel>,
    logger: Arc<dyn LogSink>,
}

impl RelayState {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        radio: Arc<dyn OutboundChannel>,
        internet: Arc<dyn OutboundChannel>,
        logger: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            config,
            radio,
            internet,
            logger,
        }
    }
}

/// Body of a successful POST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub status: String,
    pub channel: Channel,
}

/// Build the relay router: `GET /` liveness, `POST /` dispatch
pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(liveness_handler).post(dispatch_handler))
        .with_state(state)
}

/// Handler for GET /
async fn liveness_handler() -> impl IntoResponse {
    debug!("Liveness check requested");
    ([(header::CONTENT_TYPE, "text/html")], LIVENESS_PAGE)
}

/// Handler for POST /
async fn dispatch_handler(State(state): State<RelayState>, body: Bytes) -> Response {
    let payload = match Payload::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejected malformed reading: {}", e);
            state
                .logger
                .warn(&format!("Rejected malformed reading: {}", e));
            let report = ErrorReport::new(
                ErrorCode::UnknownFormat,
                format!("Body is not a JSON object: {}", e),
                String::from_utf8_lossy(&body),
            );
            return (StatusCode::BAD_REQUEST, Json(report)).into_response();
        }
    };

    let channel = select_channel(state.config.as_ref());
    let outbound = match channel {
        Channel::Radio => &state.radio,
        Channel::Internet => &state.internet,
        Channel::None => {
            state
                .logger
                .info("No transmission channel enabled, reading not forwarded");
            return Json(DispatchResponse {
                status: "accepted".into(),
                channel,
            })
            .into_response();
        }
    };

    state
        .logger
        .info(&format!("Forwarding reading via {}", outbound.name()));

    match outbound.send(&payload).await {
        Ok(()) => Json(DispatchResponse {
            status: "forwarded".into(),
            channel,
        })
        .into_response(),
        Err(e) => {
            state
                .logger
                .error(&format!("Forwarding via {} failed: {}", outbound.name(), e));
            let report = ErrorReport::new(
                ErrorCode::OtherError,
                format!("{} transmission failed: {}", channel, e),
                payload.to_string(),
            );
            (StatusCode::BAD_GATEWAY, Json(report)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::logger::{LogLevel, MemoryLogger};
    use crate::transport::TransmitError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use parking_lot::Mutex;
    use relay_shared::keys;
    use serde_json::json;
    use tower::ServiceExt;

    /// Records every payload it is asked to send
    #[derive(Default)]
    struct ChannelSpy {
        sent: Mutex<Vec<Payload>>,
        fail_with: Option<TransmitError>,
    }

    impl ChannelSpy {
        fn failing(err: TransmitError) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_with: Some(err),
            }
        }

        fn sent(&self) -> Vec<Payload> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl OutboundChannel for ChannelSpy {
        async fn send(&self, payload: &Payload) -> Result<(), TransmitError> {
            self.sent.lock().push(payload.clone());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn name(&self) -> &'static str {
            "spy"
        }
    }

    struct Harness {
        config: Arc<MapConfig>,
        radio: Arc<ChannelSpy>,
        internet: Arc<ChannelSpy>,
        logger: MemoryLogger,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_channels(ChannelSpy::default(), ChannelSpy::default())
        }

        fn with_channels(radio: ChannelSpy, internet: ChannelSpy) -> Self {
            Self {
                config: Arc::new(MapConfig::new()),
                radio: Arc::new(radio),
                internet: Arc::new(internet),
                logger: MemoryLogger::new("RELAY_LOG_FILE"),
            }
        }

        fn router(&self) -> Router {
            relay_router(RelayState::new(
                self.config.clone(),
                self.radio.clone(),
                self.internet.clone(),
                Arc::new(self.logger.clone()),
            ))
        }

        async fn request(&self, method: Method, body: &str) -> (StatusCode, Option<String>, Bytes) {
            let request = Request::builder()
                .method(method)
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            let response = self.router().oneshot(request).await.unwrap();
            let status = response.status();
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .map(|v| v.to_str().unwrap().to_string());
            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, content_type, body)
        }

        async fn post(&self, body: &str) -> (StatusCode, Bytes) {
            let (status, _, body) = self.request(Method::POST, body).await;
            (status, body)
        }
    }

    fn payload() -> Payload {
        Payload::from_slice(br#"{"key": "value"}"#).unwrap()
    }

    #[tokio::test]
    async fn test_get_returns_liveness_page() {
        let harness = Harness::new();
        harness.config.set(keys::ENABLE_RADIO_TRANSMISSION, "True");
        harness.config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");

        let (status, content_type, body) = harness.request(Method::GET, "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/html"));
        assert_eq!(&body[..], LIVENESS_PAGE.as_bytes());
        assert!(harness.radio.sent().is_empty());
        assert!(harness.internet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_post_radio() {
        let harness = Harness::new();
        harness.config.set(keys::ENABLE_RADIO_TRANSMISSION, "True");

        let (status, body) = harness.post(r#"{"key": "value"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.radio.sent(), vec![payload()]);
        assert!(harness.internet.sent().is_empty());

        let response: DispatchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.status, "forwarded");
        assert_eq!(response.channel, Channel::Radio);
    }

    #[tokio::test]
    async fn test_post_radio_wins_when_both_enabled() {
        let harness = Harness::new();
        harness.config.set(keys::ENABLE_RADIO_TRANSMISSION, "True");
        harness.config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");

        let (status, _) = harness.post(r#"{"key": "value"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(harness.radio.sent().len(), 1);
        assert!(harness.internet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_post_internet_when_radio_disabled() {
        let harness = Harness::new();
        harness.config.set(keys::ENABLE_RADIO_TRANSMISSION, "");
        harness.config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");

        let (status, body) = harness.post(r#"{"key": "value"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(harness.radio.sent().is_empty());
        assert_eq!(harness.internet.sent(), vec![payload()]);

        let response: DispatchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.channel, Channel::Internet);
    }

    #[tokio::test]
    async fn test_post_without_channel_is_accepted() {
        let harness = Harness::new();

        let (status, body) = harness.post(r#"{"key": "value"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert!(harness.radio.sent().is_empty());
        assert!(harness.internet.sent().is_empty());

        let response: DispatchResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(response.status, "accepted");
        assert_eq!(response.channel, Channel::None);
    }

    #[tokio::test]
    async fn test_flags_are_read_per_request() {
        let harness = Harness::new();
        harness.config.set(keys::ENABLE_RADIO_TRANSMISSION, "True");
        harness.post(r#"{"n": 1}"#).await;

        harness.config.remove(keys::ENABLE_RADIO_TRANSMISSION);
        harness.config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");
        harness.post(r#"{"n": 2}"#).await;

        assert_eq!(harness.radio.sent()[0].get("n"), Some(&json!(1)));
        assert_eq!(harness.internet.sent()[0].get("n"), Some(&json!(2)));
        assert_eq!(harness.radio.sent().len(), 1);
        assert_eq!(harness.internet.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected_before_dispatch() {
        let harness = Harness::new();
        harness.config.set(keys::ENABLE_RADIO_TRANSMISSION, "True");
        harness.config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");

        for body in ["{not json", "[1, 2]", ""] {
            let (status, response) = harness.post(body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");

            let report: ErrorReport = serde_json::from_slice(&response).unwrap();
            assert_eq!(report.error_code, ErrorCode::UnknownFormat);
            assert_eq!(report.raw_data, body);
        }

        assert!(harness.radio.sent().is_empty());
        assert!(harness.internet.sent().is_empty());
        assert!(harness
            .logger
            .lines()
            .iter()
            .all(|(level, _)| *level == LogLevel::Warn));
    }

    #[tokio::test]
    async fn test_failed_send_is_bad_gateway() {
        let harness = Harness::with_channels(
            ChannelSpy::default(),
            ChannelSpy::failing(TransmitError::Http {
                status: Some(500),
                message: "HTTP status server error (500 Internal Server Error)".into(),
            }),
        );
        harness.config.set(keys::ENABLE_INTERNET_TRANSMISSION, "True");

        let (status, body) = harness.post(r#"{"key": "value"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(harness.internet.sent().len(), 1);

        let report: ErrorReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.error_code, ErrorCode::OtherError);
        assert_eq!(report.raw_data, r#"{"key":"value"}"#);
        assert!(report.description.starts_with("internet transmission failed"));

        let lines = harness.logger.lines();
        assert_eq!(lines.last().map(|(level, _)| *level), Some(LogLevel::Error));
    }
}
