//! Inbound relay
//!
//! This module handles:
//! - The liveness page on `GET /`
//! - Parsing readings posted to `POST /`
//! - Choosing the outbound channel per reading and forwarding to it

mod handler;
mod selection;

pub use handler::{relay_router, DispatchResponse, RelayState, LIVENESS_PAGE};
pub use selection::select_channel;
