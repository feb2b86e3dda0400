//! Shared helpers for integration tests
//!
//! - `RecordingTransport`: in-memory transport that records requests and
//!   answers with a canned response
//! - small wiremock helpers

#![allow(dead_code)]

pub mod recording;

pub use recording::{RecordedRequest, RecordingTransport};

use wiremock::MockServer;

/// Start a wiremock server.
pub async fn start() -> MockServer {
    MockServer::start().await
}
