//! Helpers for inspecting runtime errors without matching on every variant.

use super::types::{FetchError, RequestError, TransportError};
use std::error::Error as StdError;

/// Coarse-grained error kind for presentation and branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 3xx response returned under a manual redirect policy.
    Redirect,
    /// 4xx response.
    Client,
    /// 5xx response.
    Server,
    /// Connection or protocol failure in the transport.
    Transport,
    Timeout,
    /// Response body could not be decoded.
    Decode,
    /// Resolved values could not be turned into a request.
    Request,
    /// A resolver, parser or mapper callback failed.
    Callback,
    Unknown,
}

/// The original cause of a pipeline error, or the HTTP error itself.
pub fn unwrap_error(err: &FetchError) -> &(dyn StdError + Send + Sync + 'static) {
    match err {
        FetchError::Http(error) => error,
        FetchError::Pipeline(error) => error.cause(),
    }
}

/// Numeric status of the response involved in `err`, if any.
pub fn status_code_of(err: &FetchError) -> Option<u16> {
    err.status().map(|status| status.as_u16())
}

/// Classify a runtime error.
pub fn error_kind(err: &FetchError) -> ErrorKind {
    match err {
        FetchError::Http(error) => {
            let status = error.status();
            if status.is_redirection() {
                ErrorKind::Redirect
            } else if status.is_client_error() {
                ErrorKind::Client
            } else if status.is_server_error() {
                ErrorKind::Server
            } else {
                ErrorKind::Unknown
            }
        }
        FetchError::Pipeline(error) => {
            if let Some(transport) = error.downcast_ref::<TransportError>() {
                if transport.is_timeout() {
                    ErrorKind::Timeout
                } else {
                    ErrorKind::Transport
                }
            } else if error.downcast_ref::<serde_json::Error>().is_some() {
                ErrorKind::Decode
            } else if error.downcast_ref::<RequestError>().is_some() {
                ErrorKind::Request
            } else {
                ErrorKind::Callback
            }
        }
    }
}
