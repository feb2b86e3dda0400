//! HTTP transport abstraction.
//!
//! A fetcher never talks to the network directly: it hands a fully resolved
//! `HttpTransportRequest` to an injectable `HttpTransport` and gets back a
//! buffered `HttpResponse`. `ReqwestTransport` is the default implementation;
//! tests and callers with special needs can provide their own.

use crate::error::TransportError;
use crate::types::{ByteStream, HttpMethod, MultipartForm, QueryParams, TransportOptions};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::fmt;
use url::Url;

/// Wire payload of a request, after body classification.
pub enum RequestBody {
    Text(String),
    Bytes(Bytes),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(QueryParams),
    Multipart(MultipartForm),
    Stream(ByteStream),
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Self::Form(form) => f.debug_tuple("Form").field(form).finish(),
            Self::Multipart(form) => f.debug_tuple("Multipart").field(form).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Transport-level request data.
#[derive(Debug)]
pub struct HttpTransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub options: TransportOptions,
}

/// Buffered response returned by a transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    status_text: String,
    headers: HeaderMap,
    url: Option<Url>,
    body: Bytes,
}

impl HttpResponse {
    /// Build a response; the status text defaults to the canonical reason.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            url: None,
            body: body.into(),
        }
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    /// Final URL after redirects, when the transport knows it.
    pub fn with_url(mut self, url: Url) -> Self {
        self.url = Some(url);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8; invalid sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Performs one HTTP exchange.
///
/// Implementations must not treat non-2xx statuses as errors; the fetcher
/// classifies the status itself. `TransportError` is reserved for exchanges
/// that produced no response at all.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpTransportRequest) -> Result<HttpResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_defaults_to_canonical_reason() {
        let response = HttpResponse::new(StatusCode::IM_A_TEAPOT, HeaderMap::new(), "");
        assert_eq!(response.status_text(), "I'm a teapot");
        assert!(!response.is_success());

        let custom = response.with_status_text("Brewing");
        assert_eq!(custom.status_text(), "Brewing");
    }

    #[test]
    fn decodes_body() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), r#"{"n":1}"#);
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["n"], 1);

        let lossy = HttpResponse::new(StatusCode::OK, HeaderMap::new(), vec![b'o', 0xff, b'k']);
        assert_eq!(lossy.text(), "o\u{fffd}k");
    }
}
