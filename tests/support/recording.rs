//! Recording transport for deterministic request assertions.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::sync::{Arc, Mutex};
use typical_fetch::execution::http::RequestBody;
use typical_fetch::{HttpMethod, HttpResponse, HttpTransport, HttpTransportRequest, TransportError};

/// A request as seen by the transport, with the body flattened to bytes.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// `form`, `multipart`, `stream`, `text` or `bytes`.
    pub body_kind: Option<&'static str>,
}

impl RecordedRequest {
    pub fn header_values(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

pub struct RecordingTransport {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn ok() -> Arc<Self> {
        Self::new(200, "")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, request: HttpTransportRequest) -> Result<HttpResponse, TransportError> {
        let (body, body_kind) = match request.body {
            None => (None, None),
            Some(RequestBody::Text(text)) => (Some(text.into_bytes()), Some("text")),
            Some(RequestBody::Bytes(bytes)) => (Some(bytes.to_vec()), Some("bytes")),
            Some(RequestBody::Form(form)) => (Some(form.to_urlencoded().into_bytes()), Some("form")),
            Some(RequestBody::Multipart(form)) => {
                let names = form
                    .parts()
                    .iter()
                    .map(|(name, _)| name.as_str())
                    .collect::<Vec<_>>()
                    .join(",");
                (Some(names.into_bytes()), Some("multipart"))
            }
            Some(RequestBody::Stream(mut stream)) => {
                let mut collected = Vec::new();
                while let Some(chunk) = stream.next().await {
                    collected.extend_from_slice(&chunk.map_err(TransportError::Custom)?);
                }
                (Some(collected), Some("stream"))
            }
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.to_string(),
            headers: request.headers,
            body,
            body_kind,
        });

        Ok(HttpResponse::new(self.status, HeaderMap::new(), self.body.clone()))
    }
}
