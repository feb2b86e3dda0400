use crate::builder::ParserKind;
use crate::execution::http::transport::HttpResponse;
use crate::types::HttpMethod;
use reqwest::StatusCode;
use std::error::Error as StdError;
use thiserror::Error;
use url::Url;

/// Boxed cause carried by pipeline errors and returned by fallible callbacks.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Misconfiguration of a call descriptor.
///
/// Recorded by the first builder call that causes it and reported by
/// `build()`. These never reach error mappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("method is already set to {0}")]
    MethodAlreadySet(HttpMethod),

    #[error("path is already set")]
    PathAlreadySet,

    #[error("body is already set")]
    BodyAlreadySet,

    #[error("invalid base url `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("a {existing} parser is already set")]
    ParserAlreadySet { existing: ParserKind },

    #[error("a parser must be registered before any mapper")]
    ParserAfterMapper,

    #[error("method is required")]
    MissingMethod,

    #[error("path is required")]
    MissingPath,

    #[error("{0} requests cannot carry a body")]
    BodyNotAllowed(HttpMethod),
}

/// Method and URL of the request a runtime error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub method: HttpMethod,
    pub url: Url,
}

impl RequestSnapshot {
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self { method, url }
    }
}

/// A response outside the 2xx range.
///
/// The buffered response is kept so error mappers can still read its body.
#[derive(Debug, Clone, Error)]
#[error("HTTP {} {}", .status.as_u16(), .status_text)]
pub struct HttpError {
    status: StatusCode,
    status_text: String,
    response: HttpResponse,
    request: RequestSnapshot,
}

impl HttpError {
    pub fn new(response: HttpResponse, request: RequestSnapshot) -> Self {
        Self {
            status: response.status(),
            status_text: response.status_text().to_string(),
            response,
            request,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn response(&self) -> &HttpResponse {
        &self.response
    }

    pub fn request(&self) -> &RequestSnapshot {
        &self.request
    }

    /// Response body decoded as UTF-8 (lossy).
    pub fn text(&self) -> String {
        self.response.text()
    }
}

/// Any failure while resolving, sending, parsing or mapping a call.
///
/// The original cause is preserved; the response and the raw body text are
/// attached whenever the failure happened after the exchange.
#[derive(Debug, Error)]
#[error("fetch pipeline failed: {cause}")]
pub struct PipelineError {
    #[source]
    cause: BoxError,
    response: Option<HttpResponse>,
    body_text: Option<String>,
    request: Option<RequestSnapshot>,
}

impl PipelineError {
    pub fn new(cause: impl Into<BoxError>) -> Self {
        Self {
            cause: cause.into(),
            response: None,
            body_text: None,
            request: None,
        }
    }

    /// The wrapped cause.
    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.cause.as_ref()
    }

    pub fn into_cause(self) -> BoxError {
        self.cause
    }

    /// Downcast the cause to a concrete error type.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.cause.downcast_ref::<T>()
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body_text.as_deref()
    }

    pub fn request(&self) -> Option<&RequestSnapshot> {
        self.request.as_ref()
    }

    pub fn with_body_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(text.into());
        self
    }

    pub fn with_request(mut self, request: RequestSnapshot) -> Self {
        self.request = Some(request);
        self
    }

    /// Attach the response (and its text) unless a callback already did.
    pub fn with_response_if_absent(mut self, response: HttpResponse) -> Self {
        if self.body_text.is_none() {
            self.body_text = Some(response.text());
        }
        if self.response.is_none() {
            self.response = Some(response);
        }
        self
    }

    pub(crate) fn with_request_if_absent(mut self, request: Option<RequestSnapshot>) -> Self {
        if self.request.is_none() {
            self.request = request;
        }
        self
    }
}

/// The unmapped runtime error of a fetcher: a non-2xx response or a pipeline
/// failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl FetchError {
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline(_))
    }

    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(error) => Some(error),
            Self::Pipeline(_) => None,
        }
    }

    pub fn as_pipeline(&self) -> Option<&PipelineError> {
        match self {
            Self::Pipeline(error) => Some(error),
            Self::Http(_) => None,
        }
    }

    /// Status of the response involved, if the exchange happened.
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(HttpResponse::status)
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Http(error) => Some(error.response()),
            Self::Pipeline(error) => error.response(),
        }
    }

    pub fn request(&self) -> Option<&RequestSnapshot> {
        match self {
            Self::Http(error) => Some(error.request()),
            Self::Pipeline(error) => error.request(),
        }
    }
}

/// Failures while turning resolved values into a transport request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid header name `{name}`")]
    InvalidHeaderName {
        name: String,
        #[source]
        source: reqwest::header::InvalidHeaderName,
    },

    #[error("invalid value for header `{name}`")]
    InvalidHeaderValue {
        name: String,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to encode JSON body: {0}")]
    JsonBody(#[from] serde_json::Error),
}

/// Failures reported by an `HttpTransport`.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    Custom(BoxError),
}

impl TransportError {
    pub fn custom(error: impl Into<BoxError>) -> Self {
        Self::Custom(error.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Reqwest(error) if error.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn snapshot() -> RequestSnapshot {
        RequestSnapshot::new(
            HttpMethod::Get,
            Url::parse("http://localhost/users").unwrap(),
        )
    }

    #[test]
    fn http_error_displays_status_and_text() {
        let response = HttpResponse::new(StatusCode::NOT_FOUND, HeaderMap::new(), "missing");
        let error = HttpError::new(response, snapshot());

        assert_eq!(error.to_string(), "HTTP 404 Not Found");
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.text(), "missing");
    }

    #[test]
    fn pipeline_error_keeps_first_response() {
        let first = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "first");
        let second = HttpResponse::new(StatusCode::OK, HeaderMap::new(), "second");
        let error = PipelineError::new("boom")
            .with_response_if_absent(first)
            .with_response_if_absent(second);

        assert_eq!(error.body_text(), Some("first"));
        assert_eq!(error.response().map(|r| r.text()).as_deref(), Some("first"));
        assert_eq!(error.cause().to_string(), "boom");
    }

    #[test]
    fn pipeline_error_downcasts_cause() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = PipelineError::new(cause);
        assert!(error.downcast_ref::<serde_json::Error>().is_some());
        assert!(error.downcast_ref::<RequestError>().is_none());
    }

    #[test]
    fn fetch_error_is_transparent() {
        let error = FetchError::from(PipelineError::new("boom"));
        assert_eq!(error.to_string(), "fetch pipeline failed: boom");
        assert!(error.is_pipeline());
        assert_eq!(error.status(), None);
    }

    #[test]
    fn definition_error_messages() {
        assert_eq!(
            DefinitionError::ParserAlreadySet {
                existing: ParserKind::Json
            }
            .to_string(),
            "a json parser is already set"
        );
        assert_eq!(
            DefinitionError::BodyNotAllowed(HttpMethod::Head).to_string(),
            "HEAD requests cannot carry a body"
        );
    }
}
