//! Request body values returned by body resolvers.

use crate::error::BoxError;
use crate::types::params::QueryParams;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use serde::Serialize;
use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

/// Streaming request body source.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + Sync>>;

/// A request body as produced by a body resolver.
///
/// Body classification decides the wire encoding and the automatic content
/// type from the variant.
pub enum Body {
    /// UTF-8 text, sent as `text/plain` unless a content type was set.
    Text(String),
    /// Structured value, JSON-encoded and sent as `application/json`.
    Json(serde_json::Value),
    /// URL-encoded form set.
    Form(QueryParams),
    /// Multipart form set.
    Multipart(MultipartForm),
    /// Raw binary buffer.
    Binary(Bytes),
    /// Streaming byte source.
    Stream(ByteStream),
}

impl Body {
    /// Serialize any serde value into a [`Body::Json`].
    pub fn json<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value).map(Self::Json)
    }

    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::Stream(Box::pin(
            stream.map_err(|error: E| -> BoxError { error.into() }),
        ))
    }

    /// Stream the body from an async reader, e.g. an opened file.
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        Self::stream(ReaderStream::new(reader))
    }

    /// Short variant name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Json(_) => "json",
            Self::Form(_) => "form",
            Self::Multipart(_) => "multipart",
            Self::Binary(_) => "binary",
            Self::Stream(_) => "stream",
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Form(form) => f.debug_tuple("Form").field(form).finish(),
            Self::Multipart(form) => f.debug_tuple("Multipart").field(form).finish(),
            Self::Binary(bytes) => f.debug_tuple("Binary").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Binary(Bytes::from_static(bytes))
    }
}

impl From<QueryParams> for Body {
    fn from(form: QueryParams) -> Self {
        Self::Form(form)
    }
}

impl From<MultipartForm> for Body {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// Transport-agnostic multipart form.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<(String, Part)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(name, Part::text(value))
    }

    pub fn part(mut self, name: impl Into<String>, part: Part) -> Self {
        self.parts.push((name.into(), part));
        self
    }

    pub fn parts(&self) -> &[(String, Part)] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<(String, Part)> {
        self.parts
    }
}

/// Payload of a single multipart part.
#[derive(Debug, Clone)]
pub enum PartData {
    Text(String),
    Bytes(Bytes),
}

/// One multipart part.
#[derive(Debug, Clone)]
pub struct Part {
    pub data: PartData,
    pub file_name: Option<String>,
    pub mime: Option<String>,
}

impl Part {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            data: PartData::Text(value.into()),
            file_name: None,
            mime: None,
        }
    }

    pub fn bytes(value: impl Into<Bytes>) -> Self {
        Self {
            data: PartData::Bytes(value.into()),
            file_name: None,
            mime: None,
        }
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Explicit mime, else a guess from the file name or the content bytes.
    ///
    /// Text parts without a file name get no mime so the part stays a plain
    /// form field.
    pub fn effective_mime(&self) -> Option<String> {
        if let Some(mime) = &self.mime {
            return Some(mime.clone());
        }
        match (&self.data, self.file_name.as_deref()) {
            (PartData::Text(_), None) => None,
            (PartData::Bytes(bytes), name) => {
                Some(crate::utils::mime::guess_mime(Some(&bytes[..]), name))
            }
            (PartData::Text(_), Some(name)) => Some(crate::utils::mime::guess_mime(None, Some(name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_constructor_serializes_structs() {
        #[derive(Serialize)]
        struct Account {
            id: &'static str,
        }
        let body = Body::json(&Account { id: "a1" }).unwrap();
        match body {
            Body::Json(value) => assert_eq!(value["id"], "a1"),
            other => panic!("expected json body, got {other:?}"),
        }
    }

    #[test]
    fn conversions_pick_the_matching_variant() {
        assert_eq!(Body::from("hi").kind(), "text");
        assert_eq!(Body::from(vec![1u8, 2]).kind(), "binary");
        assert_eq!(Body::from(serde_json::json!({"a": 1})).kind(), "json");
        assert_eq!(Body::from(QueryParams::new().pair("a", "b")).kind(), "form");
        assert_eq!(Body::from(MultipartForm::new().text("a", "b")).kind(), "multipart");
    }

    #[test]
    fn part_mime_prefers_explicit_then_file_name() {
        let explicit = Part::bytes(vec![0u8; 4]).file_name("a.png").mime("image/x-custom");
        assert_eq!(explicit.effective_mime().as_deref(), Some("image/x-custom"));

        let by_name = Part::text("id,name").file_name("users.csv");
        assert_eq!(by_name.effective_mime().as_deref(), Some("text/csv"));

        assert_eq!(Part::text("plain field").effective_mime(), None);
    }

    #[tokio::test]
    async fn reader_body_streams_content() {
        use futures::StreamExt;

        let body = Body::reader(std::io::Cursor::new(b"chunked".to_vec()));
        let Body::Stream(mut stream) = body else {
            panic!("expected stream body");
        };
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"chunked");
    }
}
