//! Body classification.

use super::transport::RequestBody;
use crate::defaults::content_type::{APPLICATION_JSON, TEXT_PLAIN};
use crate::types::Body;

/// A classified body: the wire payload plus the content type to set when the
/// caller has not configured one.
#[derive(Debug)]
pub struct ClassifiedBody {
    pub payload: RequestBody,
    pub content_type: Option<&'static str>,
}

/// Decide the encoding and automatic content type of a body.
///
/// Text becomes `text/plain` and structured values are JSON-encoded as
/// `application/json`. Forms, multipart forms, binary buffers and streams pass
/// through untouched; the transport supplies their content type.
pub fn classify_body(body: Body) -> ClassifiedBody {
    match body {
        Body::Text(text) => ClassifiedBody {
            payload: RequestBody::Text(text),
            content_type: Some(TEXT_PLAIN),
        },
        Body::Json(value) => ClassifiedBody {
            payload: RequestBody::Bytes(value.to_string().into()),
            content_type: Some(APPLICATION_JSON),
        },
        Body::Form(form) => passthrough(RequestBody::Form(form)),
        Body::Multipart(form) => passthrough(RequestBody::Multipart(form)),
        Body::Binary(bytes) => passthrough(RequestBody::Bytes(bytes)),
        Body::Stream(stream) => passthrough(RequestBody::Stream(stream)),
    }
}

fn passthrough(payload: RequestBody) -> ClassifiedBody {
    ClassifiedBody {
        payload,
        content_type: None,
    }
}
