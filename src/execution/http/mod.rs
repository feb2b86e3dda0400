//! HTTP plumbing used by fetchers: URL, query, header and body preparation,
//! plus the transport abstraction and its reqwest implementation.

pub mod body;
pub mod client;
pub mod headers;
pub mod query;
pub mod transport;
pub mod url;

pub use body::{ClassifiedBody, classify_body};
pub use client::ReqwestTransport;
pub use headers::merge_headers;
pub use query::merge_query;
pub use transport::{HttpResponse, HttpTransport, HttpTransportRequest, RequestBody};
pub use self::url::{join_url, parse_base_url};
