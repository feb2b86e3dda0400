//! Value types shared by the builder, the pipeline and transports.

pub mod body;
pub mod http;
pub mod method;
pub mod params;

pub use body::{Body, ByteStream, MultipartForm, Part, PartData};
pub use http::{HttpConfig, HttpConfigBuilder, RedirectPolicy, TransportOptions};
pub use method::HttpMethod;
pub use params::{HeaderSet, QueryParams};
