//! Default Configuration Values
//!
//! Default values used by the builder and the default transport.

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("typical-fetch/", env!("CARGO_PKG_VERSION"));

    /// Maximum number of redirects followed under `RedirectPolicy::Follow`.
    ///
    /// Matches the limit browsers apply to `fetch` with `redirect: "follow"`.
    pub const MAX_REDIRECTS: usize = 20;
}

/// Content types set automatically by body classification
pub mod content_type {
    /// Plain text bodies
    pub const TEXT_PLAIN: &str = "text/plain";

    /// Structured bodies encoded as JSON
    pub const APPLICATION_JSON: &str = "application/json";

    /// Fallback for binary multipart parts whose type can't be guessed
    pub const OCTET_STREAM: &str = "application/octet-stream";
}
