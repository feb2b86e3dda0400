//! # typical-fetch
//!
//! Build reusable, typed HTTP fetchers with an immutable fluent builder.
//!
//! ## Features
//!
//! - **Immutable builder**: every chain method returns a new builder, so a shared
//!   prefix can be forked into several calls without interference.
//! - **Typed pipeline**: one parser (JSON, text or whole response) followed by any
//!   number of mappers; error mappers may change the error type freely.
//! - **Result, not panics**: HTTP failures and pipeline failures (bad JSON, failing
//!   callbacks, transport errors) always come back as `Err`, after the error-mapper
//!   chain.
//! - **Injectable transport**: reqwest by default, any `HttpTransport` on request.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typical_fetch::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let user_name = build_call()
//!         .base_url("https://api.example.com")
//!         .method(HttpMethod::Get)
//!         .path("/me")
//!         .parse_json(|json, _| {
//!             json["user"]["name"]
//!                 .as_str()
//!                 .map(str::to_uppercase)
//!                 .ok_or("missing user name")
//!         })
//!         .build()?;
//!
//!     match user_name.send().await {
//!         Ok(name) => println!("hello {name}"),
//!         Err(error) => eprintln!("failed: {error}"),
//!     }
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod builder;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod types;
pub mod utils;

pub use builder::{CallBuilder, CallDescriptor, ExtendsArgs, ParserKind};
pub use error::{
    BoxError, DefinitionError, FetchError, HttpError, PipelineError, RequestError,
    RequestSnapshot, TransportError, unwrap_error,
};
pub use execution::http::{HttpResponse, HttpTransport, HttpTransportRequest, ReqwestTransport};
pub use execution::{CallResult, Fetcher};
pub use types::{
    Body, HeaderSet, HttpConfig, HttpMethod, MultipartForm, Part, QueryParams, RedirectPolicy,
    TransportOptions,
};

/// Start a new call definition.
pub fn build_call() -> CallBuilder {
    CallBuilder::new()
}

/// Commonly used items.
pub mod prelude {
    pub use crate::build_call;
    pub use crate::builder::{CallBuilder, ExtendsArgs};
    pub use crate::error::{BoxError, FetchError, HttpError, PipelineError, unwrap_error};
    pub use crate::execution::{CallResult, Fetcher};
    pub use crate::types::{Body, HeaderSet, HttpMethod, QueryParams, TransportOptions};
}
