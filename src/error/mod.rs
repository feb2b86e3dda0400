//! Error handling types for typical-fetch.
//!
//! Definition errors are returned by `CallBuilder::build`. Runtime failures
//! are `FetchError`s, which every fetcher routes through its error-mapper
//! chain before handing them to the caller.

pub mod helpers;
pub mod types;

pub use helpers::{ErrorKind, error_kind, status_code_of, unwrap_error};
pub use types::*;
