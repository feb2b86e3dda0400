//! Execution layer: compiled fetchers and the HTTP plumbing they drive.

pub mod fetcher;
pub mod http;

pub use fetcher::{CallResult, Fetcher};
