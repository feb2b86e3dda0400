//! Utility modules for typical-fetch

pub mod mime;

pub use mime::guess_mime;
