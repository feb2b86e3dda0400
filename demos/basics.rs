//! Basic fetchers: a plain GET, a typed JSON parse and HTTP error handling.
//!
//! ```bash
//! RUST_LOG=typical_fetch=debug cargo run --example basics -- https://httpbin.org
//! ```

use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use typical_fetch::error::{ErrorKind, error_kind};
use typical_fetch::prelude::*;

#[derive(Debug, Deserialize)]
struct Slideshow {
    title: String,
    author: String,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FETCH_BASE_URL").ok())
        .unwrap_or_else(|| "https://httpbin.org".to_string());

    let api = build_call().base_url(&base_url);

    // Raw text
    let robots = api
        .method(HttpMethod::Get)
        .path("/robots.txt")
        .parse_text(|text, _| Ok::<_, BoxError>(text))
        .build()?;
    println!("robots.txt:\n{}", robots.send().await?);

    // Typed JSON with a projection
    let slideshow = api
        .method(HttpMethod::Get)
        .path("/json")
        .parse_json(|json, _| serde_json::from_value::<Slideshow>(json["slideshow"].clone()))
        .map(|show, _| format!("{} by {}", show.title, show.author))
        .build()?;
    println!("slideshow: {}", slideshow.send().await?);

    // Non-2xx responses arrive as `Err`, never as a panic
    let teapot = api.method(HttpMethod::Get).path("/status/418").build()?;
    match teapot.send().await {
        Ok(()) => println!("unexpected success"),
        Err(error) => println!(
            "status/418 failed: {error} (kind: {:?})",
            error_kind(&error)
        ),
    }

    // Error mappers can replace the error type entirely
    let lenient = api
        .method(HttpMethod::Get)
        .path("/status/503")
        .map_error(|error, _| match error_kind(&error) {
            ErrorKind::Server => "service unavailable, try later".to_string(),
            _ => error.to_string(),
        })
        .build()?;
    if let Err(message) = lenient.send().await {
        println!("status/503: {message}");
    }

    Ok(())
}
