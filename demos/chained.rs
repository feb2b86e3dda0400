//! Shared prefixes, argument widening and uploads.
//!
//! One authenticated prefix is forked into several calls. Each call widens the
//! argument type while keeping the resolvers registered on the prefix.
//!
//! ```bash
//! cargo run --example chained -- https://httpbin.org ./Cargo.toml
//! ```

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use typical_fetch::prelude::*;
use typical_fetch::{MultipartForm, Part};

#[derive(Clone)]
struct Auth {
    token: String,
}

struct Search {
    auth: Auth,
    term: String,
    page: u32,
}

impl ExtendsArgs<Auth> for Search {
    fn base_args(&self) -> &Auth {
        &self.auth
    }
}

struct Upload {
    auth: Auth,
    file: PathBuf,
}

impl ExtendsArgs<Auth> for Upload {
    fn base_args(&self) -> &Auth {
        &self.auth
    }
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
    page: u32,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut cli = std::env::args().skip(1);
    let base_url = cli.next().unwrap_or_else(|| "https://httpbin.org".to_string());
    let file = cli.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("Cargo.toml"));

    let authed = build_call()
        .base_url(&base_url)
        .timeout(Duration::from_secs(10))
        .args::<Auth>()
        .headers_with(|auth: &Auth| {
            HeaderSet::object([("authorization", format!("Bearer {}", auth.token))])
        })
        .headers([("x-client", "typical-fetch-demo")]);

    let search = authed
        .args::<Search>()
        .method(HttpMethod::Get)
        .path("/anything/search")
        .query_with(|args: &Search| {
            QueryParams::from_serialize(&SearchQuery {
                q: &args.term,
                page: args.page,
            })
            .unwrap_or_default()
        })
        .parse_json(|json, _| Ok::<_, BoxError>(json["url"].as_str().unwrap_or_default().to_owned()))
        .build()?;

    let upload = authed
        .args::<Upload>()
        .method(HttpMethod::Post)
        .path("/post")
        .try_body_with(|args: &Upload| -> Result<MultipartForm, std::io::Error> {
            let bytes = std::fs::read(&args.file)?;
            let name = args
                .file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.bin".to_string());
            Ok(MultipartForm::new()
                .text("description", "demo upload")
                .part("file", Part::bytes(bytes).file_name(name)))
        })
        .parse_json(|json, _| {
            Ok::<_, BoxError>(json["files"].as_object().map(|f| f.len()).unwrap_or_default())
        })
        .build()?;

    let auth = Auth {
        token: "demo-token".to_string(),
    };

    let url = search
        .call(Search {
            auth: auth.clone(),
            term: "typed fetchers".to_string(),
            page: 2,
        })
        .await?;
    println!("search hit {url}");

    let files = upload.call(Upload { auth, file }).await?;
    println!("server received {files} file part(s)");

    Ok(())
}
