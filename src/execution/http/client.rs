//! Default reqwest-backed transport.
//!
//! `ReqwestTransport` keeps one client per redirect policy so a fetcher's
//! `TransportOptions` can pick the policy per request. All clients share the
//! settings of one `HttpConfig`.

use super::transport::{HttpResponse, HttpTransport, HttpTransportRequest, RequestBody};
use crate::defaults::http::MAX_REDIRECTS;
use crate::error::TransportError;
use crate::types::{HttpConfig, MultipartForm, PartData, RedirectPolicy};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Build a reqwest client from `HttpConfig` with the given redirect policy.
pub fn build_http_client_from_config(
    config: &HttpConfig,
    redirect: RedirectPolicy,
) -> Result<reqwest::Client, TransportError> {
    let mut builder = reqwest::Client::builder().redirect(redirect_policy(redirect));

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }

    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| TransportError::InvalidConfig(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    if !config.headers.is_empty() {
        let mut headers = HeaderMap::new();
        for (k, v) in &config.headers {
            let name = HeaderName::from_bytes(k.as_bytes()).map_err(|e| {
                TransportError::InvalidConfig(format!("Invalid header name '{k}': {e}"))
            })?;
            let value = HeaderValue::from_str(v).map_err(|e| {
                TransportError::InvalidConfig(format!("Invalid header value for '{k}': {e}"))
            })?;
            headers.insert(name, value);
        }
        builder = builder.default_headers(headers);
    }

    builder
        .build()
        .map_err(|e| TransportError::InvalidConfig(format!("Failed to create HTTP client: {e}")))
}

fn redirect_policy(policy: RedirectPolicy) -> Policy {
    match policy {
        RedirectPolicy::Follow => Policy::limited(MAX_REDIRECTS),
        RedirectPolicy::Manual => Policy::none(),
        RedirectPolicy::Error => Policy::custom(|attempt| attempt.error("redirects are not allowed")),
    }
}

/// `HttpTransport` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    follow: reqwest::Client,
    manual: reqwest::Client,
    error: reqwest::Client,
}

impl ReqwestTransport {
    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        Ok(Self {
            follow: build_http_client_from_config(config, RedirectPolicy::Follow)?,
            manual: build_http_client_from_config(config, RedirectPolicy::Manual)?,
            error: build_http_client_from_config(config, RedirectPolicy::Error)?,
        })
    }

    /// Use one pre-built client for every request.
    ///
    /// Redirects are then governed by the client's own policy and
    /// `TransportOptions::redirect` is ignored.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            follow: client.clone(),
            manual: client.clone(),
            error: client,
        }
    }

    fn client(&self, policy: RedirectPolicy) -> &reqwest::Client {
        match policy {
            RedirectPolicy::Follow => &self.follow,
            RedirectPolicy::Manual => &self.manual,
            RedirectPolicy::Error => &self.error,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpTransportRequest) -> Result<HttpResponse, TransportError> {
        let HttpTransportRequest {
            method,
            url,
            headers,
            body,
            options,
        } = request;

        tracing::debug!(%method, %url, redirect = ?options.redirect_policy(), "sending request");

        let has_content_type = headers.contains_key(CONTENT_TYPE);
        let mut builder = self
            .client(options.redirect_policy())
            .request(method.into(), url)
            .headers(headers);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match body {
            None => builder,
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Bytes(bytes)) => builder.body(bytes),
            Some(RequestBody::Form(form)) => {
                let builder = builder.body(form.to_urlencoded());
                if has_content_type {
                    builder
                } else {
                    builder.header(CONTENT_TYPE, FORM_URLENCODED)
                }
            }
            Some(RequestBody::Multipart(form)) => builder.multipart(to_reqwest_form(form)?),
            Some(RequestBody::Stream(stream)) => builder.body(reqwest::Body::wrap_stream(stream)),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response.bytes().await?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(HttpResponse::new(status, headers, body).with_url(final_url))
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
    let mut out = reqwest::multipart::Form::new();
    for (name, part) in form.into_parts() {
        let mime = part.effective_mime();
        let mut converted = match part.data {
            PartData::Text(text) => reqwest::multipart::Part::text(text),
            PartData::Bytes(bytes) => reqwest::multipart::Part::bytes(bytes.to_vec()),
        };
        if let Some(file_name) = part.file_name {
            converted = converted.file_name(file_name);
        }
        if let Some(mime) = mime {
            converted = converted.mime_str(&mime)?;
        }
        out = out.part(name, converted);
    }
    Ok(out)
}
