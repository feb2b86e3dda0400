//! Compiled fetchers.
//!
//! A `Fetcher` owns one frozen descriptor. Each call resolves the request from
//! its arguments, performs exactly one exchange and returns `Ok` with the
//! mapped success value or `Err` with the mapped error. Ordinary HTTP and
//! parsing failures never escape any other way.

use crate::builder::CallDescriptor;
use crate::error::{FetchError, HttpError, PipelineError, RequestError, RequestSnapshot, TransportError};
use crate::execution::http::body::classify_body;
use crate::execution::http::client::ReqwestTransport;
use crate::execution::http::headers::{apply_default_content_type, merge_headers};
use crate::execution::http::query::{append_query, merge_query};
use crate::execution::http::transport::{HttpTransport, HttpTransportRequest};
use crate::execution::http::url::{join_url, parse_base_url};
use crate::types::{HttpConfig, HttpMethod};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

/// Outcome of one fetcher call.
pub type CallResult<R, E = FetchError> = Result<R, E>;

/// An invocable, reusable HTTP call.
///
/// Cheap to clone; clones share the descriptor and the lazily created
/// default transport.
pub struct Fetcher<R, A = (), E = FetchError> {
    inner: Arc<FetcherInner<R, A, E>>,
}

struct FetcherInner<R, A, E> {
    descriptor: CallDescriptor<R, A, E>,
    method: HttpMethod,
    default_transport: OnceCell<Arc<dyn HttpTransport>>,
}

impl<R, A, E> Clone for Fetcher<R, A, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R, A, E> fmt::Debug for Fetcher<R, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("descriptor", &self.inner.descriptor)
            .finish()
    }
}

impl<R, A, E> Fetcher<R, A, E>
where
    R: Send + 'static,
    A: Send + Sync + 'static,
    E: Send + 'static,
{
    pub(crate) fn new(descriptor: CallDescriptor<R, A, E>, method: HttpMethod) -> Self {
        Self {
            inner: Arc::new(FetcherInner {
                descriptor,
                method,
                default_transport: OnceCell::new(),
            }),
        }
    }

    pub fn descriptor(&self) -> &CallDescriptor<R, A, E> {
        &self.inner.descriptor
    }

    /// Call against the base URL fixed with `CallBuilder::base_url`.
    ///
    /// # Panics
    ///
    /// Panics if the descriptor has no fixed base URL; use
    /// [`call_at`](Self::call_at) for those fetchers.
    pub async fn call(&self, args: A) -> CallResult<R, E> {
        let Some(base_url) = self.inner.descriptor.record.base_url.clone() else {
            panic!("fetcher has no base URL; use `call_at` or set one with `base_url`");
        };
        self.run(Ok(base_url), args).await
    }

    /// Call against `base_url`, unless the descriptor fixes its own.
    ///
    /// An unparsable `base_url` is reported as a pipeline error.
    pub async fn call_at(&self, base_url: &str, args: A) -> CallResult<R, E> {
        let base_url = match &self.inner.descriptor.record.base_url {
            Some(fixed) => Ok(fixed.clone()),
            None => parse_base_url(base_url),
        };
        self.run(base_url, args).await
    }

    async fn run(&self, base_url: Result<Url, RequestError>, args: A) -> CallResult<R, E> {
        let args = Arc::new(args);
        let span = tracing::debug_span!(
            "fetch",
            request_id = %Uuid::new_v4(),
            method = %self.inner.method,
            url = tracing::field::Empty,
        );

        async move {
            match self.execute(base_url, args.clone()).await {
                Ok(value) => Ok(value),
                Err(error) => {
                    tracing::debug!(%error, http = error.is_http(), "fetch failed");
                    Err((self.inner.descriptor.error)(error, args).await)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        base_url: Result<Url, RequestError>,
        args: Arc<A>,
    ) -> Result<R, FetchError> {
        let (request, snapshot) = self.prepare(base_url, &args)?;

        let transport = self
            .transport()
            .await
            .map_err(|e| PipelineError::new(e).with_request(snapshot.clone()))?;
        let response = transport
            .execute(request)
            .await
            .map_err(|e| PipelineError::new(e).with_request(snapshot.clone()))?;

        tracing::debug!(status = response.status().as_u16(), "response received");

        if !response.is_success() {
            return Err(HttpError::new(response, snapshot).into());
        }

        let retained = response.clone();
        (self.inner.descriptor.success)(response, args)
            .await
            .map_err(|error| {
                error
                    .with_response_if_absent(retained)
                    .with_request_if_absent(Some(snapshot))
                    .into()
            })
    }

    /// Resolve URL, query, headers and body into a transport request.
    fn prepare(
        &self,
        base_url: Result<Url, RequestError>,
        args: &A,
    ) -> Result<(HttpTransportRequest, RequestSnapshot), PipelineError> {
        let record = &self.inner.descriptor.record;
        let base_url = base_url.map_err(PipelineError::new)?;

        // `build()` guarantees a path resolver.
        let path = match &record.path {
            Some(resolve) => resolve(args).map_err(PipelineError::new)?,
            None => String::new(),
        };
        let mut url = join_url(&base_url, &path).map_err(PipelineError::new)?;

        let query = record
            .query
            .iter()
            .map(|resolve| resolve(args))
            .collect::<Result<Vec<_>, _>>()
            .map_err(PipelineError::new)?;
        append_query(&mut url, &merge_query(query));

        tracing::Span::current().record("url", url.as_str());
        let snapshot = RequestSnapshot::new(self.inner.method, url.clone());
        let fail = |cause: crate::error::BoxError| PipelineError::new(cause).with_request(snapshot.clone());

        let header_sets = record
            .headers
            .iter()
            .map(|resolve| resolve(args))
            .collect::<Result<Vec<_>, _>>()
            .map_err(fail)?;
        let mut headers = merge_headers(header_sets).map_err(|e| fail(e.into()))?;

        let mut body_kind = None;
        let body = match &record.body {
            Some(resolve) => {
                let resolved = resolve(args).map_err(fail)?;
                body_kind = Some(resolved.kind());
                let classified = classify_body(resolved);
                if let Some(content_type) = classified.content_type {
                    apply_default_content_type(&mut headers, content_type);
                }
                Some(classified.payload)
            }
            None => None,
        };

        tracing::debug!(
            headers = headers.len(),
            body = body_kind.unwrap_or("none"),
            "request prepared"
        );

        let request = HttpTransportRequest {
            method: self.inner.method,
            url,
            headers,
            body,
            options: record.options,
        };
        Ok((request, snapshot))
    }

    /// The injected transport, or the default one created on first use.
    async fn transport(&self) -> Result<Arc<dyn HttpTransport>, TransportError> {
        if let Some(transport) = &self.inner.descriptor.record.transport {
            return Ok(transport.clone());
        }
        self.inner
            .default_transport
            .get_or_try_init(|| async {
                ReqwestTransport::from_config(&HttpConfig::default())
                    .map(|transport| Arc::new(transport) as Arc<dyn HttpTransport>)
                    .inspect_err(|error| {
                        tracing::warn!(%error, "failed to create default transport")
                    })
            })
            .await
            .cloned()
    }
}

impl<R, E> Fetcher<R, (), E>
where
    R: Send + 'static,
    E: Send + 'static,
{
    /// `call(())` for fetchers without arguments.
    pub async fn send(&self) -> CallResult<R, E> {
        self.call(()).await
    }
}

static_assertions::assert_impl_all!(Fetcher<String, (), FetchError>: Send, Sync, Clone);
static_assertions::assert_impl_all!(crate::builder::CallBuilder: Send, Sync, Clone);
