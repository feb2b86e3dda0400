//! Call builder.
//!
//! `CallBuilder` is an immutable, branchable description of one HTTP call.
//! Every method takes `&self` and returns a new builder, so a shared prefix
//! can be forked into several calls:
//!
//! ```rust,ignore
//! let users = build_call().base_url("https://api.example.com").path("/users");
//! let list = users.method(HttpMethod::Get).parse_json_as::<Vec<User>>().build()?;
//! let create = users.method(HttpMethod::Post).json_body_with(|u: &NewUser| u.clone()).build()?;
//! ```
//!
//! Misconfiguration (a second method, path, body or parser, an unparsable base
//! URL) is recorded on the descriptor and reported by [`CallBuilder::build`],
//! which is the only fallible step of a definition.

mod args;
mod descriptor;

pub use args::ExtendsArgs;
pub use descriptor::{
    BodyResolver, CallDescriptor, CallRecord, ErrorStage, HeaderResolver, ParserKind,
    PathResolver, QueryResolver, SuccessStage,
};

use crate::error::{BoxError, DefinitionError, FetchError, PipelineError, RequestError};
use crate::execution::Fetcher;
use crate::execution::http::transport::{HttpResponse, HttpTransport};
use crate::execution::http::url::parse_base_url;
use crate::types::{Body, HeaderSet, HttpMethod, QueryParams, TransportOptions};
use futures::FutureExt;
use futures::future;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Immutable builder of a typed fetcher.
///
/// - `R`: success type produced by the parser and mapper chain (`()` until a
///   parser is set)
/// - `A`: argument type passed to every resolver and callback
/// - `E`: error type produced by the error-mapper chain
#[must_use = "builder methods return a new builder and leave the receiver untouched"]
pub struct CallBuilder<R = (), A = (), E = FetchError> {
    descriptor: CallDescriptor<R, A, E>,
}

impl CallBuilder {
    /// Empty builder with no argument type.
    pub fn new() -> Self {
        Self {
            descriptor: CallDescriptor::empty(),
        }
    }
}

impl Default for CallBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, A, E> Clone for CallBuilder<R, A, E> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
        }
    }
}

impl<R, A, E> fmt::Debug for CallBuilder<R, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallBuilder")
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl<R, A, E> CallBuilder<R, A, E>
where
    R: Send + 'static,
    A: Send + Sync + 'static,
    E: Send + 'static,
{
    fn update(&self, update: impl FnOnce(&mut CallRecord<A>)) -> Self {
        let mut descriptor = self.descriptor.clone();
        update(&mut descriptor.record);
        Self { descriptor }
    }

    fn with_success<T>(
        &self,
        success: SuccessStage<A, T>,
        update: impl FnOnce(&mut CallRecord<A>),
    ) -> CallBuilder<T, A, E> {
        let mut record = self.descriptor.record.clone();
        update(&mut record);
        CallBuilder {
            descriptor: CallDescriptor {
                record,
                success,
                error: self.descriptor.error.clone(),
            },
        }
    }

    fn with_error_stage<E2>(&self, error: ErrorStage<A, E2>) -> CallBuilder<R, A, E2> {
        let mut record = self.descriptor.record.clone();
        record.error_mapper_count += 1;
        CallBuilder {
            descriptor: CallDescriptor {
                record,
                success: self.descriptor.success.clone(),
                error,
            },
        }
    }

    // ========================================================================
    // Request definition
    // ========================================================================

    /// Set the HTTP method. A descriptor holds one method.
    pub fn method(&self, method: HttpMethod) -> Self {
        self.update(|record| match record.method {
            Some(existing) => record.record_error(DefinitionError::MethodAlreadySet(existing)),
            None => record.method = Some(method),
        })
    }

    /// Fix the base URL, so calls no longer supply one.
    ///
    /// A later call replaces the earlier URL.
    pub fn base_url(&self, url: &str) -> Self {
        self.update(|record| match parse_base_url(url) {
            Ok(parsed) => record.base_url = Some(parsed),
            Err(error) => {
                let reason = match error {
                    RequestError::InvalidUrl { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                record.record_error(DefinitionError::InvalidBaseUrl {
                    url: url.to_string(),
                    reason,
                });
            }
        })
    }

    /// Constant path, relative to the base URL.
    pub fn path(&self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.set_path(Arc::new(move |_: &A| -> Result<String, BoxError> {
            Ok(path.clone())
        }))
    }

    /// Path computed from the call arguments.
    pub fn path_with<F, P>(&self, path: F) -> Self
    where
        F: Fn(&A) -> P + Send + Sync + 'static,
        P: Into<String>,
    {
        self.set_path(Arc::new(move |args: &A| -> Result<String, BoxError> {
            Ok(path(args).into())
        }))
    }

    fn set_path(&self, resolver: PathResolver<A>) -> Self {
        self.update(|record| {
            if record.path.is_some() {
                record.record_error(DefinitionError::PathAlreadySet);
            } else {
                record.path = Some(resolver);
            }
        })
    }

    /// Append a constant query set.
    pub fn query(&self, params: impl Into<QueryParams>) -> Self {
        let params = params.into();
        self.push_query(Arc::new(move |_: &A| -> Result<QueryParams, BoxError> {
            Ok(params.clone())
        }))
    }

    /// Append a query set computed from the call arguments.
    pub fn query_with<F, Q>(&self, query: F) -> Self
    where
        F: Fn(&A) -> Q + Send + Sync + 'static,
        Q: Into<QueryParams>,
    {
        self.push_query(Arc::new(move |args: &A| -> Result<QueryParams, BoxError> {
            Ok(query(args).into())
        }))
    }

    fn push_query(&self, resolver: QueryResolver<A>) -> Self {
        self.update(|record| record.query.push(resolver))
    }

    /// Append a constant header set.
    pub fn headers(&self, headers: impl Into<HeaderSet>) -> Self {
        let headers = headers.into();
        self.push_headers(Arc::new(move |_: &A| -> Result<HeaderSet, BoxError> {
            Ok(headers.clone())
        }))
    }

    /// Append a header set computed from the call arguments.
    pub fn headers_with<F, H>(&self, headers: F) -> Self
    where
        F: Fn(&A) -> H + Send + Sync + 'static,
        H: Into<HeaderSet>,
    {
        self.push_headers(Arc::new(move |args: &A| -> Result<HeaderSet, BoxError> {
            Ok(headers(args).into())
        }))
    }

    fn push_headers(&self, resolver: HeaderResolver<A>) -> Self {
        self.update(|record| record.headers.push(resolver))
    }

    /// Constant body, cloned for every call.
    pub fn body<B>(&self, body: B) -> Self
    where
        B: Into<Body> + Clone + Send + Sync + 'static,
    {
        self.set_body(Arc::new(move |_: &A| -> Result<Body, BoxError> {
            Ok(body.clone().into())
        }))
    }

    /// Body computed from the call arguments.
    pub fn body_with<F, B>(&self, body: F) -> Self
    where
        F: Fn(&A) -> B + Send + Sync + 'static,
        B: Into<Body>,
    {
        self.set_body(Arc::new(move |args: &A| -> Result<Body, BoxError> {
            Ok(body(args).into())
        }))
    }

    /// Fallible body resolver; an error becomes a pipeline error.
    pub fn try_body_with<F, B, X>(&self, body: F) -> Self
    where
        F: Fn(&A) -> Result<B, X> + Send + Sync + 'static,
        B: Into<Body>,
        X: Into<BoxError>,
    {
        self.set_body(Arc::new(move |args: &A| -> Result<Body, BoxError> {
            body(args).map(Into::into).map_err(Into::into)
        }))
    }

    /// Body serialized as JSON from any `Serialize` value.
    pub fn json_body_with<F, T>(&self, body: F) -> Self
    where
        F: Fn(&A) -> T + Send + Sync + 'static,
        T: Serialize,
    {
        self.set_body(Arc::new(move |args: &A| -> Result<Body, BoxError> {
            Body::json(&body(args)).map_err(|e| RequestError::JsonBody(e).into())
        }))
    }

    fn set_body(&self, resolver: BodyResolver<A>) -> Self {
        self.update(|record| {
            if record.body.is_some() {
                record.record_error(DefinitionError::BodyAlreadySet);
            } else {
                record.body = Some(resolver);
            }
        })
    }

    // ========================================================================
    // Response handling
    // ========================================================================

    fn with_parser<T>(&self, kind: ParserKind, stage: SuccessStage<A, T>) -> CallBuilder<T, A, E> {
        self.with_success(stage, |record| {
            if let Some(existing) = record.parser {
                record.record_error(DefinitionError::ParserAlreadySet { existing });
            } else if record.mapper_count > 0 {
                record.record_error(DefinitionError::ParserAfterMapper);
            } else {
                record.parser = Some(kind);
            }
        })
    }

    /// Parse the body as JSON and hand the value to `parse`.
    ///
    /// Malformed JSON and errors returned by `parse` become pipeline errors.
    pub fn parse_json<T, X, F>(&self, parse: F) -> CallBuilder<T, A, E>
    where
        T: Send + 'static,
        X: Into<BoxError>,
        F: Fn(serde_json::Value, &A) -> Result<T, X> + Send + Sync + 'static,
    {
        let stage: SuccessStage<A, T> = Arc::new(move |response: HttpResponse, args: Arc<A>| {
            let result = response
                .json::<serde_json::Value>()
                .map_err(PipelineError::new)
                .and_then(|value| parse(value, &args).map_err(PipelineError::new));
            future::ready(result).boxed()
        });
        self.with_parser(ParserKind::Json, stage)
    }

    /// Deserialize the JSON body into `T`.
    pub fn parse_json_as<T>(&self) -> CallBuilder<T, A, E>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.parse_json(|value, _: &A| serde_json::from_value::<T>(value))
    }

    /// Hand the body, decoded as UTF-8, to `parse`.
    pub fn parse_text<T, X, F>(&self, parse: F) -> CallBuilder<T, A, E>
    where
        T: Send + 'static,
        X: Into<BoxError>,
        F: Fn(String, &A) -> Result<T, X> + Send + Sync + 'static,
    {
        let stage: SuccessStage<A, T> = Arc::new(move |response: HttpResponse, args: Arc<A>| {
            let result = parse(response.text(), &args).map_err(PipelineError::new);
            future::ready(result).boxed()
        });
        self.with_parser(ParserKind::Text, stage)
    }

    /// Hand the whole response to an async `parse`.
    pub fn parse_response<T, X, F, Fut>(&self, parse: F) -> CallBuilder<T, A, E>
    where
        T: Send + 'static,
        X: Into<BoxError>,
        F: Fn(HttpResponse, Arc<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, X>> + Send + 'static,
    {
        let stage: SuccessStage<A, T> = Arc::new(move |response: HttpResponse, args: Arc<A>| {
            let pending = parse(response, args);
            async move { pending.await.map_err(PipelineError::new) }.boxed()
        });
        self.with_parser(ParserKind::Response, stage)
    }

    /// Transform the success value; the return type becomes the new success
    /// type.
    pub fn map<T, F>(&self, map: F) -> CallBuilder<T, A, E>
    where
        T: Send + 'static,
        F: Fn(R, &A) -> T + Send + Sync + 'static,
    {
        let previous = self.descriptor.success.clone();
        let map = Arc::new(map);
        let stage: SuccessStage<A, T> = Arc::new(move |response: HttpResponse, args: Arc<A>| {
            let pending = previous(response, args.clone());
            let map = map.clone();
            async move { pending.await.map(|value| map(value, &args)) }.boxed()
        });
        self.with_success(stage, |record| record.mapper_count += 1)
    }

    /// Fallible `map`; an error becomes a pipeline error.
    pub fn try_map<T, X, F>(&self, map: F) -> CallBuilder<T, A, E>
    where
        T: Send + 'static,
        X: Into<BoxError>,
        F: Fn(R, &A) -> Result<T, X> + Send + Sync + 'static,
    {
        let previous = self.descriptor.success.clone();
        let map = Arc::new(map);
        let stage: SuccessStage<A, T> = Arc::new(move |response: HttpResponse, args: Arc<A>| {
            let pending = previous(response, args.clone());
            let map = map.clone();
            async move {
                pending
                    .await
                    .and_then(|value| map(value, &args).map_err(PipelineError::new))
            }
            .boxed()
        });
        self.with_success(stage, |record| record.mapper_count += 1)
    }

    /// Transform the error value; the return type becomes the new error type.
    ///
    /// Error mappers run in registration order, each on its predecessor's
    /// output.
    pub fn map_error<E2, F>(&self, map: F) -> CallBuilder<R, A, E2>
    where
        E2: Send + 'static,
        F: Fn(E, &A) -> E2 + Send + Sync + 'static,
    {
        let previous = self.descriptor.error.clone();
        let map = Arc::new(map);
        self.with_error_stage(Arc::new(move |error: FetchError, args: Arc<A>| {
            let pending = previous(error, args.clone());
            let map = map.clone();
            async move { map(pending.await, &args) }.boxed()
        }))
    }

    /// Asynchronous `map_error`.
    pub fn map_error_async<E2, F, Fut>(&self, map: F) -> CallBuilder<R, A, E2>
    where
        E2: Send + 'static,
        F: Fn(E, Arc<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2> + Send + 'static,
    {
        let previous = self.descriptor.error.clone();
        let map = Arc::new(map);
        self.with_error_stage(Arc::new(move |error: FetchError, args: Arc<A>| {
            let pending = previous(error, args.clone());
            let map = map.clone();
            async move {
                let error = pending.await;
                map(error, args).await
            }
            .boxed()
        }))
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Shallow-merge transport overrides; fields set on `options` win.
    pub fn fetch_options(&self, options: TransportOptions) -> Self {
        self.update(|record| record.options = record.options.merge(options))
    }

    /// Per-request timeout.
    pub fn timeout(&self, timeout: Duration) -> Self {
        self.fetch_options(TransportOptions::new().timeout(timeout))
    }

    /// Send requests through `transport` instead of the default reqwest one.
    pub fn transport(&self, transport: Arc<dyn HttpTransport>) -> Self {
        self.update(|record| record.transport = Some(transport))
    }

    // ========================================================================
    // Arguments, introspection, build
    // ========================================================================

    /// Widen the argument type to `T`.
    ///
    /// Resolvers and callbacks registered so far receive
    /// `ExtendsArgs::<A>::base_args` of each call's `T`.
    pub fn args<T>(&self) -> CallBuilder<R, T, E>
    where
        T: ExtendsArgs<A> + Send + Sync + 'static,
        A: Clone,
    {
        let record = self
            .descriptor
            .record
            .project(<T as ExtendsArgs<A>>::base_args);
        let success = self.descriptor.success.clone();
        let error = self.descriptor.error.clone();
        CallBuilder {
            descriptor: CallDescriptor {
                record,
                success: Arc::new(move |response: HttpResponse, args: Arc<T>| {
                    success(response, Arc::new(ExtendsArgs::<A>::base_args(&*args).clone()))
                }),
                error: Arc::new(move |fetch_error: FetchError, args: Arc<T>| {
                    error(fetch_error, Arc::new(ExtendsArgs::<A>::base_args(&*args).clone()))
                }),
            },
        }
    }

    pub fn descriptor(&self) -> &CallDescriptor<R, A, E> {
        &self.descriptor
    }

    pub fn definition_error(&self) -> Option<&DefinitionError> {
        self.descriptor.definition_error()
    }

    /// Validate the descriptor and compile it into a fetcher.
    ///
    /// Fails on the first recorded misconfiguration, a missing method or path,
    /// or a body on a `GET`/`HEAD` call.
    pub fn build(&self) -> Result<Fetcher<R, A, E>, DefinitionError> {
        let record = &self.descriptor.record;
        if let Some(error) = &record.error {
            return Err(error.clone());
        }
        let method = record.method.ok_or(DefinitionError::MissingMethod)?;
        if record.path.is_none() {
            return Err(DefinitionError::MissingPath);
        }
        if record.body.is_some() && !method.allows_body() {
            return Err(DefinitionError::BodyNotAllowed(method));
        }

        tracing::debug!(
            %method,
            parser = ?record.parser,
            mappers = record.mapper_count,
            error_mappers = record.error_mapper_count,
            "fetcher built"
        );
        Ok(Fetcher::new(self.descriptor.clone(), method))
    }
}
