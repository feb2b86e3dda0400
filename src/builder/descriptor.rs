//! The immutable record behind a `CallBuilder`.
//!
//! Resolvers and stages are stored as `Arc<dyn Fn ..>` so a descriptor clones
//! in O(fields) and every fork of a builder shares its history.

use crate::error::{BoxError, DefinitionError, FetchError, PipelineError};
use crate::execution::http::transport::{HttpResponse, HttpTransport};
use crate::types::{Body, HeaderSet, HttpMethod, QueryParams, TransportOptions};
use futures::FutureExt;
use futures::future::{self, BoxFuture};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Resolves the request path from the call arguments.
pub type PathResolver<A> = Arc<dyn Fn(&A) -> Result<String, BoxError> + Send + Sync>;

/// Resolves one partial query set.
pub type QueryResolver<A> = Arc<dyn Fn(&A) -> Result<QueryParams, BoxError> + Send + Sync>;

/// Resolves one partial header set.
pub type HeaderResolver<A> = Arc<dyn Fn(&A) -> Result<HeaderSet, BoxError> + Send + Sync>;

/// Resolves the request body.
pub type BodyResolver<A> = Arc<dyn Fn(&A) -> Result<Body, BoxError> + Send + Sync>;

/// Success path: parser followed by the mapper chain, fused into one step.
pub type SuccessStage<A, R> = Arc<
    dyn Fn(HttpResponse, Arc<A>) -> BoxFuture<'static, Result<R, PipelineError>> + Send + Sync,
>;

/// Error path: the error-mapper chain fused into one step.
pub type ErrorStage<A, E> = Arc<dyn Fn(FetchError, Arc<A>) -> BoxFuture<'static, E> + Send + Sync>;

/// Kind of the single parser a descriptor may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Json,
    Text,
    Response,
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Response => "response",
        })
    }
}

/// Untyped part of a descriptor: everything needed to build the request.
pub struct CallRecord<A> {
    pub(crate) method: Option<HttpMethod>,
    pub(crate) base_url: Option<Url>,
    pub(crate) path: Option<PathResolver<A>>,
    pub(crate) query: Vec<QueryResolver<A>>,
    pub(crate) headers: Vec<HeaderResolver<A>>,
    pub(crate) body: Option<BodyResolver<A>>,
    pub(crate) parser: Option<ParserKind>,
    pub(crate) mapper_count: usize,
    pub(crate) error_mapper_count: usize,
    pub(crate) options: TransportOptions,
    pub(crate) transport: Option<Arc<dyn HttpTransport>>,
    /// First misconfiguration, reported by `build()`.
    pub(crate) error: Option<DefinitionError>,
}

impl<A> CallRecord<A> {
    pub(crate) fn new() -> Self {
        Self {
            method: None,
            base_url: None,
            path: None,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            parser: None,
            mapper_count: 0,
            error_mapper_count: 0,
            options: TransportOptions::default(),
            transport: None,
            error: None,
        }
    }

    /// Keep the first definition error only.
    pub(crate) fn record_error(&mut self, error: DefinitionError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Re-key every resolver onto a wider argument type.
    pub(crate) fn project<T, F>(&self, project: F) -> CallRecord<T>
    where
        A: 'static,
        T: 'static,
        F: Fn(&T) -> &A + Clone + Send + Sync + 'static,
    {
        fn lift<A: 'static, T: 'static, V: 'static, F>(
            resolver: &Arc<dyn Fn(&A) -> Result<V, BoxError> + Send + Sync>,
            project: F,
        ) -> Arc<dyn Fn(&T) -> Result<V, BoxError> + Send + Sync>
        where
            F: Fn(&T) -> &A + Send + Sync + 'static,
        {
            let resolver = resolver.clone();
            Arc::new(move |args: &T| resolver(project(args)))
        }

        CallRecord {
            method: self.method,
            base_url: self.base_url.clone(),
            path: self.path.as_ref().map(|r| lift(r, project.clone())),
            query: self.query.iter().map(|r| lift(r, project.clone())).collect(),
            headers: self.headers.iter().map(|r| lift(r, project.clone())).collect(),
            body: self.body.as_ref().map(|r| lift(r, project.clone())),
            parser: self.parser,
            mapper_count: self.mapper_count,
            error_mapper_count: self.error_mapper_count,
            options: self.options,
            transport: self.transport.clone(),
            error: self.error.clone(),
        }
    }
}

impl<A> Clone for CallRecord<A> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            base_url: self.base_url.clone(),
            path: self.path.clone(),
            query: self.query.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            parser: self.parser,
            mapper_count: self.mapper_count,
            error_mapper_count: self.error_mapper_count,
            options: self.options,
            transport: self.transport.clone(),
            error: self.error.clone(),
        }
    }
}

/// A call descriptor: the request record plus the typed success and error
/// stages. `R` is the success type, `A` the argument type and `E` the error
/// type produced by the error-mapper chain.
pub struct CallDescriptor<R, A, E> {
    pub(crate) record: CallRecord<A>,
    pub(crate) success: SuccessStage<A, R>,
    pub(crate) error: ErrorStage<A, E>,
}

impl<R, A, E> Clone for CallDescriptor<R, A, E> {
    fn clone(&self) -> Self {
        Self {
            record: self.record.clone(),
            success: self.success.clone(),
            error: self.error.clone(),
        }
    }
}

impl<A: Send + Sync + 'static> CallDescriptor<(), A, FetchError> {
    /// Empty descriptor: no parser (the payload is `()`) and no error mappers.
    pub(crate) fn empty() -> Self {
        Self {
            record: CallRecord::new(),
            success: Arc::new(|_response: HttpResponse, _args: Arc<A>| {
                future::ready(Ok::<(), PipelineError>(())).boxed()
            }),
            error: Arc::new(|error: FetchError, _args: Arc<A>| future::ready(error).boxed()),
        }
    }
}

impl<R, A, E> CallDescriptor<R, A, E> {
    pub fn method(&self) -> Option<HttpMethod> {
        self.record.method
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.record.base_url.as_ref()
    }

    pub fn has_path(&self) -> bool {
        self.record.path.is_some()
    }

    pub fn query_resolver_count(&self) -> usize {
        self.record.query.len()
    }

    pub fn header_resolver_count(&self) -> usize {
        self.record.headers.len()
    }

    pub fn has_body(&self) -> bool {
        self.record.body.is_some()
    }

    pub fn parser(&self) -> Option<ParserKind> {
        self.record.parser
    }

    pub fn mapper_count(&self) -> usize {
        self.record.mapper_count
    }

    pub fn error_mapper_count(&self) -> usize {
        self.record.error_mapper_count
    }

    pub fn transport_options(&self) -> TransportOptions {
        self.record.options
    }

    pub fn has_custom_transport(&self) -> bool {
        self.record.transport.is_some()
    }

    /// The first misconfiguration recorded so far, if any.
    pub fn definition_error(&self) -> Option<&DefinitionError> {
        self.record.error.as_ref()
    }
}

impl<R, A, E> fmt::Debug for CallDescriptor<R, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallDescriptor")
            .field("method", &self.record.method)
            .field("base_url", &self.record.base_url.as_ref().map(Url::as_str))
            .field("has_path", &self.has_path())
            .field("query_resolvers", &self.record.query.len())
            .field("header_resolvers", &self.record.headers.len())
            .field("has_body", &self.has_body())
            .field("parser", &self.record.parser)
            .field("mappers", &self.record.mapper_count)
            .field("error_mappers", &self.record.error_mapper_count)
            .field("options", &self.record.options)
            .field("error", &self.record.error)
            .finish()
    }
}
