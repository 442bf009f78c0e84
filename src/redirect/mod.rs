//! Path-to-URL redirect dispatch.
//!
//! A [`RedirectService`] pairs a [`Resolver`] with a fallback
//! `tower::Service`. For every request it looks up the raw URI path
//! (exact match, no normalization) and either answers `302 Found` with a
//! `Location` header, or hands the request to the fallback untouched.
//!
//! Redirect and fallback are mutually exclusive. Earlier versions of the
//! map and store handlers wrote the redirect and then *also* invoked the
//! fallback, producing two responses for a matched path. A match now
//! returns immediately; the fallback only runs on a miss.
//!
//! Store read failures are request-scoped: they are logged and answered
//! according to [`StoreErrorPolicy`], never by aborting the process.
//!
//! Constructors: [`map_handler`], [`yaml_handler`], [`json_handler`] and
//! [`store_handler`].

pub mod document;
pub mod resolver;
pub mod validation;

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, Request, StatusCode};
use tower::{Service, ServiceExt};

pub use document::{DocumentFormat, PathUrl};
pub use resolver::{DocumentResolver, MapResolver, Resolver};

use crate::error::RedirectorError;
use crate::server::Stats;
use crate::store::{BucketStore, StoreResolver};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What to answer when the resolver itself fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreErrorPolicy {
    /// Answer `500 Internal Server Error`.
    #[default]
    Fail,
    /// Log and delegate to the fallback as if nothing matched.
    Fallback,
}

pub struct RedirectService<R, F> {
    resolver: Arc<R>,
    fallback: F,
    on_error: StoreErrorPolicy,
    stats: Option<Arc<Stats>>,
}

impl<R, F: Clone> Clone for RedirectService<R, F> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            fallback: self.fallback.clone(),
            on_error: self.on_error,
            stats: self.stats.clone(),
        }
    }
}

impl<R: Resolver, F> RedirectService<R, F> {
    #[must_use]
    pub fn new(resolver: R, fallback: F) -> Self {
        Self::from_shared(Arc::new(resolver), fallback)
    }

    #[must_use]
    pub fn from_shared(resolver: Arc<R>, fallback: F) -> Self {
        Self {
            resolver,
            fallback,
            on_error: StoreErrorPolicy::Fail,
            stats: None,
        }
    }

    #[must_use]
    pub fn on_store_error(mut self, policy: StoreErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Count redirects and resolver errors into `stats`.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<Stats>) -> Self {
        self.stats = Some(stats);
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}

/// Redirect from a caller-built path → URL map.
#[must_use]
pub fn map_handler<F>(
    paths: HashMap<String, String>,
    fallback: F,
) -> RedirectService<MapResolver, F> {
    RedirectService::new(MapResolver::new(paths), fallback)
}

/// Redirect from a YAML document. Fails if the payload does not parse.
#[cfg(feature = "yaml")]
pub fn yaml_handler<F>(
    yaml: &[u8],
    fallback: F,
) -> Result<RedirectService<DocumentResolver, F>, RedirectorError> {
    Ok(RedirectService::new(DocumentResolver::from_yaml(yaml)?, fallback))
}

/// Redirect from a JSON document. Fails if the payload does not parse.
#[cfg(feature = "json")]
pub fn json_handler<F>(
    json: &[u8],
    fallback: F,
) -> Result<RedirectService<DocumentResolver, F>, RedirectorError> {
    Ok(RedirectService::new(DocumentResolver::from_json(json)?, fallback))
}

/// Redirect from the `pathstourls` bucket of an opened store.
#[must_use]
pub fn store_handler<F>(
    store: Arc<dyn BucketStore>,
    fallback: F,
) -> RedirectService<StoreResolver, F> {
    RedirectService::new(StoreResolver::new(store), fallback)
}

/// Build a `302 Found` response pointing at `url`.
pub fn found(url: &str) -> Result<Response, RedirectorError> {
    let location = HeaderValue::from_str(url).map_err(|_| RedirectorError::InvalidLocation {
        url: url.to_string(),
    })?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

fn with_correlation_id(mut response: Response, correlation_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

impl<R, F, B> Service<Request<B>> for RedirectService<R, F>
where
    R: Resolver + 'static,
    F: Service<Request<B>, Error = Infallible> + Clone + Send + 'static,
    F::Response: IntoResponse,
    F::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The fallback is driven to readiness by `oneshot` on a clone.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let resolver = Arc::clone(&self.resolver);
        let fallback = self.fallback.clone();
        let on_error = self.on_error;
        let stats = self.stats.clone();

        Box::pin(async move {
            let path = req.uri().path().to_owned();
            let correlation_id = req
                .headers()
                .get(CORRELATION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

            let failure = match resolver.resolve(&path).await {
                Ok(Some(url)) => match found(&url) {
                    Ok(response) => {
                        if let Some(ref stats) = stats {
                            stats.redirects.fetch_add(1, Ordering::Relaxed);
                        }
                        tracing::debug!(
                            correlation_id = %correlation_id,
                            source = resolver.name(),
                            path = %path,
                            location = %url,
                            "redirecting"
                        );
                        return Ok(with_correlation_id(response, &correlation_id));
                    }
                    Err(e) => Some(e),
                },
                Ok(None) => None,
                Err(e) => Some(e),
            };

            if let Some(e) = failure {
                if let Some(ref stats) = stats {
                    stats.errors.fetch_add(1, Ordering::Relaxed);
                }
                tracing::error!(
                    correlation_id = %correlation_id,
                    source = resolver.name(),
                    path = %path,
                    error = %e,
                    "redirect lookup failed"
                );
                if on_error == StoreErrorPolicy::Fail {
                    let response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    return Ok(with_correlation_id(response, &correlation_id));
                }
            }

            tracing::debug!(
                correlation_id = %correlation_id,
                source = resolver.name(),
                path = %path,
                "no redirect, delegating to fallback"
            );
            match fallback.oneshot(req).await {
                Ok(response) => Ok(response.into_response()),
                Err(never) => match never {},
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn found_sets_status_and_location() {
        let response = found("https://www.google.com").unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            "https://www.google.com"
        );
    }

    #[test]
    fn found_keeps_relative_targets_verbatim() {
        let response = found("/elsewhere?x=1").unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/elsewhere?x=1");
    }

    #[test]
    fn found_rejects_unencodable_target() {
        let err = found("https://example.com/\nSet-Cookie: x=1").unwrap_err();
        assert!(matches!(err, RedirectorError::InvalidLocation { .. }));
    }

    #[test]
    fn default_policy_is_fail() {
        assert_eq!(StoreErrorPolicy::default(), StoreErrorPolicy::Fail);
    }
}
