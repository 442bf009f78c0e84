//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding source metadata,
//! stats, and uptime), [`RedirectChain`] for nesting redirect sources so
//! each one falls back to the next, [`build_router`] for mounting the chain
//! behind `/health` with middleware layers, and [`shutdown_signal`] for
//! SIGTERM / Ctrl+C handling.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tower::{Service, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::health::health_handler;
use crate::redirect::{RedirectService, Resolver, StoreErrorPolicy};

#[derive(Debug)]
pub struct Stats {
    pub redirects: AtomicU64,
    pub not_found: AtomicU64,
    pub errors: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            redirects: AtomicU64::new(0),
            not_found: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
}

/// One link of the redirect chain, as reported by `/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
}

pub struct AppState {
    pub sources: Vec<SourceInfo>,
    pub start_time: Instant,
    pub stats: Arc<Stats>,
}

/// Mount `redirects` behind `/health`.
pub fn build_router<S>(state: Arc<AppState>, redirects: S, max_body: usize) -> Router
where
    S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Response: IntoResponse,
    S::Future: Send + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .fallback_service(redirects)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body)),
        )
        .with_state(state)
}

/// Terminal link of a redirect chain: count and answer `404 Not Found`.
pub fn not_found_service(stats: Arc<Stats>) -> Router {
    Router::new().fallback(not_found).with_state(stats)
}

async fn not_found(State(stats): State<Arc<Stats>>, uri: Uri) -> Response {
    stats.not_found.fetch_add(1, Ordering::Relaxed);
    tracing::debug!(path = %uri.path(), "no redirect matched");
    StatusCode::NOT_FOUND.into_response()
}

/// Type-erase a chain link so the next one can use it as its fallback.
pub fn link<S>(service: S) -> Router
where
    S: Service<Request, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Response: IntoResponse,
    S::Future: Send + 'static,
{
    Router::new().fallback_service(service)
}

/// Builds a chain of redirect services from the inside out.
///
/// The chain starts as [`not_found_service`]. Every [`push`](Self::push)
/// wraps the current chain as the fallback of a new source, so the source
/// pushed last is consulted first.
pub struct RedirectChain {
    head: Router,
    sources: Vec<SourceInfo>,
    stats: Arc<Stats>,
    policy: StoreErrorPolicy,
}

impl RedirectChain {
    #[must_use]
    pub fn new(stats: Arc<Stats>, policy: StoreErrorPolicy) -> Self {
        Self {
            head: not_found_service(Arc::clone(&stats)),
            sources: Vec::new(),
            stats,
            policy,
        }
    }

    pub fn push<R: Resolver + 'static>(&mut self, origin: impl Into<String>, resolver: R) {
        let info = SourceInfo {
            name: resolver.name().to_string(),
            origin: origin.into(),
            entries: resolver.entries(),
        };
        tracing::info!(
            source = %info.name,
            origin = %info.origin,
            entries = ?info.entries,
            "redirect source loaded"
        );
        self.sources.push(info);

        let fallback = std::mem::replace(&mut self.head, Router::new());
        let service = RedirectService::new(resolver, fallback)
            .on_store_error(self.policy)
            .with_stats(Arc::clone(&self.stats));
        self.head = link(service);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// The assembled service and its sources, outermost first.
    #[must_use]
    pub fn finish(self) -> (Router, Vec<SourceInfo>) {
        let mut sources = self.sources;
        sources.reverse();
        (self.head, sources)
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
