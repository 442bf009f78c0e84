//! Redirector maps request paths to redirect targets.
//!
//! Each source (an in-memory map, a YAML document, a JSON document, or a
//! bucket in a persistent key-value store) is a [`Resolver`](redirect::Resolver).
//! A [`RedirectService`](redirect::RedirectService) pairs a resolver with a
//! fallback `tower::Service`: an exact path match answers `302 Found`,
//! anything else goes to the fallback.
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use axum::http::StatusCode;
//! use axum::Router;
//! use redirector::redirect::{map_handler, yaml_handler};
//!
//! # fn build() -> Result<Router, redirector::error::RedirectorError> {
//! let fallback = Router::new().fallback(|| async { StatusCode::NOT_FOUND });
//! let paths = HashMap::from([("/google".to_string(), "https://www.google.com".to_string())]);
//! let map = Router::new().fallback_service(map_handler(paths, fallback));
//! let yaml = yaml_handler(b"- path: /yt\n  url: https://youtube.com\n", map)?;
//! Ok(Router::new().fallback_service(yaml))
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`redirect`] -- Resolvers, redirect documents, and the redirect service.
//! - [`server`] -- Axum server setup, redirect chain, and graceful shutdown.
//! - [`store`] -- Persistent key-value store backends and the store resolver.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML redirect documents _(enabled by default)_ |
//! | `json` | JSON redirect documents _(enabled by default)_ |
//! | `sled` | sled store backend _(enabled by default)_ |
//! | `sqlite` | SQLite store backend |
//! | `file-backends` | All document formats |
//! | `store-backends` | All store backends |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod error;
pub mod health;
pub mod logging;
pub mod redirect;
pub mod server;
pub mod store;
