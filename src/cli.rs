//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, init, validate, health), and their associated
//! argument structs. Every `run` flag has an environment variable
//! equivalent for container deployments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::redirect::{DocumentFormat, StoreErrorPolicy};

#[derive(Parser)]
#[command(
    name = "redirector",
    version,
    about = "Path-to-URL redirect server",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        redirector init                          Create ./redirects.yaml\n  \
        redirector run                           Serve ./redirects.yaml\n  \
        redirector run --json-file links.json    Serve a JSON document"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the redirect server
    Run(Box<RunArgs>),

    /// Generate a starter redirect document
    Init(InitArgs),

    /// Validate a redirect document without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        redirector run                                       Auto-detect ./redirects.yaml\n  \
        redirector run --yaml-file redirects.yaml -p 8080    Specific document\n  \
        redirector run --map /gh=https://github.com          Inline redirects\n  \
        redirector run --sled-path ./redirects.db            Store bucket 'pathstourls'")]
pub struct RunArgs {
    /// YAML redirect document
    #[arg(long, env = "REDIRECTS_YAML", help_heading = "Sources")]
    pub yaml_file: Option<PathBuf>,

    /// JSON redirect document
    #[arg(long, env = "REDIRECTS_JSON", help_heading = "Sources")]
    pub json_file: Option<PathBuf>,

    /// Inline redirect as PATH=URL (repeatable)
    #[arg(
        long = "map",
        env = "REDIRECTS_MAP",
        value_delimiter = ',',
        help_heading = "Sources"
    )]
    pub map: Vec<String>,

    /// sled database directory
    #[cfg(feature = "sled")]
    #[arg(long, env = "SLED_PATH", help_heading = "Sources")]
    pub sled_path: Option<PathBuf>,

    /// `SQLite` database path
    #[cfg(feature = "sqlite")]
    #[arg(long, env = "SQLITE_PATH", help_heading = "Sources")]
    pub sqlite_path: Option<PathBuf>,

    /// What to answer when a store read fails
    #[arg(
        long,
        env = "ON_STORE_ERROR",
        default_value = "fail",
        help_heading = "Sources"
    )]
    pub on_store_error: OnStoreError,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Max request body size in bytes
    #[arg(
        long,
        env = "MAX_BODY_SIZE",
        default_value_t = 65_536,
        help_heading = "Tuning"
    )]
    pub max_body: usize,
}

impl RunArgs {
    #[must_use]
    pub fn has_explicit_source(&self) -> bool {
        #[allow(unused_mut)]
        let mut any = self.yaml_file.is_some() || self.json_file.is_some() || !self.map.is_empty();
        #[cfg(feature = "sled")]
        {
            any |= self.sled_path.is_some();
        }
        #[cfg(feature = "sqlite")]
        {
            any |= self.sqlite_path.is_some();
        }
        any
    }
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        redirector init                           Starter ./redirects.yaml\n  \
        redirector init -f json -o links.json     JSON document")]
pub struct InitArgs {
    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: RedirectFormat,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Redirect document to validate
    #[arg(default_value = "redirects.yaml")]
    pub file: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum RedirectFormat {
    Yaml,
    Json,
}

impl RedirectFormat {
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    #[must_use]
    pub const fn to_document_format(&self) -> DocumentFormat {
        match self {
            Self::Yaml => DocumentFormat::Yaml,
            Self::Json => DocumentFormat::Json,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum OnStoreError {
    /// Answer 500 Internal Server Error
    Fail,
    /// Log and fall through to the next source
    Fallback,
}

impl OnStoreError {
    #[must_use]
    pub const fn to_policy(&self) -> StoreErrorPolicy {
        match self {
            Self::Fail => StoreErrorPolicy::Fail,
            Self::Fallback => StoreErrorPolicy::Fallback,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
