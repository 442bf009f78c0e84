//! Unified error types for Redirector.
//!
//! Defines [`RedirectorError`] (the main crate error enum) and
//! [`ValidationError`] for redirect document lint findings. Both use
//! `thiserror` for `Display` and `Error` derives. Error messages
//! include contextual hints to guide the user toward a fix.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub entry: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  entry {}: {} — {}",
            self.entry, self.field, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RedirectorError {
    #[error("No redirect source found.\n\n  {hint}")]
    NoSource { hint: String },

    #[error("Redirect file not found: {}", path.display())]
    SourceFileNotFound { path: PathBuf },

    #[error("Parse error in {source_name}:\n  {source}")]
    Parse {
        source_name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Redirect document has problems:\n{}", format_errors(.errors))]
    Validation { errors: Vec<ValidationError> },

    #[error("Unsupported document format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Invalid --map entry '{0}' (expected PATH=URL)")]
    InvalidMapEntry(String),

    #[error("Redirect target cannot be sent as a Location header: {url}")]
    InvalidLocation { url: String },

    #[error("Store error ({backend}): {source}")]
    Store {
        backend: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("File already exists: {}", path.display())]
    FileExists { path: PathBuf },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(hyper::StatusCode),
}

impl RedirectorError {
    /// Wrap a backend failure as a request-scoped store error.
    pub fn store<E>(backend: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Store {
            backend,
            source: source.into(),
        }
    }
}
