//! `redirector init` — generate a starter redirect document.
//!
//! Writes a small YAML or JSON document that `redirector run` picks up
//! from the working directory without any flags.

use std::path::PathBuf;

use crate::cli::{InitArgs, RedirectFormat};
use crate::error::RedirectorError;

pub fn execute(args: &InitArgs) -> Result<(), RedirectorError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("redirects.{}", args.format.extension())));

    if output.exists() {
        return Err(RedirectorError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &RedirectFormat) -> &'static str {
    match format {
        RedirectFormat::Yaml => YAML_STARTER,
        RedirectFormat::Json => JSON_STARTER,
    }
}

const YAML_STARTER: &str = r#"# Redirector document
#
# Each entry maps an exact request path to a target URL. Paths are
# compared as-is: no trailing-slash or case folding. When a path appears
# twice, the first entry wins.

- path: /google
  url: https://www.google.com

- path: /yt
  url: https://youtube.com

# Targets may also be absolute paths on this host:
# - path: /old-docs
#   url: /docs
"#;

const JSON_STARTER: &str = r#"[
  { "path": "/google", "url": "https://www.google.com" },
  { "path": "/yt", "url": "https://youtube.com" }
]
"#;
