//! Serde model and parsers for YAML / JSON redirect documents.
//!
//! A redirect document is a top-level list of [`PathUrl`] records:
//!
//! ```yaml
//! - path: /google
//!   url: https://www.google.com
//! ```
//!
//! ```json
//! [{ "path": "/google", "url": "https://www.google.com" }]
//! ```
//!
//! Record order is preserved; resolvers rely on it for first-match-wins.

use serde::{Deserialize, Serialize};

use crate::error::RedirectorError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathUrl {
    pub path: String,
    pub url: String,
}

impl PathUrl {
    #[must_use]
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Pick a format from a file extension (`yaml`, `yml`, `json`).
    pub fn from_extension(ext: &str) -> Result<Self, RedirectorError> {
        match ext {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(RedirectorError::UnsupportedFormat(other.to_string())),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

/// Parse a YAML redirect document.
#[cfg(feature = "yaml")]
pub fn parse_yaml(payload: &[u8]) -> Result<Vec<PathUrl>, RedirectorError> {
    parse_document(DocumentFormat::Yaml, payload, "yaml payload")
}

/// Parse a JSON redirect document.
#[cfg(feature = "json")]
pub fn parse_json(payload: &[u8]) -> Result<Vec<PathUrl>, RedirectorError> {
    parse_document(DocumentFormat::Json, payload, "json payload")
}

/// Parse `payload` in the given format. `source_name` labels parse errors.
pub fn parse_document(
    format: DocumentFormat,
    payload: &[u8],
    source_name: &str,
) -> Result<Vec<PathUrl>, RedirectorError> {
    let parse_err = |e: Box<dyn std::error::Error + Send + Sync>| RedirectorError::Parse {
        source_name: source_name.to_string(),
        source: e,
    };

    match format {
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            // An empty YAML stream is an empty list, not a type error
            if payload.iter().all(u8::is_ascii_whitespace) {
                return Ok(Vec::new());
            }
            serde_yml::from_slice(payload).map_err(|e| parse_err(Box::new(e)))
        }

        #[cfg(not(feature = "yaml"))]
        DocumentFormat::Yaml => Err(RedirectorError::UnsupportedFormat("yaml".into())),

        #[cfg(feature = "json")]
        DocumentFormat::Json => serde_json::from_slice(payload).map_err(|e| parse_err(Box::new(e))),

        #[cfg(not(feature = "json"))]
        DocumentFormat::Json => Err(RedirectorError::UnsupportedFormat("json".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection() {
        assert_eq!(
            DocumentFormat::from_extension("yml").unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_extension("json").unwrap(),
            DocumentFormat::Json
        );
        assert!(matches!(
            DocumentFormat::from_extension("toml"),
            Err(RedirectorError::UnsupportedFormat(ext)) if ext == "toml"
        ));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_list_keeps_document_order() {
        let yaml = b"- path: /b\n  url: https://b.example\n- path: /a\n  url: https://a.example\n";
        let entries = parse_yaml(yaml).unwrap();
        assert_eq!(
            entries,
            vec![
                PathUrl::new("/b", "https://b.example"),
                PathUrl::new("/a", "https://a.example"),
            ]
        );
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn empty_yaml_is_empty_list() {
        assert!(parse_yaml(b"").unwrap().is_empty());
        assert!(parse_yaml(b"  \n").unwrap().is_empty());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_mapping_instead_of_list_is_parse_error() {
        let err = parse_yaml(b"path: /a\nurl: https://a.example\n").unwrap_err();
        assert!(matches!(err, RedirectorError::Parse { .. }));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_missing_url_is_parse_error() {
        let err = parse_json(br#"[{"path": "/a"}]"#).unwrap_err();
        match err {
            RedirectorError::Parse { source_name, .. } => assert_eq!(source_name, "json payload"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_ignores_extra_fields() {
        let entries =
            parse_json(br#"[{"path": "/a", "url": "https://a.example", "note": "x"}]"#).unwrap();
        assert_eq!(entries, vec![PathUrl::new("/a", "https://a.example")]);
    }
}
