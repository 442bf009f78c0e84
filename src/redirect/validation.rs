//! Lint checks for redirect documents.
//!
//! Resolvers accept any document that parses; [`validate`] is what
//! `redirector validate` runs on top of that. It reports empty documents,
//! paths that can never match a request, malformed targets, and duplicate
//! paths whose later entries are shadowed by the first one.

use std::collections::HashMap;

use url::Url;

use super::document::PathUrl;
use crate::error::ValidationError;

/// Validate a single redirect path. Returns `Ok(())` or a human-readable error.
pub fn validate_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path cannot be empty".into());
    }
    if !path.starts_with('/') {
        return Err("path must start with '/' or it will never match a request".into());
    }
    Ok(())
}

/// Validate a redirect target. Absolute paths on the same host are allowed
/// as-is; anything else must be an `http` or `https` URL.
pub fn validate_target_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("url cannot be empty".into());
    }
    if url.starts_with('/') && !url.starts_with("//") {
        return Ok(());
    }
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme == "http" || scheme == "https" {
                Ok(())
            } else {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate(entries: &[PathUrl]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if entries.is_empty() {
        errors.push(ValidationError {
            entry: "(root)".into(),
            field: "entries".into(),
            message: "at least one redirect must be defined".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    let mut first_seen: HashMap<&str, usize> = HashMap::new();

    for (i, entry) in entries.iter().enumerate() {
        let entry_id = if entry.path.is_empty() {
            format!("entries[{i}]")
        } else {
            format!("{} (#{})", entry.path, i + 1)
        };

        if let Err(msg) = validate_path(&entry.path) {
            errors.push(ValidationError {
                entry: entry_id.clone(),
                field: "path".into(),
                message: msg,
                suggestion: if entry.path.is_empty() {
                    None
                } else {
                    Some(format!("did you mean '/{}'?", entry.path))
                },
            });
        }

        if let Some(first) = first_seen.get(entry.path.as_str()) {
            errors.push(ValidationError {
                entry: entry_id.clone(),
                field: "path".into(),
                message: format!("duplicate path, shadowed by entry #{}", first + 1),
                suggestion: Some("remove it or change the path".into()),
            });
        } else {
            first_seen.insert(&entry.path, i);
        }

        if let Err(msg) = validate_target_url(&entry.url) {
            errors.push(ValidationError {
                entry: entry_id,
                field: "url".into(),
                message: msg,
                suggestion: None,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, entries: &[PathUrl]) -> String {
    let mut lines = vec![format!("  {} redirects\n", entries.len())];
    let width = entries.iter().map(|e| e.path.len()).max().unwrap_or(0);
    for entry in entries {
        lines.push(format!("  {:<width$}  -> {}", entry.path, entry.url));
    }
    format!("{} is valid\n{}", path, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<PathUrl> {
        pairs.iter().map(|(p, u)| PathUrl::new(*p, *u)).collect()
    }

    #[test]
    fn valid_document_passes() {
        let doc = entries(&[
            ("/google", "https://www.google.com"),
            ("/docs", "/internal/docs"),
        ]);
        assert!(validate(&doc).is_ok());
    }

    #[test]
    fn empty_document_fails() {
        let errors = validate(&[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at least one redirect"));
    }

    #[test]
    fn path_without_slash_suggests_fix() {
        let errors = validate(&entries(&[("yt", "https://youtube.com")])).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.suggestion.as_deref() == Some("did you mean '/yt'?")));
    }

    #[test]
    fn duplicate_points_at_first_entry() {
        let doc = entries(&[
            ("/a", "https://one.example"),
            ("/b", "https://two.example"),
            ("/a", "https://three.example"),
        ]);
        let errors = validate(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].entry, "/a (#3)");
        assert!(errors[0].message.contains("shadowed by entry #1"));
    }

    #[test]
    fn non_http_scheme_fails() {
        let errors = validate(&entries(&[("/f", "ftp://files.example")])).unwrap_err();
        assert!(errors[0].message.contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn garbage_url_fails() {
        let errors = validate(&entries(&[("/x", "not a url")])).unwrap_err();
        assert!(errors[0].message.contains("not a valid URL"));
    }

    #[test]
    fn report_lists_every_entry() {
        let doc = entries(&[("/a", "https://a.example"), ("/bb", "https://b.example")]);
        let report = format_validation_report("redirects.yaml", &doc);
        assert!(report.starts_with("redirects.yaml is valid"));
        assert!(report.contains("2 redirects"));
        assert!(report.contains("/bb  -> https://b.example"));
    }
}
