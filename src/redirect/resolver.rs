//! The [`Resolver`] trait and the in-memory resolvers.
//!
//! [`MapResolver`] answers from a caller-built `HashMap`. [`DocumentResolver`]
//! answers from an ordered list parsed out of a YAML or JSON document and
//! scans it front to back, so the first record for a path wins.

use std::collections::HashMap;

use async_trait::async_trait;

use super::document::{parse_document, DocumentFormat, PathUrl};
use crate::error::RedirectorError;

// async_trait keeps Resolver object safe; the store resolver awaits I/O.
#[async_trait]
pub trait Resolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of mappings known up front, if the source can tell.
    fn entries(&self) -> Option<usize> {
        None
    }

    /// Look up the redirect target for an exact request path.
    async fn resolve(&self, path: &str) -> Result<Option<String>, RedirectorError>;
}

#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    paths: HashMap<String, String>,
}

impl MapResolver {
    #[must_use]
    pub const fn new(paths: HashMap<String, String>) -> Self {
        Self { paths }
    }
}

impl From<HashMap<String, String>> for MapResolver {
    fn from(paths: HashMap<String, String>) -> Self {
        Self::new(paths)
    }
}

#[async_trait]
impl Resolver for MapResolver {
    fn name(&self) -> &'static str {
        "map"
    }

    fn entries(&self) -> Option<usize> {
        Some(self.paths.len())
    }

    async fn resolve(&self, path: &str) -> Result<Option<String>, RedirectorError> {
        Ok(self.paths.get(path).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct DocumentResolver {
    name: &'static str,
    entries: Vec<PathUrl>,
}

impl DocumentResolver {
    #[must_use]
    pub const fn from_entries(name: &'static str, entries: Vec<PathUrl>) -> Self {
        Self { name, entries }
    }

    /// Parse `payload` and keep the records in document order.
    pub fn parse(
        format: DocumentFormat,
        payload: &[u8],
        source_name: &str,
    ) -> Result<Self, RedirectorError> {
        let entries = parse_document(format, payload, source_name)?;
        Ok(Self::from_entries(format.name(), entries))
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml(payload: &[u8]) -> Result<Self, RedirectorError> {
        Self::parse(DocumentFormat::Yaml, payload, "yaml payload")
    }

    #[cfg(feature = "json")]
    pub fn from_json(payload: &[u8]) -> Result<Self, RedirectorError> {
        Self::parse(DocumentFormat::Json, payload, "json payload")
    }

    #[must_use]
    pub fn mappings(&self) -> &[PathUrl] {
        &self.entries
    }

    fn find(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .map(|entry| entry.url.as_str())
    }
}

#[async_trait]
impl Resolver for DocumentResolver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn entries(&self) -> Option<usize> {
        Some(self.entries.len())
    }

    async fn resolve(&self, path: &str) -> Result<Option<String>, RedirectorError> {
        Ok(self.find(path).map(str::to_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(entries: &[(&str, &str)]) -> DocumentResolver {
        DocumentResolver::from_entries(
            "test",
            entries.iter().map(|(p, u)| PathUrl::new(*p, *u)).collect(),
        )
    }

    #[tokio::test]
    async fn map_exact_match_only() {
        let resolver = MapResolver::new(HashMap::from([(
            "/google".to_string(),
            "https://www.google.com".to_string(),
        )]));

        assert_eq!(
            resolver.resolve("/google").await.unwrap().as_deref(),
            Some("https://www.google.com")
        );
        assert!(resolver.resolve("/google/").await.unwrap().is_none());
        assert!(resolver.resolve("/Google").await.unwrap().is_none());
        assert_eq!(resolver.entries(), Some(1));
    }

    #[tokio::test]
    async fn document_first_duplicate_wins() {
        let resolver = doc(&[
            ("/dup", "https://first.example"),
            ("/other", "https://other.example"),
            ("/dup", "https://second.example"),
        ]);

        assert_eq!(
            resolver.resolve("/dup").await.unwrap().as_deref(),
            Some("https://first.example")
        );
    }

    #[tokio::test]
    async fn document_miss_is_none() {
        let resolver = doc(&[("/a", "https://a.example")]);
        assert!(resolver.resolve("/b").await.unwrap().is_none());
        assert!(resolver.resolve("").await.unwrap().is_none());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parsed_resolver_is_named_after_format() {
        let resolver = DocumentResolver::from_yaml(b"- path: /a\n  url: https://a.example\n").unwrap();
        assert_eq!(resolver.name(), "yaml");
        assert_eq!(resolver.mappings().len(), 1);
    }
}
