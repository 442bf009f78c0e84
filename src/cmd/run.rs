//! `redirector run` — start the redirect server.
//!
//! Opens the configured sources, nests them into a redirect chain
//! (stores → JSON → YAML → inline map → 404), and serves it with Axum
//! until Ctrl+C / SIGTERM. Stores are opened here and closed here; the
//! resolvers only ever read from them.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::error::RedirectorError;
use crate::logging;
use crate::redirect::{DocumentFormat, DocumentResolver, MapResolver};
use crate::server::{self, AppState, RedirectChain, Stats};

const AUTO_DETECT: [&str; 3] = ["redirects.yaml", "redirects.yml", "redirects.json"];

pub async fn execute(args: RunArgs) -> Result<(), RedirectorError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let stats = Arc::new(Stats::new());
    let stores = OpenStores::open(&args).await?;
    let chain = build_chain(&args, &stores, Arc::clone(&stats)).await?;

    if chain.is_empty() {
        return Err(RedirectorError::NoSource {
            hint: "Provide --yaml-file, --json-file, --map, or a store flag.\n  \
                   Run 'redirector init' to create ./redirects.yaml."
                .into(),
        });
    }

    let (redirects, sources) = chain.finish();
    let source_count = sources.len();

    let state = Arc::new(AppState {
        sources,
        start_time: Instant::now(),
        stats,
    });

    let router = server::build_router(state, redirects, args.max_body);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, sources = source_count, "redirector started");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    stores.close().await;

    tracing::info!("redirector stopped");
    Ok(())
}

/// Store handles owned by the `run` command for the lifetime of the server.
#[derive(Default)]
struct OpenStores {
    #[cfg(feature = "sled")]
    sled: Option<(PathBuf, crate::store::sled_store::SledStore)>,
    #[cfg(feature = "sqlite")]
    sqlite: Option<(PathBuf, Arc<crate::store::sqlite::SqliteStore>)>,
}

impl OpenStores {
    #[allow(clippy::unused_async, unused_variables)]
    async fn open(args: &RunArgs) -> Result<Self, RedirectorError> {
        #[allow(unused_mut)]
        let mut stores = Self::default();

        #[cfg(feature = "sled")]
        if let Some(ref path) = args.sled_path {
            let store = crate::store::sled_store::SledStore::open(path)?;
            stores.sled = Some((path.clone(), store));
        }

        #[cfg(feature = "sqlite")]
        if let Some(ref path) = args.sqlite_path {
            let store = crate::store::sqlite::SqliteStore::open(path).await?;
            stores.sqlite = Some((path.clone(), Arc::new(store)));
        }

        Ok(stores)
    }

    #[allow(clippy::unused_async)]
    async fn close(self) {
        #[cfg(feature = "sqlite")]
        if let Some((path, store)) = self.sqlite {
            store.close().await;
            tracing::debug!(path = %path.display(), "sqlite store closed");
        }

        #[cfg(feature = "sled")]
        if let Some((path, store)) = self.sled {
            drop(store);
            tracing::debug!(path = %path.display(), "sled store closed");
        }
    }
}

#[allow(unused_variables)]
async fn build_chain(
    args: &RunArgs,
    stores: &OpenStores,
    stats: Arc<Stats>,
) -> Result<RedirectChain, RedirectorError> {
    let mut chain = RedirectChain::new(stats, args.on_store_error.to_policy());

    let map = parse_map_entries(&args.map)?;
    if !map.is_empty() {
        chain.push("--map", MapResolver::new(map));
    }

    for (format, path) in document_sources(args).await {
        let resolver = load_document(format, &path).await?;
        chain.push(path.display().to_string(), resolver);
    }

    #[cfg(feature = "sqlite")]
    if let Some((ref path, ref store)) = stores.sqlite {
        let store: Arc<dyn crate::store::BucketStore> = store.clone();
        chain.push(
            path.display().to_string(),
            crate::store::StoreResolver::new(store),
        );
    }

    #[cfg(feature = "sled")]
    if let Some((ref path, ref store)) = stores.sled {
        chain.push(
            path.display().to_string(),
            crate::store::StoreResolver::new(Arc::new(store.clone())),
        );
    }

    Ok(chain)
}

/// YAML then JSON, so JSON ends up consulted first. Auto-detects a
/// document in the working directory when no source flag was given.
async fn document_sources(args: &RunArgs) -> Vec<(DocumentFormat, PathBuf)> {
    let mut documents = Vec::new();
    if let Some(ref path) = args.yaml_file {
        documents.push((DocumentFormat::Yaml, path.clone()));
    }
    if let Some(ref path) = args.json_file {
        documents.push((DocumentFormat::Json, path.clone()));
    }

    if args.has_explicit_source() {
        return documents;
    }

    for name in &AUTO_DETECT {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if let Ok(format) = DocumentFormat::from_extension(ext) {
                tracing::info!(path = %path.display(), "auto-detected redirect document");
                documents.push((format, path));
                break;
            }
        }
    }

    documents
}

async fn load_document(
    format: DocumentFormat,
    path: &Path,
) -> Result<DocumentResolver, RedirectorError> {
    let payload = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RedirectorError::SourceFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            RedirectorError::Io(e)
        }
    })?;

    DocumentResolver::parse(format, &payload, &path.display().to_string())
}

/// Parse `PATH=URL` pairs. The first pair for a path wins, as in documents.
pub fn parse_map_entries(entries: &[String]) -> Result<HashMap<String, String>, RedirectorError> {
    let mut paths = HashMap::with_capacity(entries.len());
    for entry in entries {
        match entry.split_once('=') {
            Some((path, url)) if !path.is_empty() && !url.is_empty() => {
                paths
                    .entry(path.to_string())
                    .or_insert_with(|| url.to_string());
            }
            _ => return Err(RedirectorError::InvalidMapEntry(entry.clone())),
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn map_entries_split_on_first_equals() {
        let map =
            parse_map_entries(&strings(&["/q=https://example.com/?a=b"])).unwrap();
        assert_eq!(map["/q"], "https://example.com/?a=b");
    }

    #[test]
    fn map_entries_first_wins() {
        let map = parse_map_entries(&strings(&[
            "/a=https://first.example",
            "/a=https://second.example",
        ]))
        .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["/a"], "https://first.example");
    }

    #[test]
    fn map_entry_without_url_is_rejected() {
        for bad in ["/a", "/a=", "=https://x.example"] {
            let err = parse_map_entries(&strings(&[bad])).unwrap_err();
            assert!(matches!(err, RedirectorError::InvalidMapEntry(ref e) if e == bad));
        }
    }

    #[tokio::test]
    async fn missing_document_is_reported_by_path() {
        let err = load_document(DocumentFormat::Yaml, Path::new("does/not/exist.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, RedirectorError::SourceFileNotFound { .. }));
    }
}
