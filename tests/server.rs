//! Integration tests for the HTTP server, health endpoint, and graceful shutdown.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use redirector::health::HealthResponse;
use redirector::redirect::{DocumentResolver, MapResolver, StoreErrorPolicy};
use redirector::server::{self, AppState, RedirectChain, Stats};

const YAML: &[u8] = b"- path: /yt\n  url: https://youtube.com\n- path: /google\n  url: https://shadowed.example\n";

fn test_chain(stats: Arc<Stats>) -> RedirectChain {
    let mut chain = RedirectChain::new(stats, StoreErrorPolicy::Fail);
    chain.push(
        "--map",
        MapResolver::new(HashMap::from([(
            "/google".to_string(),
            "https://www.google.com".to_string(),
        )])),
    );
    chain.push("test.yaml", DocumentResolver::from_yaml(YAML).unwrap());
    chain
}

async fn start_test_server() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let stats = Arc::new(Stats::new());
    let (redirects, sources) = test_chain(Arc::clone(&stats)).finish();
    let state = Arc::new(AppState {
        sources,
        start_time: Instant::now(),
        stats,
    });

    let router = server::build_router(state, redirects, 65_536);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/health");
    let resp = client().get(&url).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.sources.len(), 2);
    assert_eq!(health.sources[0].origin, "test.yaml");
    assert_eq!(health.sources[0].name, "yaml");
    assert_eq!(health.sources[0].entries, Some(2));
    assert_eq!(health.sources[1].origin, "--map");
    assert_eq!(health.stats.redirects, 0);
    assert_eq!(health.stats.not_found, 0);
    assert_eq!(health.stats.errors, 0);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_version_matches_crate() {
    let (addr, shutdown) = start_test_server().await;

    let url = format!("http://{addr}/health");
    let health: HealthResponse = client().get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn matched_path_redirects() {
    let (addr, shutdown) = start_test_server().await;

    let resp = client()
        .get(format!("http://{addr}/yt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers()["location"], "https://youtube.com");
    assert!(resp.headers().contains_key("x-correlation-id"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn outer_source_shadows_inner() {
    let (addr, shutdown) = start_test_server().await;

    // /google is in both; the document is consulted before the map
    let resp = client()
        .get(format!("http://{addr}/google"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["location"], "https://shadowed.example");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn redirect_ignores_method_and_body() {
    let (addr, shutdown) = start_test_server().await;

    let resp = client()
        .post(format!("http://{addr}/yt"))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 302);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unmatched_path_returns_404_and_is_counted() {
    let (addr, shutdown) = start_test_server().await;
    let client = client();

    let resp = client
        .get(format!("http://{addr}/nonexistent"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let _ = client.get(format!("http://{addr}/yt")).send().await.unwrap();

    let health: HealthResponse = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.stats.not_found, 1);
    assert_eq!(health.stats.redirects, 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, shutdown) = start_test_server().await;

    // Verify server is running
    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    // Send shutdown
    let _ = shutdown.send(());

    // Give it a moment to shut down
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    // Server should no longer accept connections
    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
