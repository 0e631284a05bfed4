//! Shared helpers for API contract tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use phonebook_api::{AppState, build_router};
use phonebook_core::{ContactService, ContactStore, MemoryContactStore, ServerConfig};

/// A running server and the base URL of its API
pub struct TestServer {
    pub addr: SocketAddr,
    pub base_url: String,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve the API over `store` on an ephemeral port
pub async fn spawn_with_store(store: Arc<dyn ContactStore>) -> TestServer {
    let config = ServerConfig::default();
    let state = AppState::new(ContactService::new(store));
    let router = build_router(state, &config).expect("router builds");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server runs");
    });

    TestServer {
        addr,
        base_url: format!("http://{}{}", addr, config.api_prefix),
    }
}

/// Serve the API over a fresh memory store
pub async fn spawn_app() -> TestServer {
    spawn_with_store(Arc::new(MemoryContactStore::new())).await
}
