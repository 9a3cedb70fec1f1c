//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use wiremock::MockServer;
use zkvm_mcp_server::{McpHandler, ProofForwarder};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

pub fn package_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/package", server.uri())).unwrap()
}

pub fn forwarder_for(server: &MockServer) -> ProofForwarder {
    ProofForwarder::new(package_url(server), TEST_TIMEOUT)
}

pub fn handler_for(server: &MockServer) -> Arc<McpHandler> {
    Arc::new(McpHandler::new(forwarder_for(server)))
}

/// A localhost URL nothing is listening on
pub fn refused_url() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}/package", port)).unwrap()
}
