/// Proof request forwarding
/// Sends a code snippet to the zkVM proof server and turns whatever happens into a readable string

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Url;
use tokio::task::JoinError;

use crate::config::ServerConfig;

pub const SUCCESS_PREFIX: &str = "Successfully created zkVM proof. Response: ";
pub const ERROR_PREFIX: &str = "Error creating zkVM proof: ";
pub const UNEXPECTED_PREFIX: &str = "Unexpected error creating zkVM proof: ";

/// Result of a single proof request, classified in order:
/// HTTP status first, then transport, then anything else
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofOutcome {
    /// 2xx response; body passed through verbatim
    Created(String),
    /// Well-formed response with a non-success status
    Rejected { status: u16, body: String },
    /// The exchange could not complete (connect, DNS, TLS, timeout, body read)
    Transport(String),
    /// Anything else, including a panic while forwarding
    Unexpected(String),
}

impl ProofOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProofOutcome::Created(_))
    }
}

impl fmt::Display for ProofOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofOutcome::Created(body) => write!(f, "{}{}", SUCCESS_PREFIX, body),
            ProofOutcome::Rejected { status, body } => {
                write!(f, "{}HTTP {} - {}", ERROR_PREFIX, status, body)
            }
            ProofOutcome::Transport(detail) => write!(f, "{}{}", ERROR_PREFIX, detail),
            ProofOutcome::Unexpected(detail) => write!(f, "{}{}", UNEXPECTED_PREFIX, detail),
        }
    }
}

/// Forwards snippets to a fixed proof endpoint with a bounded wait.
/// Holds no connection state: every request gets its own client.
#[derive(Debug, Clone)]
pub struct ProofForwarder {
    endpoint: Url,
    timeout: Duration,
}

impl ProofForwarder {
    pub fn new(endpoint: Url, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.zkvm_endpoint.clone(), config.request_timeout)
    }

    /// Forward a snippet and return the caller-facing message.
    /// Never fails: a panic in the request task is reported as an unexpected error.
    /// The request runs in its own task and is not cancelled if the caller goes away;
    /// the configured timeout is the only thing that cuts it short.
    pub async fn forward(&self, snippet: &str) -> String {
        let forwarder = self.clone();
        let snippet = snippet.to_owned();

        let joined = tokio::spawn(async move { forwarder.submit(&snippet).await }).await;
        classify_join(joined).to_string()
    }

    /// Perform the HTTP exchange and classify the result
    pub async fn submit(&self, snippet: &str) -> ProofOutcome {
        tracing::info!(
            "[CREATE-ZKVM-PROOF] Sending snippet ({} bytes) to {}",
            snippet.len(),
            self.endpoint
        );

        // 3xx must surface as an HTTP error, so redirects are not followed
        let client = match reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(Policy::none())
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                tracing::error!("[CREATE-ZKVM-PROOF] Could not build HTTP client: {}", e);
                return ProofOutcome::Unexpected(describe(&e));
            }
        };

        let response = match client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/plain")
            .body(snippet.to_owned())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                tracing::error!("[CREATE-ZKVM-PROOF] Could not build request: {}", e);
                return ProofOutcome::Unexpected(describe(&e));
            }
            Err(e) => {
                tracing::warn!(
                    "[CREATE-ZKVM-PROOF] Request failed (timeout={}): {}",
                    e.is_timeout(),
                    e
                );
                return ProofOutcome::Transport(describe(&e));
            }
        };

        let status = response.status();
        let outcome = match response.text().await {
            Ok(body) if status.is_success() => ProofOutcome::Created(body),
            Ok(body) => ProofOutcome::Rejected {
                status: status.as_u16(),
                body,
            },
            Err(e) => ProofOutcome::Transport(describe(&e)),
        };

        if outcome.is_success() {
            tracing::info!(
                "[CREATE-ZKVM-PROOF] ✓ Proof server accepted snippet (HTTP {})",
                status
            );
        } else {
            tracing::warn!("[CREATE-ZKVM-PROOF] Proof request failed (HTTP {})", status);
        }

        outcome
    }
}

/// A forwarding task that panicked or was cancelled still yields an outcome
fn classify_join(joined: Result<ProofOutcome, JoinError>) -> ProofOutcome {
    match joined {
        Ok(outcome) => outcome,
        Err(join_error) => {
            tracing::error!("[CREATE-ZKVM-PROOF] Forwarding task failed: {}", join_error);
            ProofOutcome::Unexpected(join_error.to_string())
        }
    }
}

/// Flatten an error and its sources into one line
fn describe(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
