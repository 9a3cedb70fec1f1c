/// zkVM MCP server library
/// Exposes a single create_zkvm_proof tool that forwards Rust snippets to a zkVM proof server

pub mod config;
pub mod forward;
pub mod http;
pub mod mcp;
pub mod stdio;
pub mod tools;

pub use config::{ServerConfig, Transport};
pub use forward::{ProofForwarder, ProofOutcome};
pub use mcp::{McpError, McpHandler, McpRequest, McpResponse};
