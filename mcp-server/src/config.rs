/// Server configuration
/// Read once at startup from the environment (optionally seeded from a .env file)

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Url;

/// Default proof server endpoint (local Nexus zkVM package server)
pub const DEFAULT_ZKVM_API_ENDPOINT: &str = "http://127.0.0.1:8080/package";

/// Proof generation can be slow, but the host must never block indefinitely
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_HTTP_PORT: u16 = 8090;

/// How the MCP host talks to this server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
    /// JSON-RPC over `POST /mcp` plus REST tool endpoints
    Http,
}

impl std::str::FromStr for Transport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stdio" => Ok(Transport::Stdio),
            "http" => Ok(Transport::Http),
            other => Err(anyhow!("unknown transport '{}', expected 'stdio' or 'http'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub zkvm_endpoint: Url,
    pub request_timeout: Duration,
    pub transport: Transport,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup; unset variables fall back to defaults
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let zkvm_endpoint = match lookup("ZKVM_API_ENDPOINT") {
            Some(raw) => Url::parse(raw.trim())
                .with_context(|| format!("ZKVM_API_ENDPOINT is not a valid URL: {}", raw))?,
            None => Url::parse(DEFAULT_ZKVM_API_ENDPOINT)?,
        };

        let timeout_secs = match lookup("ZKVM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| {
                    format!("ZKVM_TIMEOUT_SECS must be a whole number of seconds: {}", raw)
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            return Err(anyhow!("ZKVM_TIMEOUT_SECS must be greater than zero"));
        }

        let transport = match lookup("MCP_TRANSPORT") {
            Some(raw) => raw.parse::<Transport>().context("invalid MCP_TRANSPORT")?,
            None => Transport::Stdio,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number: {}", raw))?,
            None => DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            zkvm_endpoint,
            request_timeout: Duration::from_secs(timeout_secs),
            transport,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ServerConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.zkvm_endpoint.as_str(), DEFAULT_ZKVM_API_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.transport, Transport::Stdio);
        assert_eq!(config.port, DEFAULT_HTTP_PORT);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_vars(vars(&[
            ("ZKVM_API_ENDPOINT", "http://10.0.0.5:9000/package"),
            ("ZKVM_TIMEOUT_SECS", "5"),
            ("MCP_TRANSPORT", "HTTP"),
            ("PORT", "3005"),
        ]))
        .unwrap();
        assert_eq!(config.zkvm_endpoint.as_str(), "http://10.0.0.5:9000/package");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.port, 3005);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ServerConfig::from_vars(vars(&[("ZKVM_API_ENDPOINT", "not a url")])).is_err());
        assert!(ServerConfig::from_vars(vars(&[("ZKVM_TIMEOUT_SECS", "0")])).is_err());
        assert!(ServerConfig::from_vars(vars(&[("ZKVM_TIMEOUT_SECS", "soon")])).is_err());
        assert!(ServerConfig::from_vars(vars(&[("MCP_TRANSPORT", "websocket")])).is_err());
        assert!(ServerConfig::from_vars(vars(&[("PORT", "99999")])).is_err());
    }
}
