use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 9000;
const DEFAULT_SWEEP_RESOLUTION_MS: u64 = 1000;

/// Server settings, read from `TINYCACHE_*` environment variables.
///
/// A port given as the first command-line argument wins over `TINYCACHE_PORT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub sweep_resolution: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), std::env::args().nth(1))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>, port_arg: Option<String>) -> Result<Self> {
        let host = lookup("TINYCACHE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match port_arg.or_else(|| lookup("TINYCACHE_PORT")) {
            Some(port) => port
                .parse()
                .with_context(|| format!("Expected a server port, got {:?}", port))?,
            None => DEFAULT_PORT,
        };

        let sweep_ms = match lookup("TINYCACHE_SWEEP_RESOLUTION_MS") {
            Some(ms) => ms
                .parse()
                .with_context(|| format!("Expected sweep resolution in milliseconds, got {:?}", ms))?,
            None => DEFAULT_SWEEP_RESOLUTION_MS,
        };

        Ok(Self {
            host,
            port,
            sweep_resolution: Duration::from_millis(sweep_ms),
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup_in(&[]), None).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.sweep_resolution, Duration::from_secs(1));
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(
            lookup_in(&[
                ("TINYCACHE_HOST", "0.0.0.0"),
                ("TINYCACHE_PORT", "8080"),
                ("TINYCACHE_SWEEP_RESOLUTION_MS", "250"),
            ]),
            None,
        )
        .unwrap();

        assert_eq!(config.addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.sweep_resolution, Duration::from_millis(250));
    }

    #[test]
    fn test_port_argument_wins() {
        let config = ServerConfig::from_lookup(
            lookup_in(&[("TINYCACHE_PORT", "8080")]),
            Some("7000".to_string()),
        )
        .unwrap();
        assert_eq!(config.port, 7000);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup_in(&[]), Some("http".to_string())).unwrap_err();
        assert!(err.to_string().contains("Expected a server port"));
    }

    #[test]
    fn test_invalid_sweep_resolution() {
        let result = ServerConfig::from_lookup(
            lookup_in(&[("TINYCACHE_SWEEP_RESOLUTION_MS", "fast")]),
            None,
        );
        assert!(result.is_err());
    }
}
