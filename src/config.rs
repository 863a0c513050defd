//! Server configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

const PORT_ENV: &str = "PORT";
const HOST_ENV: &str = "HOST";
const PUBLIC_DIR_ENV: &str = "OPENCLINIC_PUBLIC_DIR";
const UPSTREAM_TIMEOUT_ENV: &str = "OPENCLINIC_UPSTREAM_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub upstream_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_or_default<T: std::str::FromStr>(var: &str, value: Option<String>, default: T) -> T {
    let Some(raw) = non_empty(value) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(var, value = %raw, "Ignoring invalid environment value; using default");
            default
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let timeout_secs = parse_or_default(
            UPSTREAM_TIMEOUT_ENV,
            get(UPSTREAM_TIMEOUT_ENV),
            DEFAULT_UPSTREAM_TIMEOUT_SECS,
        );

        Self {
            host: non_empty(get(HOST_ENV)).unwrap_or(defaults.host),
            port: parse_or_default(PORT_ENV, get(PORT_ENV), defaults.port),
            public_dir: non_empty(get(PUBLIC_DIR_ENV))
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            upstream_timeout: if timeout_secs == 0 {
                defaults.upstream_timeout
            } else {
                Duration::from_secs(timeout_secs)
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let cfg = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, ServerConfig::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_port_host_and_paths() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("PORT", "3100"),
            ("HOST", "127.0.0.1"),
            ("OPENCLINIC_PUBLIC_DIR", "/srv/www"),
            ("OPENCLINIC_UPSTREAM_TIMEOUT_SECS", "7"),
        ]));
        assert_eq!(cfg.port, 3100);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3100");
        assert_eq!(cfg.public_dir, PathBuf::from("/srv/www"));
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(7));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("PORT", "eighty"),
            ("OPENCLINIC_UPSTREAM_TIMEOUT_SECS", "0"),
            ("HOST", "   "),
        ]));
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(
            cfg.upstream_timeout,
            Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS)
        );
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        let cfg = ServerConfig {
            host: "::1".into(),
            ..ServerConfig::default()
        };
        assert_eq!(cfg.bind_addr(), "[::1]:8000");
    }
}
