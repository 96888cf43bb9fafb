//! Configuration types for the interceptor runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Replay client settings (connection pool, timeouts, TLS)
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.replay.request_timeout_secs == 0 {
            anyhow::bail!("replay.request_timeout_secs must be greater than zero");
        }
        if self.replay.connect_timeout_secs == 0 {
            anyhow::bail!("replay.connect_timeout_secs must be greater than zero");
        }
        if self.replay.connect_timeout_secs > self.replay.request_timeout_secs {
            anyhow::bail!(
                "replay.connect_timeout_secs ({}) must not exceed replay.request_timeout_secs ({})",
                self.replay.connect_timeout_secs,
                self.replay.request_timeout_secs
            );
        }
        Ok(())
    }
}

/// Connection pool and timeout settings for the upstream replay client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayConfig {
    #[serde(default = "default_pool_max_idle_per_host")]
    pub max_idle_per_host: usize,

    #[serde(default = "default_pool_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_keepalive_timeout")]
    pub keepalive_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Upper bound on a whole replay attempt; expiry is treated as a
    /// failure with no payload.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Skip TLS certificate verification (for self-signed certs in dev/test)
    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: default_pool_max_idle_per_host(),
            idle_timeout_secs: default_pool_idle_timeout(),
            keepalive_timeout_secs: default_keepalive_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            tls_skip_verify: false,
        }
    }
}

fn default_pool_max_idle_per_host() -> usize {
    100
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_keepalive_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.replay.max_idle_per_host, 100);
        assert_eq!(config.replay.connect_timeout_secs, 5);
        assert_eq!(config.replay.request_timeout_secs, 30);
        assert!(!config.replay.tls_skip_verify);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "replay:\n  request_timeout_secs: 10\n  tls_skip_verify: true\n"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.replay.request_timeout_secs, 10);
        assert!(config.replay.tls_skip_verify);
        // Unspecified fields keep their defaults
        assert_eq!(config.replay.connect_timeout_secs, 5);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.replay.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_connect_exceeding_request_timeout() {
        let mut config = Config::default();
        config.replay.connect_timeout_secs = 60;
        config.replay.request_timeout_secs = 10;
        assert!(config.validate().is_err());
    }
}
