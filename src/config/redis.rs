//! Redis settings for the `redis` idempotency backend

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::idempotency::DEFAULT_KEY_PREFIX;

/// Where tombstones live when Redis enforces their expiry.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,

    /// Per-command bound; a slower answer counts as the store being unavailable
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Tombstone keys are `<key_prefix><event id>`
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl RedisConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !["redis://", "rediss://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ValidationError::InvalidRedisUrl);
        }
        if self.key_prefix.is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__KEY_PREFIX"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidRedisTimeout);
        }
        Ok(())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout(),
            key_prefix: default_key_prefix(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> RedisConfig {
        RedisConfig {
            url: "redis://localhost:6379".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_the_adapter() {
        let config = local();

        assert_eq!(config.key_prefix, "processed_event:");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn url_is_required_and_must_be_redis() {
        assert_eq!(
            RedisConfig::default().validate(),
            Err(ValidationError::MissingRequired("REDIS__URL"))
        );

        let http = RedisConfig {
            url: "http://localhost:6379".to_string(),
            ..Default::default()
        };
        assert_eq!(http.validate(), Err(ValidationError::InvalidRedisUrl));

        let tls = RedisConfig {
            url: "rediss://cache.internal:6380".to_string(),
            ..Default::default()
        };
        assert!(tls.validate().is_ok());
    }

    #[test]
    fn empty_prefix_is_rejected() {
        let config = RedisConfig {
            key_prefix: String::new(),
            ..local()
        };

        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("REDIS__KEY_PREFIX"))
        );
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = RedisConfig {
            timeout_secs: 0,
            ..local()
        };

        assert_eq!(config.validate(), Err(ValidationError::InvalidRedisTimeout));
    }
}
