//! Stripe webhook configuration

use serde::Deserialize;
use std::fmt;

use super::error::ValidationError;

/// Stripe webhook configuration
#[derive(Clone, Deserialize)]
pub struct StripeConfig {
    /// Webhook signing secret (`whsec_...`) from the Stripe dashboard
    pub webhook_secret: String,

    /// Maximum allowed distance between the signature timestamp and now
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,
}

impl StripeConfig {
    /// Validate Stripe configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE__WEBHOOK_SECRET"));
        }
        if !self.webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if !(1..=3600).contains(&self.signature_tolerance_secs) {
            return Err(ValidationError::InvalidSignatureTolerance);
        }
        Ok(())
    }
}

impl fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StripeConfig")
            .field("webhook_secret", &"[REDACTED]")
            .field("signature_tolerance_secs", &self.signature_tolerance_secs)
            .finish()
    }
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            signature_tolerance_secs: default_signature_tolerance(),
        }
    }
}

fn default_signature_tolerance() -> i64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> StripeConfig {
        StripeConfig {
            webhook_secret: "whsec_abc123".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(StripeConfig::default().signature_tolerance_secs, 300);
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_secret() {
        let config = StripeConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STRIPE__WEBHOOK_SECRET"))
        );
    }

    #[test]
    fn test_validation_invalid_secret_prefix() {
        let config = StripeConfig {
            webhook_secret: "sk_test_abc".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        );
    }

    #[test]
    fn test_validation_tolerance_bounds() {
        let mut config = valid();
        config.signature_tolerance_secs = 0;
        assert!(config.validate().is_err());

        config.signature_tolerance_secs = 3601;
        assert!(config.validate().is_err());

        config.signature_tolerance_secs = 3600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", valid());
        assert!(!rendered.contains("whsec_abc123"));
    }
}
