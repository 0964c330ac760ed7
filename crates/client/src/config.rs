//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `KIRANA_API_URL` - Base URL of the backend REST API
//!
//! ## Optional
//! - `KIRANA_PUSH_URL` - Push-channel endpoint (default: `<api-url>/events`)
//! - `KIRANA_AUTH_TOKEN` - Bearer token for an already-authenticated session
//! - `KIRANA_DATA_DIR` - Directory for locally persisted state
//!   (default: `.kirana`)
//! - `KIRANA_FREE_DELIVERY_THRESHOLD` - Subtotal at which delivery is free
//!   (default: 500)
//! - `KIRANA_DELIVERY_FEE` - Flat delivery fee below the threshold
//!   (default: 30)
//! - `KIRANA_TAX_RATE` - Tax rate applied to the subtotal (default: 0.05)

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Pricing rules applied to cart contents.
///
/// The tax rate is deliberately configuration, not a constant: the product
/// team has not yet settled on a single authoritative rate, so call sites
/// must be explicit about which one they are using.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingConfig {
    /// Subtotal at or above which delivery is free.
    pub free_delivery_threshold: Decimal,
    /// Flat delivery fee below the threshold.
    pub delivery_fee: Decimal,
    /// Tax rate applied to the subtotal (e.g., 0.05 for 5%).
    pub tax_rate: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_delivery_threshold: Decimal::from(500),
            delivery_fee: Decimal::from(30),
            // 5% per the cart computation path; an 18% figure exists in a
            // display-only summary and is intentionally not wired here.
            tax_rate: Decimal::new(5, 2),
        }
    }
}

/// Kirana client configuration.
///
/// Implements `Debug` manually to redact the auth token.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the backend REST API.
    pub api_url: Url,
    /// Push-channel endpoint.
    pub push_url: Url,
    /// Bearer token, when the session is already authenticated.
    pub auth_token: Option<SecretString>,
    /// Directory for locally persisted state.
    pub data_dir: PathBuf,
    /// Pricing rules.
    pub pricing: PricingConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("push_url", &self.push_url.as_str())
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("data_dir", &self.data_dir)
            .field("pricing", &self.pricing)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = required_url("KIRANA_API_URL")?;

        let push_url = match std::env::var("KIRANA_PUSH_URL") {
            Ok(raw) => parse_url("KIRANA_PUSH_URL", &raw)?,
            Err(_) => api_url.join("events").map_err(|e| {
                ConfigError::InvalidEnvVar("KIRANA_API_URL".to_string(), e.to_string())
            })?,
        };

        let auth_token = std::env::var("KIRANA_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(SecretString::from);

        let data_dir = std::env::var("KIRANA_DATA_DIR")
            .map_or_else(|_| PathBuf::from(".kirana"), PathBuf::from);

        let defaults = PricingConfig::default();
        let pricing = PricingConfig {
            free_delivery_threshold: optional_decimal(
                "KIRANA_FREE_DELIVERY_THRESHOLD",
                defaults.free_delivery_threshold,
            )?,
            delivery_fee: optional_decimal("KIRANA_DELIVERY_FEE", defaults.delivery_fee)?,
            tax_rate: optional_decimal("KIRANA_TAX_RATE", defaults.tax_rate)?,
        };

        Ok(Self {
            api_url,
            push_url,
            auth_token,
            data_dir,
            pricing,
        })
    }
}

fn required_url(name: &str) -> Result<Url, ConfigError> {
    let raw =
        std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))?;
    parse_url(name, &raw)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

fn optional_decimal(name: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => Decimal::from_str(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
