//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `SPACEGOODS_HOST` - Bind address (default: 127.0.0.1)
//! - `SPACEGOODS_PORT` - Listen port (default: 3000)
//! - `SPACEGOODS_BASE_URL` - Public URL for the storefront (default: http://localhost:3000)
//! - `SPACEGOODS_WHATSAPP_NUMBER` - Number orders are handed off to (default: 212708897624)
//! - `SPACEGOODS_MAX_PLANETS` - Planet creation cap (default: 100)
//! - `SPACEGOODS_CLAIM_MONTHS` - Planet claim length in months (default: 1)
//! - `SPACEGOODS_ADMIN_TOKEN` - Bearer token for the claim reset endpoint
//!   (min 32 chars, high entropy); the endpoint is open when unset
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::cart::DEFAULT_WHATSAPP_NUMBER;
use crate::planets::{DEFAULT_CLAIM_MONTHS, DEFAULT_MAX_PLANETS};

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Checkout handoff settings
    pub checkout: CheckoutConfig,
    /// Planet promotion settings
    pub planets: PlanetsConfig,
    /// Bearer token guarding admin endpoints
    pub admin_token: Option<SecretString>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Checkout handoff configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// WhatsApp number orders are sent to, digits only
    pub whatsapp_number: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_owned(),
        }
    }
}

/// Planet promotion configuration.
#[derive(Debug, Clone, Copy)]
pub struct PlanetsConfig {
    /// Maximum number of planets
    pub max_planets: usize,
    /// Claim length in calendar months
    pub claim_months: u32,
}

impl Default for PlanetsConfig {
    fn default() -> Self {
        Self {
            max_planets: DEFAULT_MAX_PLANETS,
            claim_months: DEFAULT_CLAIM_MONTHS,
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_owned(),
            checkout: CheckoutConfig::default(),
            planets: PlanetsConfig::default(),
            admin_token: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is invalid or if the admin token
    /// fails validation (length, placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or_default::<IpAddr>("SPACEGOODS_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("SPACEGOODS_PORT", "3000")?;
        let base_url = get_env_or_default("SPACEGOODS_BASE_URL", "http://localhost:3000");

        let checkout = CheckoutConfig::from_env()?;
        let planets = PlanetsConfig::from_env()?;

        let admin_token = get_optional_env("SPACEGOODS_ADMIN_TOKEN")
            .map(|token| {
                validate_secret_strength(&token, "SPACEGOODS_ADMIN_TOKEN")?;
                let token = SecretString::from(token);
                validate_token_length(&token, "SPACEGOODS_ADMIN_TOKEN")?;
                Ok::<_, ConfigError>(token)
            })
            .transpose()?;

        Ok(Self {
            host,
            port,
            base_url,
            checkout,
            planets,
            admin_token,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked secure.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let whatsapp_number =
            get_env_or_default("SPACEGOODS_WHATSAPP_NUMBER", DEFAULT_WHATSAPP_NUMBER);
        validate_phone_number(&whatsapp_number, "SPACEGOODS_WHATSAPP_NUMBER")?;
        Ok(Self { whatsapp_number })
    }
}

impl PlanetsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            max_planets: parse_env_or_default(
                "SPACEGOODS_MAX_PLANETS",
                &DEFAULT_MAX_PLANETS.to_string(),
            )?,
            claim_months: parse_env_or_default(
                "SPACEGOODS_CLAIM_MONTHS",
                &DEFAULT_CLAIM_MONTHS.to_string(),
            )?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a phone number is digits only, as `wa.me` links require.
fn validate_phone_number(number: &str, var_name: &str) -> Result<(), ConfigError> {
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must contain digits only (country code first, no '+')".to_string(),
        ));
    }
    Ok(())
}

/// Validate that a token meets minimum length requirements.
fn validate_token_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_TOKEN_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}
