//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `COURSES` prefix and
//! nested values are separated by a double underscore.
//!
//! # Example
//!
//! ```no_run
//! use courses_backend::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod email;
mod error;
mod fulfillment;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use fulfillment::FulfillmentConfig;
pub use payment::{PaymentConfig, DEFAULT_CHECKOUT_URL};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Payment configuration (Fondy merchant)
    pub payment: PaymentConfig,

    /// Email configuration (Resend)
    pub email: EmailConfig,

    /// Deferred fulfillment worker
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COURSES` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `COURSES__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COURSES__PAYMENT__MERCHANT_ID=1396424` -> `payment.merchant_id = 1396424`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURSES")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate(&self.server.environment)?;
        self.email.validate()?;
        self.fulfillment.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "COURSES__DATABASE__URL",
        "COURSES__PAYMENT__MERCHANT_ID",
        "COURSES__PAYMENT__MERCHANT_PASSWORD",
        "COURSES__PAYMENT__CALLBACK_URL",
        "COURSES__EMAIL__RESEND_API_KEY",
        "COURSES__SERVER__PORT",
        "COURSES__SERVER__ENVIRONMENT",
        "COURSES__FULFILLMENT__BATCH_SIZE",
        "COURSES__FULFILLMENT__MAX_ATTEMPTS",
    ];

    fn set_minimal_env() {
        env::set_var("COURSES__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("COURSES__PAYMENT__MERCHANT_ID", "1396424");
        env::set_var("COURSES__PAYMENT__MERCHANT_PASSWORD", "test");
        env::set_var(
            "COURSES__PAYMENT__CALLBACK_URL",
            "https://api.example.com/api/v1/callback/fondy",
        );
        env::set_var("COURSES__EMAIL__RESEND_API_KEY", "re_xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.expect("config loads");
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.payment.merchant_id, 1396424);
        assert_eq!(config.payment.merchant_password.expose_secret(), "test");
        assert_eq!(config.payment.checkout_url, DEFAULT_CHECKOUT_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_optional_sections() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.fulfillment.batch_size, 50);
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("COURSES__SERVER__PORT", "3000");
        env::set_var("COURSES__SERVER__ENVIRONMENT", "production");
        env::set_var("COURSES__FULFILLMENT__BATCH_SIZE", "5");
        env::set_var("COURSES__FULFILLMENT__MAX_ATTEMPTS", "3");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(config.fulfillment.batch_size, 5);
        assert_eq!(config.fulfillment.retry_policy().max_attempts, 3);
    }

    #[test]
    fn test_missing_payment_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("COURSES__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("COURSES__EMAIL__RESEND_API_KEY", "re_xxx");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
