//! Deferred fulfillment worker configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentConfig {
    /// Run the background worker at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between backlog passes
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Entries handled per pass
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Delay after the first failed attempt; doubles per attempt
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_secs: u64,

    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_secs: u64,

    /// Failed attempts before an entry is parked
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl FulfillmentConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay_secs: i64::try_from(self.retry_base_delay_secs).unwrap_or(i64::MAX),
            max_delay_secs: i64::try_from(self.retry_max_delay_secs).unwrap_or(i64::MAX),
            max_attempts: self.max_attempts,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 || self.poll_interval_secs > 3600 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.retry_base_delay_secs == 0
            || self.retry_max_delay_secs < self.retry_base_delay_secs
            || self.retry_max_delay_secs > 86_400
        {
            return Err(ValidationError::InvalidRetryDelay);
        }
        if self.max_attempts == 0 || self.max_attempts > 100 {
            return Err(ValidationError::InvalidMaxAttempts);
        }
        Ok(())
    }
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_secs: default_poll_interval(),
            batch_size: default_batch_size(),
            retry_base_delay_secs: default_retry_base_delay(),
            retry_max_delay_secs: default_retry_max_delay(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    60
}

fn default_batch_size() -> usize {
    50
}

fn default_retry_base_delay() -> u64 {
    30
}

fn default_retry_max_delay() -> u64 {
    3600
}

fn default_max_attempts() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FulfillmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_validation_bounds() {
        let zero_interval = FulfillmentConfig {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(zero_interval.validate(), Err(ValidationError::InvalidPollInterval));

        let huge_batch = FulfillmentConfig {
            batch_size: 5000,
            ..Default::default()
        };
        assert_eq!(huge_batch.validate(), Err(ValidationError::InvalidBatchSize));
    }

    #[test]
    fn test_retry_settings_bounds() {
        let inverted = FulfillmentConfig {
            retry_base_delay_secs: 600,
            retry_max_delay_secs: 60,
            ..Default::default()
        };
        assert_eq!(inverted.validate(), Err(ValidationError::InvalidRetryDelay));

        let never_retry = FulfillmentConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(never_retry.validate(), Err(ValidationError::InvalidMaxAttempts));
    }
}
