//! SoftLayer connection settings

use crate::error::{Result, SoftLayerError};
use nimbus_cloud::PollConfig;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.softlayer.com/rest/v3";
pub const DEFAULT_PACKAGE_NAME: &str = "Cloud Server";
pub const DEFAULT_LOGIN_DETAILS_DELAY_MS: u64 = 3_600_000;

/// Smallest accepted login-details delay
const MIN_LOGIN_DETAILS_DELAY_MS: u64 = 500;

/// Configuration for the SoftLayer provider
#[derive(Debug, Clone)]
pub struct SoftLayerConfig {
    pub user: String,
    pub api_key: String,
    pub endpoint: String,
    /// Product package new guests are ordered from
    pub package_name: String,
    /// How long a new guest may take to report its login details
    pub login_details_delay: Duration,
    /// Delay between two readiness checks
    pub poll_interval: Duration,
}

impl SoftLayerConfig {
    pub fn new(user: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            login_details_delay: Duration::from_millis(DEFAULT_LOGIN_DETAILS_DELAY_MS),
            poll_interval: Duration::from_secs(1),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_login_details_delay(mut self, delay: Duration) -> Self {
        self.login_details_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Create SoftLayerConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let user = required("SOFTLAYER_USER")?;
        let api_key = required("SOFTLAYER_API_KEY")?;

        let mut config = Self::new(user, api_key);
        if let Ok(endpoint) = std::env::var("SOFTLAYER_ENDPOINT") {
            config = config.with_endpoint(endpoint);
        }
        if let Ok(name) = std::env::var("SOFTLAYER_VIRTUALGUEST_PACKAGE_NAME") {
            config.package_name = name;
        }
        if let Ok(delay) = std::env::var("SOFTLAYER_LOGIN_DETAILS_DELAY_MS") {
            let millis: u64 = delay.trim().parse().map_err(|_| {
                SoftLayerError::InvalidConfig(format!(
                    "SOFTLAYER_LOGIN_DETAILS_DELAY_MS must be a number, got '{}'",
                    delay
                ))
            })?;
            config.login_details_delay = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.login_details_delay.as_millis() <= u128::from(MIN_LOGIN_DETAILS_DELAY_MS) {
            return Err(SoftLayerError::InvalidConfig(format!(
                "login details delay must be in milliseconds and greater than {}, got {}",
                MIN_LOGIN_DETAILS_DELAY_MS,
                self.login_details_delay.as_millis()
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(SoftLayerError::InvalidConfig(
                "poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Budget for the login-details readiness check
    pub fn readiness_poll(&self) -> PollConfig {
        PollConfig::new(self.login_details_delay, self.poll_interval)
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| SoftLayerError::MissingEnvVar(name.to_string()))
}
