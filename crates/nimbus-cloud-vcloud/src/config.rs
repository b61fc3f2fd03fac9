//! vCloud connection settings

use crate::error::{Result, VCloudError};
use nimbus_cloud::PollConfig;

pub const DEFAULT_CPU_COUNT: u32 = 1;
pub const DEFAULT_MEMORY_MB: u32 = 512;

/// Configuration for a vCloud Express session
#[derive(Debug, Clone)]
pub struct VCloudConfig {
    /// API root, e.g. `https://services.vcloudexpress.terremark.com/api/v0.8`
    pub endpoint: String,
    pub user: String,
    pub password: String,
    /// Network href used when instantiating without an explicit network
    pub default_network: Option<String>,
    pub default_cpu_count: u32,
    pub default_memory: u32,
    /// Budget for waiting on tasks
    pub task_poll: PollConfig,
}

impl VCloudConfig {
    pub fn new(
        endpoint: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            user: user.into(),
            password: password.into(),
            default_network: None,
            default_cpu_count: DEFAULT_CPU_COUNT,
            default_memory: DEFAULT_MEMORY_MB,
            task_poll: PollConfig::default(),
        }
    }

    pub fn with_default_network(mut self, network: impl Into<String>) -> Self {
        self.default_network = Some(network.into());
        self
    }

    /// Create VCloudConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoint = required("VCLOUD_ENDPOINT")?;
        let user = required("VCLOUD_USER")?;
        let password = required("VCLOUD_PASSWORD")?;

        let mut config = Self::new(endpoint, user, password);
        config.default_network = std::env::var("VCLOUD_DEFAULT_NETWORK").ok();
        if let Some(count) = numeric("VCLOUD_DEFAULT_CPU_COUNT")? {
            config.default_cpu_count = count;
        }
        if let Some(memory) = numeric("VCLOUD_DEFAULT_MEMORY")? {
            config.default_memory = memory;
        }
        Ok(config)
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| VCloudError::MissingEnvVar(name.to_string()))
}

fn numeric(name: &str) -> Result<Option<u32>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| VCloudError::InvalidConfig(format!("{} must be a number, got '{}'", name, value))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("VCLOUD_ENDPOINT", Some("https://vcloud.example/api/")),
                ("VCLOUD_USER", Some("admin")),
                ("VCLOUD_PASSWORD", Some("secret")),
                ("VCLOUD_DEFAULT_NETWORK", None),
                ("VCLOUD_DEFAULT_CPU_COUNT", None),
                ("VCLOUD_DEFAULT_MEMORY", None),
            ],
            || {
                let config = VCloudConfig::from_env().unwrap();
                assert_eq!(config.endpoint, "https://vcloud.example/api");
                assert_eq!(config.default_network, None);
                assert_eq!(config.default_cpu_count, 1);
                assert_eq!(config.default_memory, 512);
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("VCLOUD_ENDPOINT", Some("https://vcloud.example/api")),
                ("VCLOUD_USER", Some("admin")),
                ("VCLOUD_PASSWORD", Some("secret")),
                ("VCLOUD_DEFAULT_NETWORK", Some("https://vcloud.example/api/network/1")),
                ("VCLOUD_DEFAULT_CPU_COUNT", Some("2")),
                ("VCLOUD_DEFAULT_MEMORY", Some("1024")),
            ],
            || {
                let config = VCloudConfig::from_env().unwrap();
                assert_eq!(
                    config.default_network.as_deref(),
                    Some("https://vcloud.example/api/network/1")
                );
                assert_eq!(config.default_cpu_count, 2);
                assert_eq!(config.default_memory, 1024);
            },
        );
    }

    #[test]
    fn test_from_env_missing_and_invalid() {
        temp_env::with_vars(
            [
                ("VCLOUD_ENDPOINT", None::<&str>),
                ("VCLOUD_USER", Some("admin")),
                ("VCLOUD_PASSWORD", Some("secret")),
            ],
            || {
                let err = VCloudConfig::from_env().unwrap_err();
                assert!(matches!(err, VCloudError::MissingEnvVar(ref v) if v == "VCLOUD_ENDPOINT"));
            },
        );

        temp_env::with_vars(
            [
                ("VCLOUD_ENDPOINT", Some("https://vcloud.example/api")),
                ("VCLOUD_USER", Some("admin")),
                ("VCLOUD_PASSWORD", Some("secret")),
                ("VCLOUD_DEFAULT_MEMORY", Some("lots")),
            ],
            || {
                let err = VCloudConfig::from_env().unwrap_err();
                assert!(matches!(err, VCloudError::InvalidConfig(_)));
            },
        );
    }
}
