//! vCloud provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VCloudError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Cloud error: {0}")]
    Cloud(#[from] nimbus_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, VCloudError>;

impl From<VCloudError> for nimbus_cloud::CloudError {
    fn from(error: VCloudError) -> Self {
        match error {
            VCloudError::Cloud(inner) => inner,
            other => nimbus_cloud::CloudError::InvalidConfig(other.to_string()),
        }
    }
}
