//! SoftLayer provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoftLayerError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cloud error: {0}")]
    Cloud(#[from] nimbus_cloud::CloudError),
}

pub type Result<T> = std::result::Result<T, SoftLayerError>;

impl From<SoftLayerError> for nimbus_cloud::CloudError {
    fn from(error: SoftLayerError) -> Self {
        match error {
            SoftLayerError::Cloud(inner) => inner,
            other => nimbus_cloud::CloudError::InvalidConfig(other.to_string()),
        }
    }
}
