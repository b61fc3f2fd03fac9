//! Cloud provider error types

use thiserror::Error;

/// Classified failure of a provider operation
///
/// Every variant produced by the dispatcher carries the operation name and
/// the target URI so that a failure can be diagnosed without tracing.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Cannot resolve endpoint for {operation}: {reason}")]
    Resolution { operation: String, reason: String },

    #[error("Cannot bind payload for {operation}: {reason}")]
    Binding { operation: String, reason: String },

    #[error("{operation} {target}: transport failure: {message}")]
    Transport {
        operation: String,
        target: String,
        message: String,
    },

    #[error("{operation} {target}: resource not found")]
    NotFound { operation: String, target: String },

    #[error("{operation} {target}: client error {status}: {message}")]
    ClientRequest {
        operation: String,
        target: String,
        status: u16,
        message: String,
    },

    #[error("{operation} {target}: provider error {status}: {message}")]
    ProviderServer {
        operation: String,
        target: String,
        status: u16,
        message: String,
    },

    #[error("Timed out after {waited_ms}ms waiting for {target} to become ready")]
    ProvisioningTimeout { target: String, waited_ms: u128 },

    #[error("Provisioning of {target} was rejected: {reason}")]
    ProvisioningRejected { target: String, reason: String },

    #[error("Cannot parse response of {operation} {target}: {message}")]
    Parse {
        operation: String,
        target: String,
        message: String,
    },

    #[error("Credential already stored for {0}")]
    CredentialConflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CloudError {
    /// Resolution failure not yet attributed to an operation
    pub fn resolution(reason: impl Into<String>) -> Self {
        CloudError::Resolution {
            operation: String::new(),
            reason: reason.into(),
        }
    }

    /// Binding failure not yet attributed to an operation
    pub fn binding(reason: impl Into<String>) -> Self {
        CloudError::Binding {
            operation: String::new(),
            reason: reason.into(),
        }
    }

    /// Transport failure not yet attributed to an operation
    pub fn transport(target: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::Transport {
            operation: String::new(),
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn parse(
        operation: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CloudError::Parse {
            operation: operation.into(),
            target: target.into(),
            message: message.into(),
        }
    }

    /// Fill in the operation name on failures raised by resolvers, binders
    /// and transports, which don't know which call they serve.
    pub fn in_operation(self, name: &str) -> Self {
        match self {
            CloudError::Resolution { operation, reason } if operation.is_empty() => {
                CloudError::Resolution {
                    operation: name.to_string(),
                    reason,
                }
            }
            CloudError::Binding { operation, reason } if operation.is_empty() => {
                CloudError::Binding {
                    operation: name.to_string(),
                    reason,
                }
            }
            CloudError::Transport {
                operation,
                target,
                message,
            } if operation.is_empty() => CloudError::Transport {
                operation: name.to_string(),
                target,
                message,
            },
            other => other,
        }
    }

    /// 4xx class, including not-found
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CloudError::NotFound { .. } | CloudError::ClientRequest { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }

    /// HTTP status behind this failure, if it came off the wire
    pub fn status(&self) -> Option<u16> {
        match self {
            CloudError::NotFound { .. } => Some(404),
            CloudError::ClientRequest { status, .. } | CloudError::ProviderServer { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_operation_fills_blank_name_only() {
        let err = CloudError::resolution("org not found").in_operation("find_catalog");
        assert_eq!(
            err.to_string(),
            "Cannot resolve endpoint for find_catalog: org not found"
        );

        let err = CloudError::Binding {
            operation: "clone".to_string(),
            reason: "missing".to_string(),
        }
        .in_operation("other");
        assert!(err.to_string().contains("clone"));

        let err = CloudError::transport("https://x/org", "connection reset").in_operation("list_orgs");
        assert_eq!(
            err.to_string(),
            "list_orgs https://x/org: transport failure: connection reset"
        );
    }

    #[test]
    fn test_status_classification() {
        let nf = CloudError::NotFound {
            operation: "get_vapp".to_string(),
            target: "https://x/vapp/1".to_string(),
        };
        assert!(nf.is_client_error());
        assert!(nf.is_not_found());
        assert_eq!(nf.status(), Some(404));

        let server = CloudError::ProviderServer {
            operation: "deploy".to_string(),
            target: "https://x".to_string(),
            status: 503,
            message: "busy".to_string(),
        };
        assert!(!server.is_client_error());
        assert_eq!(server.status(), Some(503));
    }
}
