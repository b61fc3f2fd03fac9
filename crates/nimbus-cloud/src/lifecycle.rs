//! Node provisioning state machine
//!
//! ```text
//! SUBMITTED --(readiness holds)--> READY      credentials committed
//!     |------(budget exhausted)--> TIMED_OUT  ProvisioningTimeout
//!     `------(provider says no)--> REJECTED   ProvisioningRejected
//! ```
//!
//! Credentials are committed only on READY and before the node is handed
//! back, so a caller never sees a ready node without its login and a
//! cancelled or failed provisioning never leaves one behind.

use crate::credentials::{CredentialStore, Credentials};
use crate::error::{CloudError, Result};
use crate::predicate::{PollConfig, retry_until};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// States of a node in creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningState {
    Submitted,
    Ready,
    TimedOut,
    Rejected,
}

impl fmt::Display for ProvisioningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningState::Submitted => write!(f, "submitted"),
            ProvisioningState::Ready => write!(f, "ready"),
            ProvisioningState::TimedOut => write!(f, "timed-out"),
            ProvisioningState::Rejected => write!(f, "rejected"),
        }
    }
}

/// A node that passed its readiness check
#[derive(Debug, Clone)]
pub struct ReadyNode<N> {
    pub node: N,
    /// Credential store key for this node
    pub key: String,
    pub credentials: Credentials,
}

/// The provider-specific steps of one provisioning run
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Provider handle of an accepted request (order receipt, task, ...)
    type Handle: Send + Sync;
    type Node: Send;

    /// Human-readable target for logs and errors
    fn target(&self) -> String;

    /// Submit the provisioning request
    async fn submit(&self) -> Result<Self::Handle>;

    /// Readiness predicate; must query the provider afresh on every call
    async fn is_ready(&self, handle: &Self::Handle) -> Result<bool>;

    /// Fetch the final node and its initial login
    async fn finish(&self, handle: Self::Handle) -> Result<ReadyNode<Self::Node>>;
}

/// Drives a [`Provisioner`] from submission to a ready node
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleOrchestrator {
    poll: PollConfig,
}

impl LifecycleOrchestrator {
    pub fn new(poll: PollConfig) -> Self {
        Self { poll }
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    pub async fn provision<P: Provisioner>(
        &self,
        provisioner: &P,
        store: &CredentialStore,
    ) -> Result<P::Node> {
        let target = provisioner.target();

        let handle = provisioner.submit().await.map_err(|e| reject(&target, e))?;
        tracing::info!("{}: {}", target, ProvisioningState::Submitted);

        let pending = &handle;
        let ready = retry_until(&self.poll, move || provisioner.is_ready(pending)).await?;
        if !ready {
            tracing::warn!("{}: {}", target, ProvisioningState::TimedOut);
            return Err(CloudError::ProvisioningTimeout {
                target,
                waited_ms: self.poll.timeout.as_millis(),
            });
        }

        let ReadyNode {
            node,
            key,
            credentials,
        } = provisioner.finish(handle).await?;
        store.insert_new(key, credentials)?;
        tracing::info!("{}: {}", target, ProvisioningState::Ready);
        Ok(node)
    }
}

/// A provider refusing the initial request is a rejection; transport and
/// local faults keep their own kind.
fn reject(target: &str, error: CloudError) -> CloudError {
    match error {
        CloudError::NotFound { .. }
        | CloudError::ClientRequest { .. }
        | CloudError::ProviderServer { .. } => {
            tracing::warn!("{}: {}", target, ProvisioningState::Rejected);
            CloudError::ProvisioningRejected {
                target: target.to_string(),
                reason: error.to_string(),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::node_key;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Becomes ready on poll `ready_at` (1-based)
    struct FakeOrder {
        polls: AtomicU32,
        ready_at: u32,
        reject: bool,
    }

    impl FakeOrder {
        fn ready_at(ready_at: u32) -> Self {
            Self {
                polls: AtomicU32::new(0),
                ready_at,
                reject: false,
            }
        }
    }

    #[async_trait]
    impl Provisioner for FakeOrder {
        type Handle = String;
        type Node = String;

        fn target(&self) -> String {
            "g-n1".to_string()
        }

        async fn submit(&self) -> Result<String> {
            if self.reject {
                return Err(CloudError::ClientRequest {
                    operation: "order".to_string(),
                    target: "https://api/order".to_string(),
                    status: 400,
                    message: "price 123 not available".to_string(),
                });
            }
            Ok("1001".to_string())
        }

        async fn is_ready(&self, _handle: &String) -> Result<bool> {
            Ok(self.polls.fetch_add(1, Ordering::SeqCst) + 1 >= self.ready_at)
        }

        async fn finish(&self, handle: String) -> Result<ReadyNode<String>> {
            Ok(ReadyNode {
                key: node_key(&handle),
                node: handle,
                credentials: Credentials::new("root", "s3cret"),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_fourth_poll_commits_once() {
        let orchestrator = LifecycleOrchestrator::new(PollConfig::from_millis(10_000, 500));
        let store = CredentialStore::new();
        let order = FakeOrder::ready_at(4);

        let node = orchestrator.provision(&order, &store).await.unwrap();
        assert_eq!(node, "1001");
        assert_eq!(order.polls.load(Ordering::SeqCst), 4);
        assert_eq!(store.keys(), vec!["node#1001".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_commits_nothing() {
        let orchestrator = LifecycleOrchestrator::new(PollConfig::from_millis(1_000, 500));
        let store = CredentialStore::new();

        let err = orchestrator
            .provision(&FakeOrder::ready_at(100), &store)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::ProvisioningTimeout { waited_ms: 1000, .. }));
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submission() {
        let orchestrator = LifecycleOrchestrator::default();
        let store = CredentialStore::new();
        let order = FakeOrder {
            reject: true,
            ..FakeOrder::ready_at(1)
        };

        let err = orchestrator.provision(&order, &store).await.unwrap_err();
        match err {
            CloudError::ProvisioningRejected { target, reason } => {
                assert_eq!(target, "g-n1");
                assert!(reason.contains("price 123 not available"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(order.polls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_ready_commits_nothing() {
        let orchestrator = LifecycleOrchestrator::new(PollConfig::from_millis(60_000, 1_000));
        let store = CredentialStore::new();
        let order = FakeOrder::ready_at(10);

        let outcome = tokio::time::timeout(
            Duration::from_millis(3_500),
            orchestrator.provision(&order, &store),
        )
        .await;
        assert!(outcome.is_err());
        assert!(store.is_empty());
        assert_eq!(order.polls.load(Ordering::SeqCst), 4);
    }
}
