//! Uniform compute contract
//!
//! Each provider implements [`ComputeServiceAdapter`] once, against its own
//! node/hardware/image/location types. [`ComputeService`] layers the
//! provider-neutral view on top: group-encoded names, normalized
//! [`NodeMetadata`] and the shared [`CredentialStore`].

use crate::credentials::{CredentialStore, Credentials, node_key};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Provider-neutral lifecycle state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeState {
    Pending,
    Running,
    Suspended,
    Stopping,
    Terminated,
    Error,
    Unknown,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Pending => "PENDING",
            NodeState::Running => "RUNNING",
            NodeState::Suspended => "SUSPENDED",
            NodeState::Stopping => "STOPPING",
            NodeState::Terminated => "TERMINATED",
            NodeState::Error => "ERROR",
            NodeState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Provider-neutral node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetadata {
    pub id: String,
    pub name: String,
    pub group: Option<String>,
    pub state: NodeState,
    pub location: Option<String>,
    /// Backend (private) addresses
    pub private_addresses: Vec<String>,
    pub public_addresses: Vec<String>,
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl NodeMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state: NodeState) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            group: parse_group(&name),
            name,
            state,
            location: None,
            private_addresses: Vec::new(),
            public_addresses: Vec::new(),
            credentials: None,
        }
    }
}

/// Node name carrying its group: `<group>-<name>`
pub fn encode_group_name(group: &str, name: &str) -> String {
    format!("{}-{}", group, name)
}

/// Group of a group-encoded node name (everything before the last `-`)
pub fn parse_group(name: &str) -> Option<String> {
    name.rsplit_once('-')
        .map(|(group, _)| group)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
}

/// Provider-specific options of a [`Template`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOptions {
    /// DNS domain for the new node's hostname
    pub domain_name: Option<String>,
}

impl TemplateOptions {
    pub fn builder() -> TemplateOptionsBuilder {
        TemplateOptionsBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct TemplateOptionsBuilder {
    domain_name: Option<String>,
}

impl TemplateOptionsBuilder {
    pub fn domain_name(mut self, domain: impl Into<String>) -> Self {
        self.domain_name = Some(domain.into());
        self
    }

    pub fn build(self) -> TemplateOptions {
        TemplateOptions {
            domain_name: self.domain_name,
        }
    }
}

/// Image, hardware and location selected for a new node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub image_id: String,
    pub hardware_id: String,
    pub location_id: String,
    #[serde(default)]
    pub options: TemplateOptions,
}

impl Template {
    pub fn new(
        image_id: impl Into<String>,
        hardware_id: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            image_id: image_id.into(),
            hardware_id: hardware_id.into(),
            location_id: location_id.into(),
            options: TemplateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Node lifecycle operations against one provider
#[async_trait]
pub trait ComputeServiceAdapter: Send + Sync {
    type Node: Send + Sync + Clone;
    type Hardware: Send + Sync;
    type Image: Send + Sync;
    type Location: Send + Sync;

    /// Provider name (e.g., "softlayer")
    fn name(&self) -> &str;

    /// Provision a node named `name`, wait until it accepts logins, store
    /// its initial credentials under [`node_key`] and return it.
    async fn create_node_with_group_encoded_into_name_then_store_credentials(
        &self,
        group: &str,
        name: &str,
        template: &Template,
        credentials: &CredentialStore,
    ) -> Result<Self::Node>;

    async fn list_nodes(&self) -> Result<Vec<Self::Node>>;

    /// `None` when the node does not exist
    async fn get_node(&self, id: &str) -> Result<Option<Self::Node>>;

    /// Idempotent: destroying an absent node succeeds
    async fn destroy_node(&self, id: &str) -> Result<()>;

    async fn reboot_node(&self, id: &str) -> Result<()>;

    async fn suspend_node(&self, id: &str) -> Result<()>;

    async fn resume_node(&self, id: &str) -> Result<()>;

    async fn list_images(&self) -> Result<Vec<Self::Image>>;

    async fn list_hardware_profiles(&self) -> Result<Vec<Self::Hardware>>;

    async fn list_locations(&self) -> Result<Vec<Self::Location>>;

    /// Provider-neutral view of a node
    fn to_node_metadata(&self, node: &Self::Node) -> NodeMetadata;
}

/// Provider-neutral compute service over one adapter
pub struct ComputeService<A: ComputeServiceAdapter> {
    adapter: A,
    credentials: Arc<CredentialStore>,
}

impl<A: ComputeServiceAdapter> ComputeService<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_store(adapter, Arc::new(CredentialStore::new()))
    }

    /// Share a credential store with other services
    pub fn with_store(adapter: A, credentials: Arc<CredentialStore>) -> Self {
        Self {
            adapter,
            credentials,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn credential_store(&self) -> Arc<CredentialStore> {
        self.credentials.clone()
    }

    pub fn credentials_for(&self, id: &str) -> Option<Credentials> {
        self.credentials.get(&node_key(id))
    }

    fn with_credentials(&self, node: &A::Node) -> NodeMetadata {
        let mut metadata = self.adapter.to_node_metadata(node);
        metadata.credentials = self.credentials_for(&metadata.id);
        metadata
    }

    pub async fn create_node(
        &self,
        group: &str,
        name: &str,
        template: &Template,
    ) -> Result<NodeMetadata> {
        let encoded = encode_group_name(group, name);
        tracing::info!(
            "Creating node {} on {} (image {}, hardware {}, location {})",
            encoded,
            self.adapter.name(),
            template.image_id,
            template.hardware_id,
            template.location_id
        );
        let node = self
            .adapter
            .create_node_with_group_encoded_into_name_then_store_credentials(
                group,
                &encoded,
                template,
                &self.credentials,
            )
            .await?;
        Ok(self.with_credentials(&node))
    }

    pub async fn list_nodes(&self) -> Result<Vec<NodeMetadata>> {
        let nodes = self.adapter.list_nodes().await?;
        Ok(nodes.iter().map(|n| self.with_credentials(n)).collect())
    }

    pub async fn get_node(&self, id: &str) -> Result<Option<NodeMetadata>> {
        let node = self.adapter.get_node(id).await?;
        Ok(node.map(|n| self.with_credentials(&n)))
    }

    pub async fn destroy_node(&self, id: &str) -> Result<()> {
        tracing::info!("Destroying node {} on {}", id, self.adapter.name());
        self.adapter.destroy_node(id).await
    }

    pub async fn reboot_node(&self, id: &str) -> Result<()> {
        self.adapter.reboot_node(id).await
    }

    pub async fn suspend_node(&self, id: &str) -> Result<()> {
        self.adapter.suspend_node(id).await
    }

    pub async fn resume_node(&self, id: &str) -> Result<()> {
        self.adapter.resume_node(id).await
    }

    pub async fn list_images(&self) -> Result<Vec<A::Image>> {
        self.adapter.list_images().await
    }

    pub async fn list_hardware_profiles(&self) -> Result<Vec<A::Hardware>> {
        self.adapter.list_hardware_profiles().await
    }

    pub async fn list_locations(&self) -> Result<Vec<A::Location>> {
        self.adapter.list_locations().await
    }
}
