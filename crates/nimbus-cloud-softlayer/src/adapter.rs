//! SoftLayer compute adapter
//!
//! Maps the uniform node lifecycle onto virtual guests ordered from one
//! product package. Template image and hardware ids are item price ids:
//! the image is one price, the hardware a comma-separated list of them.

use crate::client::SoftLayerClient;
use crate::config::SoftLayerConfig;
use crate::domain::{
    Datacenter, NewVirtualGuest, ProductItem, ProductItemPrice, ProductOrder, ProductPackage,
    VirtualGuest,
};
use async_trait::async_trait;
use nimbus_cloud::{
    CloudError, ComputeServiceAdapter, CredentialStore, Credentials, LifecycleOrchestrator,
    NodeMetadata, NodeState, Provisioner, ReadyNode, Result, Template, Transport, node_key,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

pub const SAN_DESCRIPTION_REGEX: &str = r".*GB \(SAN\).*";

/// Capacity (GB) of the SAN disk every hardware profile boots from
pub const BOOT_VOLUME_CAPACITY: f32 = 100.0;

/// Prices added to every virtual guest order (bandwidth, port speed,
/// monitoring, notifications, VPN, ...)
pub const DEFAULT_VIRTUAL_GUEST_PRICES: [i64; 10] =
    [1639, 21, 55, 58, 1800, 57, 274, 905, 418, 420];

pub struct SoftLayerComputeServiceAdapter {
    client: SoftLayerClient,
    package_name: String,
    orchestrator: LifecycleOrchestrator,
}

impl SoftLayerComputeServiceAdapter {
    pub fn new(config: &SoftLayerConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: SoftLayerClient::new(config, transport),
            package_name: config.package_name.clone(),
            orchestrator: LifecycleOrchestrator::new(config.readiness_poll()),
        })
    }

    pub fn client(&self) -> &SoftLayerClient {
        &self.client
    }

    /// The configured package, with items and datacenters
    pub async fn product_package(&self) -> Result<ProductPackage> {
        let active = self.client.account().get_active_packages().await?;
        let package = active
            .iter()
            .find(|p| p.name == self.package_name)
            .ok_or_else(|| {
                let names: Vec<&str> = active.iter().map(|p| p.name.as_str()).collect();
                CloudError::InvalidConfig(format!(
                    "package '{}' is not active on this account (active: {})",
                    self.package_name,
                    names.join(", ")
                ))
            })?;

        self.client
            .product_packages()
            .get_product_package(package.id)
            .await?
            .ok_or_else(|| {
                CloudError::InvalidConfig(format!("package {} could not be loaded", package.id))
            })
    }
}

/// Prices to order for `template`: image, then hardware, then the fixed
/// defaults; duplicates dropped, first occurrence wins.
pub fn get_prices(template: &Template) -> Result<Vec<ProductItemPrice>> {
    let mut ids = vec![parse_price(&template.image_id, "image")?];
    for part in template.hardware_id.split(',') {
        ids.push(parse_price(part, "hardware")?);
    }
    ids.extend(DEFAULT_VIRTUAL_GUEST_PRICES);

    let mut seen = HashSet::new();
    Ok(ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(ProductItemPrice::id)
        .collect())
}

fn parse_price(value: &str, what: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        CloudError::InvalidConfig(format!("{} id '{}' is not a price id", what, value))
    })
}

fn parse_guest_id(id: &str) -> Result<i64> {
    id.trim()
        .parse()
        .map_err(|_| CloudError::InvalidConfig(format!("'{}' is not a virtual guest id", id)))
}

/// First item per capacity, in package order
fn index_by_capacity<'a>(items: impl Iterator<Item = &'a ProductItem>) -> Vec<(f32, &'a ProductItem)> {
    let mut index: Vec<(f32, &ProductItem)> = Vec::new();
    for item in items {
        if let Some(capacity) = item.capacity {
            if !index.iter().any(|(c, _)| *c == capacity) {
                index.push((capacity, item));
            }
        }
    }
    index
}

fn lookup<'a>(index: &[(f32, &'a ProductItem)], capacity: f32) -> Option<&'a ProductItem> {
    index
        .iter()
        .find(|(c, _)| *c == capacity)
        .map(|(_, item)| *item)
}

/// Hardware profiles of a package: each CPU tier paired with the RAM tier
/// of equal capacity, plus the boot volume
pub fn hardware_profiles(package: &ProductPackage) -> Result<Vec<Vec<ProductItem>>> {
    let san = Regex::new(SAN_DESCRIPTION_REGEX)
        .map_err(|e| CloudError::InvalidConfig(format!("SAN pattern: {}", e)))?;

    let cpus = index_by_capacity(
        package
            .items
            .iter()
            .filter(|i| i.units.as_deref() == Some("PRIVATE_CORE")),
    );
    let rams = index_by_capacity(package.items.iter().filter(|i| i.has_category("ram")));
    let sans = index_by_capacity(
        package
            .items
            .iter()
            .filter(|i| san.is_match(&i.description) && i.has_category("one_time_charge")),
    );

    let boot_volume = lookup(&sans, BOOT_VOLUME_CAPACITY).ok_or_else(|| {
        let available: Vec<String> = sans.iter().map(|(_, i)| i.description.clone()).collect();
        CloudError::InvalidConfig(format!(
            "boot volume of {} GB not found (available: {})",
            BOOT_VOLUME_CAPACITY,
            available.join(", ")
        ))
    })?;

    Ok(cpus
        .iter()
        .filter_map(|(cores, cpu)| {
            lookup(&rams, *cores).map(|ram| vec![(*cpu).clone(), ram.clone(), boot_volume.clone()])
        })
        .collect())
}

/// Hardware id for a profile: its items' price ids, comma-separated
pub fn hardware_id(profile: &[ProductItem]) -> String {
    profile
        .iter()
        .filter_map(ProductItem::price_id)
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn node_state(guest: &VirtualGuest) -> NodeState {
    match guest.power_state.as_ref().map(|p| p.key_name.as_str()) {
        None => NodeState::Pending,
        Some("RUNNING") => NodeState::Running,
        Some("HALTED") | Some("PAUSED") => NodeState::Suspended,
        Some(_) => NodeState::Unknown,
    }
}

/// Readiness check for a freshly ordered guest: re-reads the guest on
/// every evaluation and holds once its login details are in place
pub struct VirtualGuestHasLoginDetailsPresent<'a> {
    client: &'a SoftLayerClient,
}

impl<'a> VirtualGuestHasLoginDetailsPresent<'a> {
    pub fn new(client: &'a SoftLayerClient) -> Self {
        Self { client }
    }

    pub async fn test(&self, id: i64) -> Result<bool> {
        let guest = self.client.virtual_guests().get_virtual_guest(id).await?;
        Ok(guest.is_some_and(|g| g.has_login_details()))
    }
}

/// One guest order, driven by the lifecycle orchestrator
struct GuestOrder<'a> {
    client: &'a SoftLayerClient,
    order: ProductOrder,
    hostname: String,
}

#[async_trait]
impl Provisioner for GuestOrder<'_> {
    type Handle = i64;
    type Node = VirtualGuest;

    fn target(&self) -> String {
        self.hostname.clone()
    }

    async fn submit(&self) -> Result<i64> {
        let receipt = self.client.virtual_guests().order_virtual_guest(&self.order).await?;
        let guest = receipt.order_details.virtual_guests.first().ok_or_else(|| {
            CloudError::ProvisioningRejected {
                target: self.hostname.clone(),
                reason: format!("order {} contains no virtual guest", receipt.order_id),
            }
        })?;
        tracing::info!(
            "Order {} placed for {} (guest {})",
            receipt.order_id,
            self.hostname,
            guest.id
        );
        Ok(guest.id)
    }

    async fn is_ready(&self, id: &i64) -> Result<bool> {
        VirtualGuestHasLoginDetailsPresent::new(self.client)
            .test(*id)
            .await
    }

    async fn finish(&self, id: i64) -> Result<ReadyNode<VirtualGuest>> {
        let guest = self
            .client
            .virtual_guests()
            .get_virtual_guest(id)
            .await?
            .ok_or_else(|| CloudError::ProvisioningRejected {
                target: self.hostname.clone(),
                reason: format!("guest {} disappeared after becoming ready", id),
            })?;
        let password = guest.first_password().ok_or_else(|| CloudError::ProvisioningRejected {
            target: self.hostname.clone(),
            reason: format!("guest {} lost its login details", id),
        })?;

        Ok(ReadyNode {
            key: node_key(&guest.id.to_string()),
            credentials: Credentials::new(&password.username, &password.password),
            node: guest,
        })
    }
}

#[async_trait]
impl ComputeServiceAdapter for SoftLayerComputeServiceAdapter {
    type Node = VirtualGuest;
    type Hardware = Vec<ProductItem>;
    type Image = ProductItem;
    type Location = Datacenter;

    fn name(&self) -> &str {
        "softlayer"
    }

    async fn create_node_with_group_encoded_into_name_then_store_credentials(
        &self,
        _group: &str,
        name: &str,
        template: &Template,
        credentials: &CredentialStore,
    ) -> Result<VirtualGuest> {
        let prices = get_prices(template)?;
        let package = self.product_package().await?;

        let order = ProductOrder {
            complex_type: ProductOrder::VIRTUAL_GUEST_ORDER,
            package_id: package.id,
            location: template.location_id.clone(),
            quantity: 1,
            use_hourly_pricing: true,
            prices,
            virtual_guests: vec![NewVirtualGuest {
                hostname: name.to_string(),
                domain: template.options.domain_name.clone(),
            }],
        };

        let provisioning = GuestOrder {
            client: &self.client,
            order,
            hostname: name.to_string(),
        };
        self.orchestrator.provision(&provisioning, credentials).await
    }

    async fn list_nodes(&self) -> Result<Vec<VirtualGuest>> {
        self.client.virtual_guests().list_virtual_guests().await
    }

    async fn get_node(&self, id: &str) -> Result<Option<VirtualGuest>> {
        self.client
            .virtual_guests()
            .get_virtual_guest(parse_guest_id(id)?)
            .await
    }

    async fn destroy_node(&self, id: &str) -> Result<()> {
        let Some(guest) = self.get_node(id).await? else {
            tracing::debug!("Guest {} already gone", id);
            return Ok(());
        };
        let Some(billing_item_id) = guest.billing_item_id() else {
            tracing::debug!("Guest {} has no billing item to cancel", id);
            return Ok(());
        };
        self.client
            .virtual_guests()
            .cancel_service(billing_item_id)
            .await?;
        Ok(())
    }

    async fn reboot_node(&self, id: &str) -> Result<()> {
        self.client
            .virtual_guests()
            .reboot_hard_virtual_guest(parse_guest_id(id)?)
            .await
    }

    async fn suspend_node(&self, id: &str) -> Result<()> {
        self.client
            .virtual_guests()
            .pause_virtual_guest(parse_guest_id(id)?)
            .await
    }

    async fn resume_node(&self, id: &str) -> Result<()> {
        self.client
            .virtual_guests()
            .resume_virtual_guest(parse_guest_id(id)?)
            .await
    }

    async fn list_images(&self) -> Result<Vec<ProductItem>> {
        let package = self.product_package().await?;
        Ok(package
            .items
            .into_iter()
            .filter(|item| item.has_category("os"))
            .collect())
    }

    async fn list_hardware_profiles(&self) -> Result<Vec<Vec<ProductItem>>> {
        hardware_profiles(&self.product_package().await?)
    }

    async fn list_locations(&self) -> Result<Vec<Datacenter>> {
        Ok(self.product_package().await?.datacenters)
    }

    fn to_node_metadata(&self, guest: &VirtualGuest) -> NodeMetadata {
        let mut node = NodeMetadata::new(guest.id.to_string(), &guest.hostname, node_state(guest));
        node.location = guest.datacenter.as_ref().map(|d| d.name.clone());
        node.public_addresses = guest.primary_ip_address.iter().cloned().collect();
        node.private_addresses = guest.primary_backend_ip_address.iter().cloned().collect();
        node
    }
}
