//! SoftLayer API clients
//!
//! [`SoftLayerClient`] owns one dispatcher (Basic auth with user + API
//! key) and hands out the per-service clients.

use crate::config::SoftLayerConfig;
use crate::domain::{ProductOrder, ProductOrderReceipt, ProductPackage, VirtualGuest};
use crate::ops;
use nimbus_cloud::{BasicAuthFilter, CallArgs, CloudError, Dispatcher, Result, Transport};
use std::sync::Arc;

#[derive(Clone)]
pub struct SoftLayerClient {
    dispatcher: Arc<Dispatcher>,
}

impl SoftLayerClient {
    pub fn new(config: &SoftLayerConfig, transport: Arc<dyn Transport>) -> Self {
        let dispatcher = Dispatcher::builder(transport, &config.endpoint)
            .filter(BasicAuthFilter::new(&config.user, &config.api_key))
            .build();
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn virtual_guests(&self) -> VirtualGuestClient {
        VirtualGuestClient {
            dispatcher: self.dispatcher.clone(),
        }
    }

    pub fn account(&self) -> AccountClient {
        AccountClient {
            dispatcher: self.dispatcher.clone(),
        }
    }

    pub fn product_packages(&self) -> ProductPackageClient {
        ProductPackageClient {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

fn by_id(id: i64) -> CallArgs {
    CallArgs::new().path_param("id", id)
}

/// Virtual guest lifecycle calls
#[derive(Clone)]
pub struct VirtualGuestClient {
    dispatcher: Arc<Dispatcher>,
}

impl VirtualGuestClient {
    pub async fn list_virtual_guests(&self) -> Result<Vec<VirtualGuest>> {
        Ok(self
            .dispatcher
            .invoke_json(&ops::LIST_VIRTUAL_GUESTS, CallArgs::new())
            .await?
            .unwrap_or_default())
    }

    /// `None` when no guest has this id
    pub async fn get_virtual_guest(&self, id: i64) -> Result<Option<VirtualGuest>> {
        self.dispatcher
            .invoke_json(&ops::GET_VIRTUAL_GUEST, by_id(id))
            .await
    }

    pub async fn order_virtual_guest(&self, order: &ProductOrder) -> Result<ProductOrderReceipt> {
        let body = serde_json::json!({ "parameters": [order] });
        self.dispatcher
            .invoke_json(&ops::ORDER_VIRTUAL_GUEST, CallArgs::new().json(body))
            .await?
            .ok_or_else(|| {
                CloudError::parse(
                    ops::ORDER_VIRTUAL_GUEST.name,
                    ops::ORDER_VIRTUAL_GUEST.path.unwrap_or_default(),
                    "no order receipt returned",
                )
            })
    }

    /// Cancel the billing item behind a guest, which destroys it
    pub async fn cancel_service(&self, billing_item_id: i64) -> Result<bool> {
        Ok(self
            .dispatcher
            .invoke_json(&ops::CANCEL_SERVICE, by_id(billing_item_id))
            .await?
            .unwrap_or(false))
    }

    pub async fn reboot_hard_virtual_guest(&self, id: i64) -> Result<()> {
        self.dispatcher
            .invoke_void(&ops::REBOOT_HARD_VIRTUAL_GUEST, by_id(id))
            .await
    }

    pub async fn pause_virtual_guest(&self, id: i64) -> Result<()> {
        self.dispatcher
            .invoke_void(&ops::PAUSE_VIRTUAL_GUEST, by_id(id))
            .await
    }

    pub async fn resume_virtual_guest(&self, id: i64) -> Result<()> {
        self.dispatcher
            .invoke_void(&ops::RESUME_VIRTUAL_GUEST, by_id(id))
            .await
    }
}

#[derive(Clone)]
pub struct AccountClient {
    dispatcher: Arc<Dispatcher>,
}

impl AccountClient {
    /// Packages the account can order from (items and datacenters omitted)
    pub async fn get_active_packages(&self) -> Result<Vec<ProductPackage>> {
        Ok(self
            .dispatcher
            .invoke_json(&ops::GET_ACTIVE_PACKAGES, CallArgs::new())
            .await?
            .unwrap_or_default())
    }
}

#[derive(Clone)]
pub struct ProductPackageClient {
    dispatcher: Arc<Dispatcher>,
}

impl ProductPackageClient {
    /// A package with its items, prices and datacenters
    pub async fn get_product_package(&self, id: i64) -> Result<Option<ProductPackage>> {
        self.dispatcher
            .invoke_json(&ops::GET_PRODUCT_PACKAGE, by_id(id))
            .await
    }
}
