//! SoftLayer provider for Nimbus
//!
//! Orders virtual guests from a product package and waits for their login
//! details before handing them back through
//! [`ComputeService`](nimbus_cloud::ComputeService).
//!
//! # Requirements
//!
//! - `SOFTLAYER_USER`, `SOFTLAYER_API_KEY` env vars
//! - Optional: `SOFTLAYER_ENDPOINT`, `SOFTLAYER_VIRTUALGUEST_PACKAGE_NAME`,
//!   `SOFTLAYER_LOGIN_DETAILS_DELAY_MS`
//!
//! # Example
//!
//! ```ignore
//! use nimbus_cloud::{ComputeService, HttpTransport, Template};
//! use nimbus_cloud_softlayer::{SoftLayerComputeServiceAdapter, SoftLayerConfig};
//! use std::sync::Arc;
//!
//! let config = SoftLayerConfig::from_env()?;
//! let adapter = SoftLayerComputeServiceAdapter::new(&config, Arc::new(HttpTransport::new()?))?;
//! let compute = ComputeService::new(adapter);
//!
//! // image = OS price id, hardware = CPU,RAM,disk price ids, location = datacenter id
//! let node = compute
//!     .create_node("web", "n1", &Template::new("1693", "1641,1644,1639", "3"))
//!     .await?;
//! println!("{} is {}", node.name, node.state);
//! ```

pub mod adapter;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod ops;

pub use adapter::{SoftLayerComputeServiceAdapter, get_prices, hardware_id, hardware_profiles};
pub use client::{AccountClient, ProductPackageClient, SoftLayerClient, VirtualGuestClient};
pub use config::SoftLayerConfig;
pub use domain::{
    BillingItem, Datacenter, ProductItem, ProductItemPrice, ProductOrder, ProductOrderReceipt, ProductPackage,
    VirtualGuest,
};
pub use error::{Result, SoftLayerError};
