//! vCloud Express provider for Nimbus
//!
//! Every remote call is an [`OperationDescriptor`](nimbus_cloud::OperationDescriptor)
//! in [`ops`]; [`VCloudClient`] wires them to a dispatcher carrying the
//! session cookie, the name resolvers and the vApp payload binders.
//!
//! # Requirements
//!
//! - `VCLOUD_ENDPOINT`, `VCLOUD_USER`, `VCLOUD_PASSWORD` env vars
//! - Optional: `VCLOUD_DEFAULT_NETWORK`, `VCLOUD_DEFAULT_CPU_COUNT`,
//!   `VCLOUD_DEFAULT_MEMORY`
//!
//! # Example
//!
//! ```ignore
//! use nimbus_cloud::HttpTransport;
//! use nimbus_cloud_vcloud::{VCloudClient, VCloudConfig};
//! use std::sync::Arc;
//!
//! let config = VCloudConfig::from_env()?;
//! let client = VCloudClient::connect(&config, Arc::new(HttpTransport::new()?)).await?;
//!
//! // Look up a vApp by name in the default org and vdc
//! if let Some(vapp) = client.find_vapp_in_org_vdc_named(None, None, "web-1").await? {
//!     let task = client.power_on_vapp(&vapp.href).await?;
//!     client.wait_for_task(&task).await?;
//! }
//! ```

pub mod binders;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod ops;
pub mod options;
pub mod resolvers;

pub use client::VCloudClient;
pub use config::VCloudConfig;
pub use domain::{
    Catalog, CatalogItem, Org, OrgNetwork, ReferenceType, Task, TaskError, TaskStatus, VApp,
    VAppStatus, VAppTemplate, Vdc,
};
pub use error::{Result, VCloudError};
pub use options::{CloneVAppOptions, InstantiateVAppTemplateOptions};
