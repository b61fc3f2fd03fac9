//! Nimbus Cloud Core
//!
//! One uniform set of cloud operations, translated per provider into that
//! provider's REST dialect.
//!
//! Providers describe each remote call as a static [`OperationDescriptor`]
//! and the [`Dispatcher`] turns descriptor + arguments into a wire request,
//! sends it through a [`Transport`] and interprets the response. On top of
//! that, a [`ComputeServiceAdapter`] per provider normalizes node lifecycle
//! and the [`LifecycleOrchestrator`] bridges "request accepted" and
//! "node ready" with bounded polling.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   nimbus CLI                     │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 nimbus-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  ComputeService / LifecycleOrchestrator   │   │
//! │  │  trait ComputeServiceAdapter { ... }      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Dispatcher  │  │  Transport   │            │
//! │  │ resolve/bind │  │ reqwest/mock │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │    vcloud     │ │   softlayer   │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod args;
pub mod binder;
pub mod blobstore;
pub mod classify;
pub mod compute;
pub mod credentials;
pub mod descriptor;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod interpret;
pub mod lifecycle;
pub mod predicate;
pub mod transport;

// Re-exports
pub use args::{ArgValue, CallArgs, PayloadOptions};
pub use binder::{PayloadBinder, TemplateBinder};
pub use blobstore::{Blob, BlobMetadata, BlobStore, InMemoryBlobStore, PutOptions, StoredBlob};
pub use compute::{
    ComputeService, ComputeServiceAdapter, NodeMetadata, NodeState, Template, TemplateOptions,
};
pub use credentials::{CredentialStore, Credentials, node_key};
pub use descriptor::{
    EndpointStrategy, NotFoundPolicy, OperationDescriptor, OperationTable, PayloadStrategy,
    ResponseStrategy,
};
pub use dispatch::{Dispatcher, DispatcherBuilder};
pub use endpoint::EndpointResolver;
pub use error::{CloudError, Result};
pub use interpret::Interpreted;
pub use lifecycle::{LifecycleOrchestrator, Provisioner, ProvisioningState, ReadyNode};
pub use predicate::{PollConfig, retry_until};
pub use transport::{
    BasicAuthFilter, CookieFilter, HttpTransport, Payload, RequestFilter, Transport, Verb,
    WireRequest, WireResponse,
};
