//! Compiles Kubernetes NetworkPolicy documents into a service-topology graph.
//!
//! ```text
//! YAML stream ──> DocumentStream ──> NetworkPolicy (typed, validated)
//!                                         │
//!                                         v
//!                               ServiceGraphBuilder ──> ServiceRegistry
//!                                                            │
//!                                                            v
//!                                                  GraphProjector ──> VisGraph {nodes, links}
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod identity;
pub mod labels;
pub mod policy;
pub mod projector;
pub mod registry;
pub mod service;
pub mod source;

pub use builder::{IngestStats, Ingested, ServiceGraphBuilder};
pub use config::XgressConfig;
pub use error::{Result, XgressError};
pub use identity::canonical_identity;
pub use labels::{Labels, derive_name};
pub use policy::NetworkPolicy;
pub use projector::{GraphProjector, VisGraph};
pub use registry::ServiceRegistry;
pub use service::{Service, ServiceId};
