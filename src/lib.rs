//! # Wirecheck - Topology Validation
//!
//! Wirecheck validates the declarative topology of a distributed messaging
//! deployment before it is applied: named box resources expose MQ and gRPC
//! pins, wired together by directed links, referencing shared dictionaries
//! and externally stored secrets. A run rejects structurally or
//! referentially broken topologies — dangling links, mismatched endpoint
//! types, duplicate or self-referential wiring, conflicting URL paths,
//! missing dictionaries and secret keys — and produces a resource-scoped
//! error report plus a repaired copy of the topology with the invalid
//! references stripped.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wirecheck::prelude::*;
//!
//! // Build the index (normally loaded from the schema repository)
//! let mut index = ResourceIndex::new();
//! index.insert_box(act);
//! index.insert_box(check1);
//! index.insert_dictionary("fix44");
//!
//! // Validate
//! let ctx = validate(
//!     "schema",
//!     "ns-",
//!     &mut index,
//!     &settings,
//!     &StaticSecretSource::with_keys(["api-token"]),
//!     &HttpStorageClient::new("storage:8080"),
//! );
//!
//! for message in ctx.report().printable_messages() {
//!     eprintln!("{message}");
//! }
//!
//! // Strip invalid references from the resources that failed
//! repair_invalid_resources(&ctx, index.boxes_mut())?;
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`core`]: resource model, configuration trees, report types, and the
//!   validation accumulator
//! - [`graph`]: the flattened link graph derived from pin declarations
//! - [`validation`]: the check chains, conflict detectors, placeholder
//!   scanning, repair, and the orchestrating pipeline
//! - [`external`]: pluggable collaborator interfaces (secrets, storage)
//!
//! A run is single-threaded and deterministic for a given input; the only
//! suspension points are the two collaborator calls, and a failure in either
//! becomes a report message rather than an abort.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod external;
pub mod graph;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use wirecheck::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::pin::{
        GrpcClientPin, GrpcSection, GrpcServerPin, LinkToEndpoint, MqPin, MqSection, PinSpec,
    };
    pub use crate::core::resource::{
        BoxResource, BoxSpec, Dictionary, ResourceIndex, SettingsResource,
    };
    pub use crate::core::types::ConfigValue;

    // Report and accumulator
    pub use crate::core::context::{ResourceContext, ValidationContext, ValidationStatus};
    pub use crate::core::error::{CheckFailure, Issue, IssueKind, Report};

    // Graph
    pub use crate::graph::link::{DictionaryRef, Endpoint, Link};
    pub use crate::graph::relation::{build_relations, LinkGraph};

    // Validation
    pub use crate::validation::chain::{
        Check, CheckChain, ConnectionKind, Direction, LinkContext, PeerRef, Target,
    };
    pub use crate::validation::pipeline::validate;
    pub use crate::validation::repair::{repair_invalid_resources, spec_hash};

    // Collaborators
    pub use crate::external::{
        HttpStorageClient, SecretSource, StaticSecretSource, StaticStorageClient, StorageClient,
        SECRET_NAME,
    };
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
