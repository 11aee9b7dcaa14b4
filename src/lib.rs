//! # Edgeinv - Edge Infrastructure Inventory Store
//!
//! Single source of truth for the resources of an edge orchestration
//! platform: hosts, sites, regions, instances, OS images, update
//! policies and runs, telemetry profiles, and their relationships.
//!
//! Edgeinv provides:
//! - A tagged resource envelope over ~20 typed resource kinds
//! - SQLite-backed transactional storage with a single relational schema
//! - A filter language compiled into relational predicates over fields
//!   and multi-hop edges
//! - Hierarchical attribute inheritance (metadata, telemetry profiles)
//!   across bounded ancestor chains
//! - Multi-tenant isolation and referential-integrity rules on delete

pub mod config;
pub mod ctx;
pub mod filter;
pub mod hierarchy;
pub mod id;
pub mod kind;
pub mod resource;
pub mod schema;
pub mod store;
pub mod tenancy;
pub mod validate;

// Re-exports for convenient access
pub use ctx::CallContext;
pub use filter::{FilterPage, ListPage, ResourceFilter, ResourceRef};
pub use hierarchy::HierarchyResolver;
pub use id::{ResourceId, TenantId};
pub use kind::ResourceKind;
pub use resource::{Payload, Resource};
pub use store::InventoryStore;
pub use tenancy::{DeletionKind, TenantLifecycle};

/// Result type alias for Edgeinv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for Edgeinv operations.
///
/// `InvalidArgument`, `NotFound` and `FailedPrecondition` carry enough
/// detail (kind, field, path) for the caller to render a precise message.
/// `Storage` and `Encoding` indicate a bug or engine fault, never bad
/// caller input.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("precondition failed: {0}")]
    FailedPrecondition(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Error {
    /// Build an invalid-argument error tagged with the resource kind.
    pub fn invalid(kind: kind::ResourceKind, detail: impl std::fmt::Display) -> Self {
        Error::InvalidArgument(format!("{}: {}", kind.as_str(), detail))
    }

    /// Build a not-found error for a resource id.
    pub fn not_found(id: &id::ResourceId) -> Self {
        Error::NotFound(format!("resource {}", id))
    }
}
