//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - resources(id, tenant_id, kind, payload, created_at, updated_at)
//! - resource_fields(resource_id, field, value)
//! - resource_edges(from_id, edge, to_id, strong)

pub mod schema;
pub mod sqlite;
pub mod tx;

pub use sqlite::{DbStats, InventoryStore};
