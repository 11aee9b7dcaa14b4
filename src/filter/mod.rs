//! Filter language - textual filters compiled to relational predicates
//!
//! Grammar (AND-composed clauses):
//!
//! ```text
//! expr    := clause ( AND clause )*
//! clause  := NOT clause
//!          | '(' expr ')'
//!          | has(path)
//!          | path = value
//! path    := ident ( '.' ident )*
//! value   := '"' chars '"' | bareword
//! ```
//!
//! Paths resolve against the per-kind schema: every leading segment must
//! be a declared edge (each hop re-resolved against the target kind), the
//! final segment a declared field (or an edge, for `has`). Paths with
//! more than [`MAX_EDGE_HOPS`] edge hops are rejected.

pub mod ast;
pub mod compile;
pub mod parser;

pub use ast::{FilterExpr, Literal, Path};
pub use compile::{compile, compile_order_by, validate_page, SqlPredicate};
pub use parser::parse;

use crate::id::{ResourceId, TenantId};
use crate::kind::ResourceKind;
use crate::resource::Resource;

/// Maximum edge hops a filter path may traverse
pub const MAX_EDGE_HOPS: usize = 5;

/// Page size applied when a List/Filter request leaves `limit` unset
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest accepted `limit`
pub const MAX_PAGE_SIZE: u64 = 100;

/// A List/Filter request against one resource kind.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pub kind: ResourceKind,
    /// Filter text per the module grammar; `None` matches everything
    pub filter: Option<String>,
    /// Comma list of `column [asc|desc]`, validated per kind
    pub order_by: Option<String>,
    pub offset: u64,
    /// `None` applies [`DEFAULT_PAGE_SIZE`]
    pub limit: Option<u64>,
}

impl ResourceFilter {
    pub fn all(kind: ResourceKind) -> Self {
        Self {
            kind,
            filter: None,
            order_by: None,
            offset: 0,
            limit: None,
        }
    }

    pub fn matching(kind: ResourceKind, filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::all(kind)
        }
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn page(mut self, offset: u64, limit: u64) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }
}

/// One page of hydrated envelopes plus the unpaginated total.
#[derive(Debug)]
pub struct ListPage {
    pub items: Vec<Resource>,
    /// Matching rows ignoring offset/limit
    pub total: u64,
    pub has_next: bool,
}

/// Lightweight carrier returned by Filter instead of a full envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub tenant: TenantId,
    pub id: ResourceId,
}

/// One page of id/tenant carriers plus the unpaginated total.
#[derive(Debug)]
pub struct FilterPage {
    pub refs: Vec<ResourceRef>,
    pub total: u64,
}
