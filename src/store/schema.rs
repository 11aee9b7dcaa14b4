//! Database schema definitions
//!
//! One relational schema carries every resource kind:
//! - resources(id, tenant_id, kind, payload, created_at, updated_at)
//! - resource_fields(resource_id, field, value) - projected filterable values
//! - resource_edges(from_id, edge, to_id, strong) - wired relations

/// SQL to create the resources table
pub const CREATE_RESOURCES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resources (
    id TEXT PRIMARY KEY,
    tenant_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

/// SQL to create the projected field values table
///
/// Scalar fields contribute one row, set fields one row per element, in
/// the canonical encoding produced by the schema registry.
pub const CREATE_RESOURCE_FIELDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resource_fields (
    resource_id TEXT NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL
)
"#;

/// SQL to create the edges table
pub const CREATE_RESOURCE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS resource_edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id TEXT NOT NULL,
    edge TEXT NOT NULL,
    to_id TEXT NOT NULL,
    strong INTEGER NOT NULL DEFAULT 1,
    UNIQUE(from_id, edge)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_resources_tenant_kind ON resources(tenant_id, kind)",
    "CREATE INDEX IF NOT EXISTS idx_fields_resource ON resource_fields(resource_id)",
    "CREATE INDEX IF NOT EXISTS idx_fields_value ON resource_fields(field, value)",
    "CREATE INDEX IF NOT EXISTS idx_edges_from ON resource_edges(from_id)",
    "CREATE INDEX IF NOT EXISTS idx_edges_to ON resource_edges(to_id)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_RESOURCES_TABLE,
        CREATE_RESOURCE_FIELDS_TABLE,
        CREATE_RESOURCE_EDGES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
