//! SQLite inventory store implementation
//!
//! All kinds share one relational schema; per-kind knowledge comes from
//! the schema registry. Every operation is one transaction: validators
//! and the predicate compiler run first, then the unit of work executes
//! under `store::tx` and either commits whole or rolls back whole.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use serde_json::Value;
use std::path::Path;

use super::{schema as ddl, tx};
use crate::ctx::CallContext;
use crate::filter::{
    self, FilterPage, ListPage, ResourceFilter, ResourceRef, SqlPredicate,
};
use crate::id::{ResourceId, TenantId};
use crate::kind::ResourceKind;
use crate::resource::{Payload, Resource};
use crate::schema::{self, DeletionPolicy, KindSchema};
use crate::validate;
use crate::{Error, Result};

/// SQLite-backed inventory store
pub struct InventoryStore {
    conn: Connection,
}

impl InventoryStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        tracing::info!("opened inventory store at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in ddl::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== CRUD Operations ==========

    /// Create a resource: validate, assign an id, project fields, wire
    /// edges, and return the hydrated envelope read back within the same
    /// transaction.
    pub fn create(
        &mut self,
        ctx: &CallContext,
        tenant: &TenantId,
        resource: Resource,
    ) -> Result<Resource> {
        validate::validate_create(&resource)?;
        let kind = resource.kind();
        let kind_schema = schema::schema_for(kind);
        let doc = resource.payload.to_document()?;

        tx::write_tx(&mut self.conn, ctx, |tx| {
            let id = allocate_id(tx, kind)?;
            let now = unix_now();
            tx.execute(
                "INSERT INTO resources (id, tenant_id, kind, payload, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    tenant.as_str(),
                    kind.as_str(),
                    doc.to_string(),
                    now as i64,
                    now as i64,
                ],
            )?;
            insert_fields(tx, &id, kind_schema, &doc)?;
            wire_edges(tx, tenant, &id, kind_schema, &doc, None)?;
            tracing::debug!("created {} for tenant {}", id, tenant);
            // Read-your-write: hydrate from the row just written.
            hydrate(fetch_row(tx, tenant, &id)?)
        })
    }

    /// Get a resource by id
    pub fn get(&self, ctx: &CallContext, tenant: &TenantId, id: &ResourceId) -> Result<Resource> {
        tx::read_tx(&self.conn, ctx, |tx| hydrate(fetch_row(tx, tenant, id)?))
    }

    /// Update a resource under a field mask.
    ///
    /// Only masked paths are mutated; masked edges are re-resolved
    /// exactly as in Create; kind validators re-run on the merged payload
    /// so immutable and mutually-exclusive rules hold regardless of what
    /// else the mask names.
    pub fn update(
        &mut self,
        ctx: &CallContext,
        tenant: &TenantId,
        id: &ResourceId,
        mask: &[String],
        payload: Payload,
    ) -> Result<Resource> {
        if payload.kind() != id.kind() {
            return Err(Error::invalid(
                id.kind(),
                format!("payload kind {} does not match id", payload.kind()),
            ));
        }
        let kind_schema = schema::schema_for(id.kind());
        let src = payload.to_document()?;

        tx::write_tx(&mut self.conn, ctx, |tx| {
            let row = fetch_row(tx, tenant, id)?;
            let mut doc = row.doc.clone();
            schema::apply_field_mask(kind_schema, &mut doc, &src, mask)?;

            let merged = Payload::from_document(row.kind, doc.clone())?;
            validate::validate_update(&merged)?;
            if let Payload::Region(region) = &merged {
                if region.parent_region.as_ref() == Some(id) {
                    return Err(Error::invalid(row.kind, "region cannot be its own parent"));
                }
            }

            let now = unix_now();
            tx.execute(
                "UPDATE resources SET payload = ?1, updated_at = ?2 WHERE id = ?3",
                params![doc.to_string(), now as i64, id.to_string()],
            )?;
            delete_fields(tx, id)?;
            insert_fields(tx, id, kind_schema, &doc)?;
            rewire_masked_edges(tx, tenant, id, kind_schema, &doc, mask)?;
            tracing::debug!("updated {} for tenant {} mask {:?}", id, tenant, mask);
            hydrate(fetch_row(tx, tenant, id)?)
        })
    }

    /// Delete a resource, honoring the kind's deletion policy.
    ///
    /// Hard kinds are removed after the strong-reference check; kinds
    /// with a reconciled lifecycle are tombstoned (`desired_state =
    /// DELETED`) and removed later by the external reconciler. Returns
    /// the pre-delete envelope either way.
    pub fn delete(
        &mut self,
        ctx: &CallContext,
        tenant: &TenantId,
        id: &ResourceId,
    ) -> Result<Resource> {
        let kind_schema = schema::schema_for(id.kind());

        tx::write_tx(&mut self.conn, ctx, |tx| {
            let row = fetch_row(tx, tenant, id)?;
            let envelope = hydrate(row.clone())?;

            match kind_schema.deletion {
                DeletionPolicy::Hard => {
                    let referrers = strong_ref_count(tx, id)?;
                    if referrers > 0 {
                        return Err(Error::FailedPrecondition(format!(
                            "{} {} is still strongly referenced by {} resources",
                            row.kind, id, referrers
                        )));
                    }
                    clear_weak_refs(tx, id)?;
                    delete_fields(tx, id)?;
                    tx.execute(
                        "DELETE FROM resource_edges WHERE from_id = ?1",
                        [id.to_string()],
                    )?;
                    tx.execute("DELETE FROM resources WHERE id = ?1", [id.to_string()])?;
                    tracing::debug!("hard-deleted {} for tenant {}", id, tenant);
                }
                DeletionPolicy::SoftThenReconciled => {
                    let mut doc = row.doc;
                    doc["desired_state"] = Value::String("DELETED".to_string());
                    let now = unix_now();
                    tx.execute(
                        "UPDATE resources SET payload = ?1, updated_at = ?2 WHERE id = ?3",
                        params![doc.to_string(), now as i64, id.to_string()],
                    )?;
                    delete_fields(tx, id)?;
                    insert_fields(tx, id, kind_schema, &doc)?;
                    tracing::debug!("tombstoned {} for tenant {}", id, tenant);
                }
            }
            Ok(envelope)
        })
    }

    /// List matching resources: hydrated envelopes, unpaginated total,
    /// and a has-next flag
    pub fn list(
        &self,
        ctx: &CallContext,
        tenant: &TenantId,
        request: &ResourceFilter,
    ) -> Result<ListPage> {
        let query = BuiltQuery::build(tenant, request)?;
        tx::read_tx(&self.conn, ctx, |tx| {
            let total = query.count(tx)?;
            let rows = query.select_rows(tx)?;
            let mut items = Vec::with_capacity(rows.len());
            for row in rows {
                items.push(hydrate(row)?);
            }
            let has_next = query.offset + (items.len() as u64) < total;
            Ok(ListPage {
                items,
                total,
                has_next,
            })
        })
    }

    /// Filter: the same predicate as List, projected to (tenant, id)
    /// carriers for bulk operations
    pub fn filter(
        &self,
        ctx: &CallContext,
        tenant: &TenantId,
        request: &ResourceFilter,
    ) -> Result<FilterPage> {
        let query = BuiltQuery::build(tenant, request)?;
        tx::read_tx(&self.conn, ctx, |tx| {
            let total = query.count(tx)?;
            let refs = query.select_refs(tx)?;
            Ok(FilterPage { refs, total })
        })
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(DbStats {
            resources: count("SELECT COUNT(*) FROM resources")?,
            fields: count("SELECT COUNT(*) FROM resource_fields")?,
            edges: count("SELECT COUNT(*) FROM resource_edges")?,
        })
    }

    /// Shared connection access for the sibling components that run their
    /// own transactions (hierarchy resolver, tenant lifecycle).
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

// ========== Row plumbing ==========

#[derive(Debug, Clone)]
pub(crate) struct StoredRow {
    pub id: ResourceId,
    pub tenant: TenantId,
    pub kind: ResourceKind,
    pub doc: Value,
    pub created_at: u64,
    pub updated_at: u64,
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub(crate) fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredRow> {
    let id_str: String = row.get(0)?;
    let tenant: String = row.get(1)?;
    let kind_str: String = row.get(2)?;
    let payload: String = row.get(3)?;
    let created_at: i64 = row.get(4)?;
    let updated_at: i64 = row.get(5)?;

    let id = ResourceId::parse(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let kind: ResourceKind = kind_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let doc: Value = serde_json::from_str(&payload).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredRow {
        id,
        tenant: TenantId::new(tenant),
        kind,
        doc,
        created_at: created_at as u64,
        updated_at: updated_at as u64,
    })
}

pub(crate) fn fetch_row(
    tx: &Transaction,
    tenant: &TenantId,
    id: &ResourceId,
) -> Result<StoredRow> {
    tx.query_row(
        "SELECT id, tenant_id, kind, payload, created_at, updated_at \
         FROM resources WHERE id = ?1 AND tenant_id = ?2",
        params![id.to_string(), tenant.as_str()],
        row_to_stored,
    )
    .optional()?
    .ok_or_else(|| Error::not_found(id))
}

pub(crate) fn hydrate(row: StoredRow) -> Result<Resource> {
    let payload = Payload::from_document(row.kind, row.doc)?;
    Ok(Resource {
        id: Some(row.id),
        tenant: Some(row.tenant),
        payload,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn allocate_id(tx: &Transaction, kind: ResourceKind) -> Result<ResourceId> {
    // Suffix collisions are vanishingly rare; re-draw a bounded number of
    // times before giving up.
    for _ in 0..16 {
        let id = ResourceId::generate(kind);
        let taken: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM resources WHERE id = ?1",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_none() {
            return Ok(id);
        }
    }
    Err(Error::Internal(format!(
        "could not allocate a fresh {} id",
        kind
    )))
}

fn insert_fields(
    tx: &Transaction,
    id: &ResourceId,
    kind_schema: &KindSchema,
    doc: &Value,
) -> Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO resource_fields (resource_id, field, value) VALUES (?1, ?2, ?3)",
    )?;
    for row in schema::extract_fields(kind_schema, doc)? {
        stmt.execute(params![id.to_string(), row.field, row.value])?;
    }
    Ok(())
}

fn delete_fields(tx: &Transaction, id: &ResourceId) -> Result<()> {
    tx.execute(
        "DELETE FROM resource_fields WHERE resource_id = ?1",
        [id.to_string()],
    )?;
    Ok(())
}

/// Resolve and insert edges from a payload document. With `only` set,
/// edges not named in it are skipped (update re-wires masked edges only).
fn wire_edges(
    tx: &Transaction,
    tenant: &TenantId,
    id: &ResourceId,
    kind_schema: &KindSchema,
    doc: &Value,
    only: Option<&[String]>,
) -> Result<()> {
    for edge_ref in schema::extract_edges(kind_schema, doc)? {
        if let Some(mask) = only {
            if !mask.iter().any(|m| m == edge_ref.edge.name) {
                continue;
            }
        }
        let target = &edge_ref.target;
        let found: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM resources WHERE id = ?1 AND tenant_id = ?2",
                params![target.to_string(), tenant.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(Error::NotFound(format!(
                "edge {} of {} references missing {}",
                edge_ref.edge.name, id, target
            )));
        }
        tx.execute(
            "INSERT INTO resource_edges (from_id, edge, to_id, strong) VALUES (?1, ?2, ?3, ?4)",
            params![
                id.to_string(),
                edge_ref.edge.name,
                target.to_string(),
                edge_ref.edge.strong as i64,
            ],
        )?;
    }
    Ok(())
}

/// Drop and re-wire exactly the edges named in the mask
fn rewire_masked_edges(
    tx: &Transaction,
    tenant: &TenantId,
    id: &ResourceId,
    kind_schema: &KindSchema,
    doc: &Value,
    mask: &[String],
) -> Result<()> {
    let masked: Vec<String> = mask
        .iter()
        .filter(|path| kind_schema.edge(path).is_some())
        .cloned()
        .collect();
    if masked.is_empty() {
        return Ok(());
    }
    for edge in &masked {
        tx.execute(
            "DELETE FROM resource_edges WHERE from_id = ?1 AND edge = ?2",
            params![id.to_string(), edge],
        )?;
    }
    wire_edges(tx, tenant, id, kind_schema, doc, Some(&masked))
}

pub(crate) fn strong_ref_count(tx: &Transaction, id: &ResourceId) -> Result<u64> {
    let n: i64 = tx.query_row(
        "SELECT COUNT(*) FROM resource_edges WHERE to_id = ?1 AND strong = 1",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

/// Clear weak references into a deleted resource: null the edge field in
/// each referrer's payload and drop the edge rows.
fn clear_weak_refs(tx: &Transaction, target: &ResourceId) -> Result<()> {
    let mut stmt = tx.prepare(
        "SELECT from_id, edge FROM resource_edges WHERE to_id = ?1 AND strong = 0",
    )?;
    let referrers: Vec<(String, String)> = stmt
        .query_map([target.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<_>>()?;

    for (from_id, edge) in referrers {
        let payload: String = tx.query_row(
            "SELECT payload FROM resources WHERE id = ?1",
            [&from_id],
            |row| row.get(0),
        )?;
        let mut doc: Value = serde_json::from_str(&payload)?;
        doc[edge.as_str()] = Value::Null;
        tx.execute(
            "UPDATE resources SET payload = ?1 WHERE id = ?2",
            params![doc.to_string(), from_id],
        )?;
    }
    tx.execute(
        "DELETE FROM resource_edges WHERE to_id = ?1 AND strong = 0",
        [target.to_string()],
    )?;
    Ok(())
}

// ========== Query construction ==========

/// One query shape shared by List and Filter so counting and listing can
/// never diverge.
struct BuiltQuery {
    where_sql: String,
    params: Vec<rusqlite::types::Value>,
    order_sql: String,
    offset: u64,
    limit: u64,
}

impl BuiltQuery {
    fn build(tenant: &TenantId, request: &ResourceFilter) -> Result<Self> {
        let (offset, limit) = filter::validate_page(request.offset, request.limit)?;

        let mut where_sql = "r.tenant_id = ? AND r.kind = ?".to_string();
        let mut params: Vec<rusqlite::types::Value> = vec![
            tenant.as_str().to_string().into(),
            request.kind.as_str().to_string().into(),
        ];

        if let Some(text) = &request.filter {
            let expr = filter::parse(text)?;
            let SqlPredicate { sql, params: extra } = filter::compile(request.kind, &expr)?;
            where_sql.push_str(" AND ");
            where_sql.push_str(&sql);
            params.extend(extra.into_iter().map(rusqlite::types::Value::from));
        }

        let order_sql = match &request.order_by {
            Some(order_by) => filter::compile_order_by(request.kind, order_by)?,
            None => "ORDER BY r.created_at ASC, r.id ASC".to_string(),
        };

        Ok(Self {
            where_sql,
            params,
            order_sql,
            offset,
            limit,
        })
    }

    /// Total matching rows, ignoring pagination and order
    fn count(&self, tx: &Transaction) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM resources r WHERE {}", self.where_sql);
        let n: i64 = tx.query_row(&sql, params_from_iter(self.params.iter()), |row| row.get(0))?;
        Ok(n as u64)
    }

    fn select_rows(&self, tx: &Transaction) -> Result<Vec<StoredRow>> {
        let sql = format!(
            "SELECT r.id, r.tenant_id, r.kind, r.payload, r.created_at, r.updated_at \
             FROM resources r WHERE {} {} LIMIT {} OFFSET {}",
            self.where_sql, self.order_sql, self.limit, self.offset
        );
        let mut stmt = tx.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(self.params.iter()), row_to_stored)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn select_refs(&self, tx: &Transaction) -> Result<Vec<ResourceRef>> {
        let sql = format!(
            "SELECT r.id, r.tenant_id FROM resources r WHERE {} {} LIMIT {} OFFSET {}",
            self.where_sql, self.order_sql, self.limit, self.offset
        );
        let mut stmt = tx.prepare(&sql)?;
        let raw = stmt
            .query_map(params_from_iter(self.params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let mut refs = Vec::with_capacity(raw.len());
        for (id, tenant) in raw {
            refs.push(ResourceRef {
                tenant: TenantId::new(tenant),
                id: ResourceId::parse(&id)?,
            });
        }
        Ok(refs)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub resources: usize,
    pub fields: usize,
    pub edges: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Inventory Statistics:")?;
        writeln!(f, "  Resources: {}", self.resources)?;
        writeln!(f, "  Field rows: {}", self.fields)?;
        writeln!(f, "  Edge rows: {}", self.edges)
    }
}
