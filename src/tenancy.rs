//! Tenant lifecycle - bulk per-tenant deletion for offboarding
//!
//! Tears down every resource a tenant owns, kind by kind, each kind in
//! one transaction. The per-resource strong-reference checks of the CRUD
//! engine are bypassed on purpose: offboarding removes the whole
//! dependency graph, and the built-in kind order only keeps a single
//! bulk pass self-consistent - callers driving kinds individually own
//! the ordering.

use rusqlite::{params, Transaction};

use crate::ctx::CallContext;
use crate::id::TenantId;
use crate::kind::ResourceKind;
use crate::resource::Resource;
use crate::store::sqlite::{hydrate, row_to_stored};
use crate::store::{tx, InventoryStore};
use crate::Result;

/// Audit marker attached to every resource removed during teardown.
/// Tenant teardown always removes rows outright, including kinds whose
/// single-resource Delete only tombstones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionKind {
    Hard,
}

/// Kinds in children-before-parents order, so one full pass never leaves
/// a strong edge pointing at a removed row.
const TEARDOWN_ORDER: &[ResourceKind] = &[
    ResourceKind::WorkloadMember,
    ResourceKind::OsUpdateRun,
    ResourceKind::HostDevice,
    ResourceKind::TelemetryLogsProfile,
    ResourceKind::TelemetryMetricsProfile,
    ResourceKind::Instance,
    ResourceKind::Workload,
    ResourceKind::OsUpdatePolicy,
    ResourceKind::SingleSchedule,
    ResourceKind::RepeatedSchedule,
    ResourceKind::Host,
    ResourceKind::CustomConfig,
    ResourceKind::TelemetryLogsGroup,
    ResourceKind::TelemetryMetricsGroup,
    ResourceKind::LocalAccount,
    ResourceKind::OsResource,
    ResourceKind::Provider,
    ResourceKind::Site,
    ResourceKind::Region,
];

/// Write-side teardown operations over the inventory store
pub struct TenantLifecycle<'a> {
    store: &'a mut InventoryStore,
}

impl<'a> TenantLifecycle<'a> {
    pub fn new(store: &'a mut InventoryStore) -> Self {
        Self { store }
    }

    /// Delete every resource of one kind the tenant owns, returning the
    /// pre-delete envelopes tagged for audit
    pub fn delete_all_of_kind(
        &mut self,
        ctx: &CallContext,
        tenant: &TenantId,
        kind: ResourceKind,
    ) -> Result<Vec<(DeletionKind, Resource)>> {
        tx::write_tx(self.store.connection_mut(), ctx, |tx| {
            let envelopes = capture_envelopes(tx, tenant, kind)?;
            let scope = "SELECT id FROM resources WHERE tenant_id = ?1 AND kind = ?2";
            tx.execute(
                &format!("DELETE FROM resource_fields WHERE resource_id IN ({scope})"),
                params![tenant.as_str(), kind.as_str()],
            )?;
            tx.execute(
                &format!(
                    "DELETE FROM resource_edges WHERE from_id IN ({scope}) OR to_id IN ({scope})"
                ),
                params![tenant.as_str(), kind.as_str()],
            )?;
            tx.execute(
                "DELETE FROM resources WHERE tenant_id = ?1 AND kind = ?2",
                params![tenant.as_str(), kind.as_str()],
            )?;
            if !envelopes.is_empty() {
                tracing::info!(
                    "tenant {} teardown removed {} {} resources",
                    tenant,
                    envelopes.len(),
                    kind
                );
            }
            Ok(envelopes)
        })
    }

    /// Delete everything the tenant owns, kind by kind in
    /// [`TEARDOWN_ORDER`]
    pub fn delete_all(
        &mut self,
        ctx: &CallContext,
        tenant: &TenantId,
    ) -> Result<Vec<(DeletionKind, Resource)>> {
        let mut deleted = Vec::new();
        for kind in TEARDOWN_ORDER {
            deleted.extend(self.delete_all_of_kind(ctx, tenant, *kind)?);
        }
        Ok(deleted)
    }
}

fn capture_envelopes(
    tx: &Transaction,
    tenant: &TenantId,
    kind: ResourceKind,
) -> Result<Vec<(DeletionKind, Resource)>> {
    let mut stmt = tx.prepare(
        "SELECT id, tenant_id, kind, payload, created_at, updated_at \
         FROM resources WHERE tenant_id = ?1 AND kind = ?2 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![tenant.as_str(), kind.as_str()], row_to_stored)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut envelopes = Vec::with_capacity(rows.len());
    for row in rows {
        envelopes.push((DeletionKind::Hard, hydrate(row)?));
    }
    Ok(envelopes)
}
