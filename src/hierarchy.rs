//! Hierarchy inheritance resolver
//!
//! Computes the effective attribute set of a resource by walking its
//! ancestor chain: instance → site (via the instance's host), site →
//! region, region → parent region. The walk is an iterative loop with a
//! hard step bound, never unbounded recursion: a cyclic or over-deep
//! region graph cannot hang a read, deeper ancestors are silently not
//! visited.
//!
//! Two bounds are kept apart on purpose so either inheritance feature can
//! change depth without touching the other (and without touching the
//! filter compiler's own hop limit).

use rusqlite::{OptionalExtension, Transaction};

use crate::ctx::CallContext;
use crate::id::{ResourceId, TenantId};
use crate::kind::ResourceKind;
use crate::resource::{MetadataPair, Resource};
use crate::store::sqlite::{fetch_row, hydrate};
use crate::store::{tx, InventoryStore};
use crate::Result;

/// Ancestor steps visited when resolving inherited metadata
pub const METADATA_ANCESTRY_DEPTH: usize = 5;

/// Ancestor steps visited when resolving inherited telemetry profiles
pub const TELEMETRY_ANCESTRY_DEPTH: usize = 5;

/// Effective metadata of a resource: its own pairs and the ancestor
/// stack, closest ancestor first. Keys are never merged or overridden;
/// display semantics belong to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHierarchy {
    pub own: Vec<MetadataPair>,
    pub inherited: Vec<MetadataPair>,
}

/// Read-side resolver over the inventory store
pub struct HierarchyResolver<'a> {
    store: &'a InventoryStore,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(store: &'a InventoryStore) -> Self {
        Self { store }
    }

    /// Effective metadata for an instance, site or region
    pub fn metadata_for(
        &self,
        ctx: &CallContext,
        tenant: &TenantId,
        id: &ResourceId,
    ) -> Result<MetadataHierarchy> {
        tx::read_tx(self.store.connection(), ctx, |tx| {
            let row = fetch_row(tx, tenant, id)?;
            let own = metadata_of(&row.doc);

            let mut inherited = Vec::new();
            for ancestor in ancestors(tx, tenant, id, METADATA_ANCESTRY_DEPTH)? {
                let ancestor_row = fetch_row(tx, tenant, &ancestor)?;
                inherited.extend(metadata_of(&ancestor_row.doc));
            }
            Ok(MetadataHierarchy { own, inherited })
        })
    }

    /// Telemetry logs profiles applying to a resource. Direct mode
    /// returns only profiles targeting the resource itself; inherited
    /// mode unions profiles targeting it and every ancestor within the
    /// depth bound, no per-key dedup.
    pub fn logs_profiles_for(
        &self,
        ctx: &CallContext,
        tenant: &TenantId,
        id: &ResourceId,
        inherited: bool,
    ) -> Result<Vec<Resource>> {
        self.profiles_for(ctx, tenant, id, inherited, ResourceKind::TelemetryLogsProfile)
    }

    /// Telemetry metrics profiles applying to a resource; same modes as
    /// [`Self::logs_profiles_for`]
    pub fn metrics_profiles_for(
        &self,
        ctx: &CallContext,
        tenant: &TenantId,
        id: &ResourceId,
        inherited: bool,
    ) -> Result<Vec<Resource>> {
        self.profiles_for(
            ctx,
            tenant,
            id,
            inherited,
            ResourceKind::TelemetryMetricsProfile,
        )
    }

    fn profiles_for(
        &self,
        ctx: &CallContext,
        tenant: &TenantId,
        id: &ResourceId,
        inherited: bool,
        profile_kind: ResourceKind,
    ) -> Result<Vec<Resource>> {
        tx::read_tx(self.store.connection(), ctx, |tx| {
            // The target must exist even when nothing points at it.
            fetch_row(tx, tenant, id)?;

            let mut targets = vec![id.clone()];
            if inherited {
                targets.extend(ancestors(tx, tenant, id, TELEMETRY_ANCESTRY_DEPTH)?);
            }

            let mut profiles = Vec::new();
            for target in &targets {
                for profile_id in profiles_targeting(tx, target, profile_kind)? {
                    profiles.push(hydrate(fetch_row(tx, tenant, &profile_id)?)?);
                }
            }
            Ok(profiles)
        })
    }
}

/// Directly-attached metadata pairs of a stored document
fn metadata_of(doc: &serde_json::Value) -> Vec<MetadataPair> {
    doc.get("metadata")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Collect up to `depth` ancestors, closest first
fn ancestors(
    tx: &Transaction,
    tenant: &TenantId,
    id: &ResourceId,
    depth: usize,
) -> Result<Vec<ResourceId>> {
    let mut chain = Vec::new();
    let mut current = id.clone();
    for _ in 0..depth {
        match parent_of(tx, tenant, &current)? {
            Some(parent) => {
                chain.push(parent.clone());
                current = parent;
            }
            None => break,
        }
    }
    Ok(chain)
}

/// The immediate parent in the location hierarchy, if any
fn parent_of(
    tx: &Transaction,
    tenant: &TenantId,
    id: &ResourceId,
) -> Result<Option<ResourceId>> {
    let parent = match id.kind() {
        // An instance's location is its host's site.
        ResourceKind::Instance => match edge_target(tx, id, "host")? {
            Some(host) => edge_target(tx, &host, "site")?,
            None => None,
        },
        ResourceKind::Site => edge_target(tx, id, "region")?,
        ResourceKind::Region => edge_target(tx, id, "parent_region")?,
        _ => None,
    };
    // Edges are wired tenant-scoped, but a stale id must not leak across
    // tenants through the read path either.
    match parent {
        Some(parent) => {
            let visible: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM resources WHERE id = ?1 AND tenant_id = ?2",
                    rusqlite::params![parent.to_string(), tenant.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(visible.map(|_| parent))
        }
        None => Ok(None),
    }
}

fn edge_target(tx: &Transaction, from: &ResourceId, edge: &str) -> Result<Option<ResourceId>> {
    let to: Option<String> = tx
        .query_row(
            "SELECT to_id FROM resource_edges WHERE from_id = ?1 AND edge = ?2",
            rusqlite::params![from.to_string(), edge],
            |row| row.get(0),
        )
        .optional()?;
    match to {
        Some(to) => Ok(Some(ResourceId::parse(&to)?)),
        None => Ok(None),
    }
}

/// Ids of profiles of `profile_kind` whose target edge points at `target`
fn profiles_targeting(
    tx: &Transaction,
    target: &ResourceId,
    profile_kind: ResourceKind,
) -> Result<Vec<ResourceId>> {
    let mut stmt = tx.prepare(
        "SELECT from_id FROM resource_edges \
         WHERE to_id = ?1 AND edge IN ('target_instance', 'target_site', 'target_region') \
         ORDER BY from_id",
    )?;
    let from_ids: Vec<String> = stmt
        .query_map([target.to_string()], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let mut ids = Vec::new();
    for from in from_ids {
        let id = ResourceId::parse(&from)?;
        if id.kind() == profile_kind {
            ids.push(id);
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{
        Host, Instance, Payload, Region, Site, TelemetryLogsGroup, TelemetryLogsProfile,
        TelemetryMetricsGroup, TelemetryMetricsProfile,
    };

    fn ctx() -> CallContext {
        CallContext::background()
    }

    fn tenant() -> TenantId {
        TenantId::new("tenant-a")
    }

    fn create(store: &mut InventoryStore, payload: Payload) -> ResourceId {
        store
            .create(&ctx(), &tenant(), Resource::new(payload))
            .unwrap()
            .id
            .unwrap()
    }

    #[test]
    fn test_site_inherits_region_stack_closest_first() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        let r1 = create(
            &mut store,
            Payload::Region(Region::new("r1").with_metadata("k", "v")),
        );
        let r2 = create(
            &mut store,
            Payload::Region(Region::new("r2").with_parent(r1).with_metadata("k2", "v2")),
        );
        let site = create(&mut store, Payload::Site(Site::new("s").with_region(r2)));

        let resolver = HierarchyResolver::new(&store);
        let hierarchy = resolver.metadata_for(&ctx(), &tenant(), &site).unwrap();
        assert!(hierarchy.own.is_empty());
        assert_eq!(
            hierarchy.inherited,
            vec![MetadataPair::new("k2", "v2"), MetadataPair::new("k", "v")]
        );
    }

    #[test]
    fn test_own_metadata_kept_apart_from_inherited() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        let region = create(
            &mut store,
            Payload::Region(Region::new("r").with_metadata("tier", "gold")),
        );
        let site = create(
            &mut store,
            Payload::Site(Site::new("s").with_region(region).with_metadata("env", "dev")),
        );

        let resolver = HierarchyResolver::new(&store);
        let hierarchy = resolver.metadata_for(&ctx(), &tenant(), &site).unwrap();
        assert_eq!(hierarchy.own, vec![MetadataPair::new("env", "dev")]);
        assert_eq!(hierarchy.inherited, vec![MetadataPair::new("tier", "gold")]);
    }

    #[test]
    fn test_instance_walks_through_host_site() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        let region = create(
            &mut store,
            Payload::Region(Region::new("r").with_metadata("k", "v")),
        );
        let site = create(
            &mut store,
            Payload::Site(Site::new("s").with_region(region).with_metadata("k2", "v2")),
        );
        let host = create(
            &mut store,
            Payload::Host(Host::new("edge-1", "SN1", "uuid-1").with_site(site)),
        );
        let instance = create(&mut store, Payload::Instance(Instance::new("vm-1", host)));

        let resolver = HierarchyResolver::new(&store);
        let hierarchy = resolver.metadata_for(&ctx(), &tenant(), &instance).unwrap();
        assert!(hierarchy.own.is_empty());
        assert_eq!(
            hierarchy.inherited,
            vec![MetadataPair::new("k2", "v2"), MetadataPair::new("k", "v")]
        );
    }

    #[test]
    fn test_metadata_walk_stops_at_depth_bound() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        // Chain of 7 regions, outermost first; each carries one pair.
        let mut parent: Option<ResourceId> = None;
        for level in 1..=7 {
            let mut region =
                Region::new(format!("r{level}")).with_metadata("level", level.to_string());
            if let Some(p) = parent.clone() {
                region = region.with_parent(p);
            }
            parent = Some(create(&mut store, Payload::Region(region)));
        }
        let site = create(
            &mut store,
            Payload::Site(Site::new("leaf").with_region(parent.unwrap())),
        );

        let resolver = HierarchyResolver::new(&store);
        let hierarchy = resolver.metadata_for(&ctx(), &tenant(), &site).unwrap();
        // Levels 7..3 are reachable within the bound; 2 and 1 are not.
        assert_eq!(hierarchy.inherited.len(), METADATA_ANCESTRY_DEPTH);
        assert_eq!(hierarchy.inherited[0], MetadataPair::new("level", "7"));
        assert_eq!(
            hierarchy.inherited[METADATA_ANCESTRY_DEPTH - 1],
            MetadataPair::new("level", "3")
        );
    }

    #[test]
    fn test_logs_profiles_direct_vs_inherited() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        let region = create(&mut store, Payload::Region(Region::new("r")));
        let site = create(
            &mut store,
            Payload::Site(Site::new("s").with_region(region.clone())),
        );
        let group = create(
            &mut store,
            Payload::TelemetryLogsGroup(TelemetryLogsGroup::new("kernel")),
        );
        create(
            &mut store,
            Payload::TelemetryLogsProfile(
                TelemetryLogsProfile::new(group.clone()).targeting_site(site.clone()),
            ),
        );
        create(
            &mut store,
            Payload::TelemetryLogsProfile(
                TelemetryLogsProfile::new(group).targeting_region(region),
            ),
        );

        let resolver = HierarchyResolver::new(&store);
        let direct = resolver
            .logs_profiles_for(&ctx(), &tenant(), &site, false)
            .unwrap();
        assert_eq!(direct.len(), 1);

        let inherited = resolver
            .logs_profiles_for(&ctx(), &tenant(), &site, true)
            .unwrap();
        assert_eq!(inherited.len(), 2);
    }

    #[test]
    fn test_telemetry_depth_cutoff() {
        let mut store = InventoryStore::open_in_memory().unwrap();
        let group = create(
            &mut store,
            Payload::TelemetryMetricsGroup(TelemetryMetricsGroup::new("cpu")),
        );
        // Chain of 6 regions; the outermost (level 1) is beyond the bound
        // from the leaf site. Every region carries one profile.
        let mut parent: Option<ResourceId> = None;
        for _ in 1..=6 {
            let mut region = Region::new("r");
            if let Some(p) = parent.clone() {
                region = region.with_parent(p);
            }
            let region_id = create(&mut store, Payload::Region(region));
            create(
                &mut store,
                Payload::TelemetryMetricsProfile(
                    TelemetryMetricsProfile::new(group.clone(), 30)
                        .targeting_region(region_id.clone()),
                ),
            );
            parent = Some(region_id);
        }
        let site = create(
            &mut store,
            Payload::Site(Site::new("leaf").with_region(parent.unwrap())),
        );

        let resolver = HierarchyResolver::new(&store);
        // Nothing targets the site itself.
        let direct = resolver
            .metrics_profiles_for(&ctx(), &tenant(), &site, false)
            .unwrap();
        assert!(direct.is_empty());

        // Five region levels are reachable; the sixth is beyond the bound.
        let inherited = resolver
            .metrics_profiles_for(&ctx(), &tenant(), &site, true)
            .unwrap();
        assert_eq!(inherited.len(), TELEMETRY_ANCESTRY_DEPTH);
    }

    #[test]
    fn test_unknown_target_is_not_found() {
        let store = InventoryStore::open_in_memory().unwrap();
        let resolver = HierarchyResolver::new(&store);
        let ghost = ResourceId::generate(ResourceKind::Site);
        assert!(matches!(
            resolver.metadata_for(&ctx(), &tenant(), &ghost),
            Err(crate::Error::NotFound(_))
        ));
    }
}
