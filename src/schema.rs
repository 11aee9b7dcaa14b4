//! Per-kind resource schemas - the dispatch table of the store
//!
//! One `KindSchema` per resource kind declares:
//! - the filterable fields with their semantic type and enum symbols
//! - the edges with strength, target kind and create-time requirements
//! - the immutable field/edge set enforced on Update
//! - the order-by allow-list
//! - the deletion policy (hard vs. tombstoned-then-reconciled)
//!
//! The CRUD engine, the predicate compiler and the validators all consult
//! this table instead of hard-coding per-kind knowledge. Field values are
//! projected out of the payload's JSON document into `resource_fields`
//! rows in a canonical text encoding (u64 zero-padded to 20 digits so
//! lexicographic order is numeric, booleans as `true`/`false`, enums by
//! symbolic name, metadata pairs as `key=value`).

use crate::id::ResourceId;
use crate::kind::ResourceKind;
use crate::{Error, Result};
use serde_json::Value;

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Free-form string
    Str,
    /// Closed set of symbolic names
    Enum,
    /// Unsigned 64-bit integer (timestamps, intervals)
    Uint,
    /// Boolean
    Bool,
    /// Set of strings; one field row per element
    StrSet,
    /// Set of `{key, value}` pairs; one `key=value` row per element
    PairSet,
}

/// A declared field of a resource kind
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ftype: FieldType,
    /// Rejected when named in an update mask
    pub immutable: bool,
    /// Valid symbols for `FieldType::Enum`, empty otherwise
    pub enum_values: &'static [&'static str],
}

const fn field(name: &'static str, ftype: FieldType) -> FieldDef {
    FieldDef {
        name,
        ftype,
        immutable: false,
        enum_values: &[],
    }
}

const fn immutable(name: &'static str, ftype: FieldType) -> FieldDef {
    FieldDef {
        name,
        ftype,
        immutable: true,
        enum_values: &[],
    }
}

const fn enum_field(name: &'static str, values: &'static [&'static str]) -> FieldDef {
    FieldDef {
        name,
        ftype: FieldType::Enum,
        immutable: false,
        enum_values: values,
    }
}

/// A declared edge of a resource kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDef {
    pub name: &'static str,
    pub target: ResourceKind,
    /// Strong edges block deletion of their target
    pub strong: bool,
    /// Must be wired at create
    pub required: bool,
    /// Rejected when named in an update mask
    pub immutable: bool,
}

const fn edge(name: &'static str, target: ResourceKind, strong: bool) -> EdgeDef {
    EdgeDef {
        name,
        target,
        strong,
        required: false,
        immutable: false,
    }
}

const fn required_edge(name: &'static str, target: ResourceKind) -> EdgeDef {
    EdgeDef {
        name,
        target,
        strong: true,
        required: true,
        immutable: true,
    }
}

const fn immutable_edge(name: &'static str, target: ResourceKind) -> EdgeDef {
    EdgeDef {
        name,
        target,
        strong: true,
        required: false,
        immutable: true,
    }
}

/// How Delete treats a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Remove the row after the strong-reference check
    Hard,
    /// Set `desired_state = DELETED`; an external reconciler removes the
    /// row once the machine is gone
    SoftThenReconciled,
}

/// The full declared shape of one resource kind
#[derive(Debug)]
pub struct KindSchema {
    pub kind: ResourceKind,
    pub fields: &'static [FieldDef],
    pub edges: &'static [EdgeDef],
    /// Field names valid in `order_by`, in addition to the core columns
    pub order_by: &'static [&'static str],
    pub deletion: DeletionPolicy,
}

/// Core columns every kind can order by
pub const CORE_ORDER_COLUMNS: &[&str] = &["resource_id", "created_at", "updated_at"];

const HOST_STATES: &[&str] = &["REGISTERED", "ONBOARDED", "DELETED"];
const INSTANCE_STATES: &[&str] = &["RUNNING", "UNTRUSTED", "DELETED"];
const DEVICE_KINDS: &[&str] = &["GPU", "NIC", "STORAGE", "USB"];
const SECURITY_FEATURES: &[&str] = &["NONE", "SECURE_BOOT_AND_FDE"];
const OS_TYPES: &[&str] = &["MUTABLE", "IMMUTABLE"];
const UPDATE_POLICY_MODES: &[&str] = &["TARGET", "LATEST"];
const UPDATE_RUN_STATUSES: &[&str] = &["PLANNED", "IN_PROGRESS", "COMPLETED", "FAILED"];
const WORKLOAD_KINDS: &[&str] = &["CLUSTER", "DHCP"];
const MEMBER_KINDS: &[&str] = &["CLUSTER_NODE"];
const COLLECTOR_KINDS: &[&str] = &["HOST", "CLUSTER"];
const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARN", "ERROR"];
const PROVIDER_KINDS: &[&str] = &["BAREMETAL"];
const SCHEDULE_STATUSES: &[&str] = &["MAINTENANCE", "OS_UPDATE"];

static HOST: KindSchema = KindSchema {
    kind: ResourceKind::Host,
    fields: &[
        field("name", FieldType::Str),
        immutable("serial_number", FieldType::Str),
        immutable("uuid", FieldType::Str),
        enum_field("desired_state", HOST_STATES),
        enum_field("current_state", HOST_STATES),
        field("note", FieldType::Str),
    ],
    edges: &[
        edge("site", ResourceKind::Site, true),
        edge("provider", ResourceKind::Provider, true),
    ],
    order_by: &["name", "serial_number"],
    deletion: DeletionPolicy::SoftThenReconciled,
};

static HOST_DEVICE: KindSchema = KindSchema {
    kind: ResourceKind::HostDevice,
    fields: &[
        field("name", FieldType::Str),
        immutable("pci_address", FieldType::Str),
        enum_field("device_kind", DEVICE_KINDS),
    ],
    edges: &[required_edge("host", ResourceKind::Host)],
    order_by: &["name", "pci_address"],
    deletion: DeletionPolicy::Hard,
};

static SITE: KindSchema = KindSchema {
    kind: ResourceKind::Site,
    fields: &[
        field("name", FieldType::Str),
        field("address", FieldType::Str),
        field("metadata", FieldType::PairSet),
    ],
    edges: &[edge("region", ResourceKind::Region, true)],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static REGION: KindSchema = KindSchema {
    kind: ResourceKind::Region,
    fields: &[
        field("name", FieldType::Str),
        field("metadata", FieldType::PairSet),
    ],
    edges: &[edge("parent_region", ResourceKind::Region, true)],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static INSTANCE: KindSchema = KindSchema {
    kind: ResourceKind::Instance,
    fields: &[
        field("name", FieldType::Str),
        enum_field("desired_state", INSTANCE_STATES),
        enum_field("current_state", INSTANCE_STATES),
    ],
    edges: &[
        required_edge("host", ResourceKind::Host),
        edge("desired_os", ResourceKind::OsResource, true),
        edge("custom_config", ResourceKind::CustomConfig, true),
    ],
    order_by: &["name"],
    deletion: DeletionPolicy::SoftThenReconciled,
};

static OS_RESOURCE: KindSchema = KindSchema {
    kind: ResourceKind::OsResource,
    fields: &[
        field("name", FieldType::Str),
        field("profile_name", FieldType::Str),
        field("image_url", FieldType::Str),
        immutable("image_id", FieldType::Str),
        immutable("sha256", FieldType::Str),
        enum_field("security_feature", SECURITY_FEATURES),
        enum_field("os_type", OS_TYPES),
    ],
    edges: &[],
    order_by: &["name", "profile_name"],
    deletion: DeletionPolicy::Hard,
};

static OS_UPDATE_POLICY: KindSchema = KindSchema {
    kind: ResourceKind::OsUpdatePolicy,
    fields: &[
        field("name", FieldType::Str),
        field("description", FieldType::Str),
        field("install_packages", FieldType::Str),
        field("update_sources", FieldType::StrSet),
        field("kernel_command", FieldType::Str),
        enum_field("update_policy", UPDATE_POLICY_MODES),
    ],
    edges: &[immutable_edge("target_os", ResourceKind::OsResource)],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static OS_UPDATE_RUN: KindSchema = KindSchema {
    kind: ResourceKind::OsUpdateRun,
    fields: &[
        field("name", FieldType::Str),
        field("description", FieldType::Str),
        enum_field("status", UPDATE_RUN_STATUSES),
        field("status_details", FieldType::Str),
        immutable("start_time", FieldType::Uint),
        field("end_time", FieldType::Uint),
    ],
    edges: &[
        required_edge("applied_policy", ResourceKind::OsUpdatePolicy),
        required_edge("instance", ResourceKind::Instance),
    ],
    order_by: &["name", "start_time"],
    deletion: DeletionPolicy::Hard,
};

static WORKLOAD: KindSchema = KindSchema {
    kind: ResourceKind::Workload,
    fields: &[
        field("name", FieldType::Str),
        enum_field("workload_kind", WORKLOAD_KINDS),
        field("status", FieldType::Str),
    ],
    edges: &[],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static WORKLOAD_MEMBER: KindSchema = KindSchema {
    kind: ResourceKind::WorkloadMember,
    fields: &[enum_field("member_kind", MEMBER_KINDS)],
    edges: &[
        required_edge("workload", ResourceKind::Workload),
        required_edge("instance", ResourceKind::Instance),
    ],
    order_by: &[],
    deletion: DeletionPolicy::Hard,
};

static TELEMETRY_LOGS_GROUP: KindSchema = KindSchema {
    kind: ResourceKind::TelemetryLogsGroup,
    fields: &[
        field("name", FieldType::Str),
        enum_field("collector_kind", COLLECTOR_KINDS),
        field("groups", FieldType::StrSet),
    ],
    edges: &[],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static TELEMETRY_LOGS_PROFILE: KindSchema = KindSchema {
    kind: ResourceKind::TelemetryLogsProfile,
    fields: &[enum_field("log_level", LOG_LEVELS)],
    edges: &[
        required_edge("group", ResourceKind::TelemetryLogsGroup),
        edge("target_instance", ResourceKind::Instance, false),
        edge("target_site", ResourceKind::Site, false),
        edge("target_region", ResourceKind::Region, false),
    ],
    order_by: &["log_level"],
    deletion: DeletionPolicy::Hard,
};

static TELEMETRY_METRICS_GROUP: KindSchema = KindSchema {
    kind: ResourceKind::TelemetryMetricsGroup,
    fields: &[
        field("name", FieldType::Str),
        enum_field("collector_kind", COLLECTOR_KINDS),
        field("groups", FieldType::StrSet),
    ],
    edges: &[],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static TELEMETRY_METRICS_PROFILE: KindSchema = KindSchema {
    kind: ResourceKind::TelemetryMetricsProfile,
    fields: &[field("metrics_interval", FieldType::Uint)],
    edges: &[
        required_edge("group", ResourceKind::TelemetryMetricsGroup),
        edge("target_instance", ResourceKind::Instance, false),
        edge("target_site", ResourceKind::Site, false),
        edge("target_region", ResourceKind::Region, false),
    ],
    order_by: &["metrics_interval"],
    deletion: DeletionPolicy::Hard,
};

static LOCAL_ACCOUNT: KindSchema = KindSchema {
    kind: ResourceKind::LocalAccount,
    fields: &[
        immutable("username", FieldType::Str),
        immutable("ssh_key", FieldType::Str),
    ],
    edges: &[],
    order_by: &["username"],
    deletion: DeletionPolicy::Hard,
};

static PROVIDER: KindSchema = KindSchema {
    kind: ResourceKind::Provider,
    fields: &[
        immutable("name", FieldType::Str),
        enum_field("provider_kind", PROVIDER_KINDS),
        field("api_endpoint", FieldType::Str),
        field("api_credentials", FieldType::StrSet),
        field("auto_onboard", FieldType::Bool),
    ],
    edges: &[],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static SINGLE_SCHEDULE: KindSchema = KindSchema {
    kind: ResourceKind::SingleSchedule,
    fields: &[
        field("name", FieldType::Str),
        enum_field("schedule_status", SCHEDULE_STATUSES),
        field("start_seconds", FieldType::Uint),
        field("end_seconds", FieldType::Uint),
    ],
    edges: &[
        edge("target_host", ResourceKind::Host, false),
        edge("target_site", ResourceKind::Site, false),
        edge("target_region", ResourceKind::Region, false),
    ],
    order_by: &["name", "start_seconds"],
    deletion: DeletionPolicy::Hard,
};

static REPEATED_SCHEDULE: KindSchema = KindSchema {
    kind: ResourceKind::RepeatedSchedule,
    fields: &[
        field("name", FieldType::Str),
        enum_field("schedule_status", SCHEDULE_STATUSES),
        field("duration_seconds", FieldType::Uint),
        field("cron_minutes", FieldType::Str),
        field("cron_hours", FieldType::Str),
        field("cron_day_month", FieldType::Str),
        field("cron_month", FieldType::Str),
        field("cron_day_week", FieldType::Str),
    ],
    edges: &[
        edge("target_host", ResourceKind::Host, false),
        edge("target_site", ResourceKind::Site, false),
        edge("target_region", ResourceKind::Region, false),
    ],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

static CUSTOM_CONFIG: KindSchema = KindSchema {
    kind: ResourceKind::CustomConfig,
    fields: &[
        immutable("name", FieldType::Str),
        field("description", FieldType::Str),
        immutable("config", FieldType::Str),
    ],
    edges: &[],
    order_by: &["name"],
    deletion: DeletionPolicy::Hard,
};

/// Look up the schema entry for a kind
pub fn schema_for(kind: ResourceKind) -> &'static KindSchema {
    match kind {
        ResourceKind::Host => &HOST,
        ResourceKind::HostDevice => &HOST_DEVICE,
        ResourceKind::Site => &SITE,
        ResourceKind::Region => &REGION,
        ResourceKind::Instance => &INSTANCE,
        ResourceKind::OsResource => &OS_RESOURCE,
        ResourceKind::OsUpdatePolicy => &OS_UPDATE_POLICY,
        ResourceKind::OsUpdateRun => &OS_UPDATE_RUN,
        ResourceKind::Workload => &WORKLOAD,
        ResourceKind::WorkloadMember => &WORKLOAD_MEMBER,
        ResourceKind::TelemetryLogsGroup => &TELEMETRY_LOGS_GROUP,
        ResourceKind::TelemetryLogsProfile => &TELEMETRY_LOGS_PROFILE,
        ResourceKind::TelemetryMetricsGroup => &TELEMETRY_METRICS_GROUP,
        ResourceKind::TelemetryMetricsProfile => &TELEMETRY_METRICS_PROFILE,
        ResourceKind::LocalAccount => &LOCAL_ACCOUNT,
        ResourceKind::Provider => &PROVIDER,
        ResourceKind::SingleSchedule => &SINGLE_SCHEDULE,
        ResourceKind::RepeatedSchedule => &REPEATED_SCHEDULE,
        ResourceKind::CustomConfig => &CUSTOM_CONFIG,
    }
}

impl KindSchema {
    /// Look up a declared field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a declared edge by name
    pub fn edge(&self, name: &str) -> Option<&EdgeDef> {
        self.edges.iter().find(|e| e.name == name)
    }

    /// Whether `column` may appear in order_by for this kind
    pub fn orderable(&self, column: &str) -> bool {
        CORE_ORDER_COLUMNS.contains(&column) || self.order_by.contains(&column)
    }
}

/// Canonical text encoding of a u64 so lexicographic order is numeric
pub fn encode_uint(v: u64) -> String {
    format!("{:020}", v)
}

/// One projected `resource_fields` row
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub field: &'static str,
    pub value: String,
}

/// Project the declared fields of a payload document into canonical rows.
///
/// Set-typed fields produce one row per element; everything else exactly
/// one row. The document is the full serialization of the typed payload,
/// so a missing key is an internal inconsistency, not caller input.
pub fn extract_fields(schema: &KindSchema, doc: &Value) -> Result<Vec<FieldRow>> {
    let mut rows = Vec::new();
    for fdef in schema.fields {
        let value = doc.get(fdef.name).ok_or_else(|| {
            Error::Internal(format!(
                "{} document missing field {}",
                schema.kind, fdef.name
            ))
        })?;
        match fdef.ftype {
            FieldType::Str | FieldType::Enum => {
                let s = value.as_str().ok_or_else(|| bad_doc(schema, fdef.name))?;
                rows.push(FieldRow {
                    field: fdef.name,
                    value: s.to_string(),
                });
            }
            FieldType::Uint => {
                let n = value.as_u64().ok_or_else(|| bad_doc(schema, fdef.name))?;
                rows.push(FieldRow {
                    field: fdef.name,
                    value: encode_uint(n),
                });
            }
            FieldType::Bool => {
                let b = value.as_bool().ok_or_else(|| bad_doc(schema, fdef.name))?;
                rows.push(FieldRow {
                    field: fdef.name,
                    value: b.to_string(),
                });
            }
            FieldType::StrSet => {
                let items = value.as_array().ok_or_else(|| bad_doc(schema, fdef.name))?;
                for item in items {
                    let s = item.as_str().ok_or_else(|| bad_doc(schema, fdef.name))?;
                    rows.push(FieldRow {
                        field: fdef.name,
                        value: s.to_string(),
                    });
                }
            }
            FieldType::PairSet => {
                let items = value.as_array().ok_or_else(|| bad_doc(schema, fdef.name))?;
                for item in items {
                    let key = item
                        .get("key")
                        .and_then(Value::as_str)
                        .ok_or_else(|| bad_doc(schema, fdef.name))?;
                    let val = item
                        .get("value")
                        .and_then(Value::as_str)
                        .ok_or_else(|| bad_doc(schema, fdef.name))?;
                    rows.push(FieldRow {
                        field: fdef.name,
                        value: format!("{}={}", key, val),
                    });
                }
            }
        }
    }
    Ok(rows)
}

fn bad_doc(schema: &KindSchema, field: &str) -> Error {
    Error::Internal(format!(
        "{} document field {} has unexpected type",
        schema.kind, field
    ))
}

/// One wired edge extracted from a payload document
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRef {
    pub edge: &'static EdgeDef,
    pub target: ResourceId,
}

/// Extract the wired (non-null) edges of a payload document
pub fn extract_edges(schema: &KindSchema, doc: &Value) -> Result<Vec<EdgeRef>> {
    let mut refs = Vec::new();
    for edef in schema.edges {
        match doc.get(edef.name) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) => {
                let target = ResourceId::parse(s)?;
                if target.kind() != edef.target {
                    return Err(Error::InvalidArgument(format!(
                        "{}: edge {} expects a {} id, got {}",
                        schema.kind, edef.name, edef.target, target
                    )));
                }
                refs.push(EdgeRef { edge: edef, target });
            }
            Some(_) => return Err(bad_doc(schema, edef.name)),
        }
    }
    Ok(refs)
}

/// Apply a field mask: copy each named field/edge from `src` onto `stored`.
///
/// Unknown paths and paths naming an immutable field or edge are rejected
/// regardless of what else the mask contains.
pub fn apply_field_mask(
    schema: &KindSchema,
    stored: &mut Value,
    src: &Value,
    mask: &[String],
) -> Result<()> {
    if mask.is_empty() {
        return Err(Error::invalid(schema.kind, "update requires a field mask"));
    }
    let stored_map = match stored {
        Value::Object(map) => map,
        _ => return Err(Error::Internal("stored payload is not an object".into())),
    };
    for path in mask {
        let immutable = match (schema.field(path), schema.edge(path)) {
            (Some(f), _) => f.immutable,
            (None, Some(e)) => e.immutable,
            (None, None) => {
                return Err(Error::invalid(
                    schema.kind,
                    format!("unknown field mask path {}", path),
                ));
            }
        };
        if immutable {
            return Err(Error::invalid(
                schema.kind,
                format!("field {} is immutable", path),
            ));
        }
        let incoming = src.get(path.as_str()).cloned().unwrap_or(Value::Null);
        stored_map.insert(path.clone(), incoming);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{Host, Payload, Provider, Site};

    #[test]
    fn test_every_kind_has_a_schema() {
        for kind in ResourceKind::all() {
            let schema = schema_for(*kind);
            assert_eq!(schema.kind, *kind);
        }
    }

    #[test]
    fn test_field_and_edge_names_disjoint() {
        for kind in ResourceKind::all() {
            let schema = schema_for(*kind);
            for f in schema.fields {
                assert!(
                    schema.edge(f.name).is_none(),
                    "{}: {} is both field and edge",
                    kind,
                    f.name
                );
            }
        }
    }

    #[test]
    fn test_order_by_entries_are_declared_fields() {
        for kind in ResourceKind::all() {
            let schema = schema_for(*kind);
            for col in schema.order_by {
                assert!(
                    schema.field(col).is_some(),
                    "{}: order_by column {} not a declared field",
                    kind,
                    col
                );
            }
        }
    }

    #[test]
    fn test_extract_scalar_and_enum_fields() {
        let host = Host::new("edge-1", "SN9", "uuid-9");
        let doc = Payload::Host(host).to_document().unwrap();
        let rows = extract_fields(&HOST, &doc).unwrap();
        assert!(rows.contains(&FieldRow {
            field: "name",
            value: "edge-1".to_string()
        }));
        assert!(rows.contains(&FieldRow {
            field: "desired_state",
            value: "REGISTERED".to_string()
        }));
    }

    #[test]
    fn test_extract_pair_set() {
        let site = Site::new("lab").with_metadata("env", "dev");
        let doc = Payload::Site(site).to_document().unwrap();
        let rows = extract_fields(&SITE, &doc).unwrap();
        assert!(rows.contains(&FieldRow {
            field: "metadata",
            value: "env=dev".to_string()
        }));
    }

    #[test]
    fn test_extract_bool_field() {
        let mut provider = Provider::new("intel");
        provider.auto_onboard = true;
        let doc = Payload::Provider(provider).to_document().unwrap();
        let rows = extract_fields(&PROVIDER, &doc).unwrap();
        assert!(rows.contains(&FieldRow {
            field: "auto_onboard",
            value: "true".to_string()
        }));
    }

    #[test]
    fn test_uint_encoding_orders_numerically() {
        assert!(encode_uint(2) < encode_uint(10));
        assert!(encode_uint(999) < encode_uint(1_000_000));
    }

    #[test]
    fn test_extract_edges_checks_target_kind() {
        let bogus = ResourceId::generate(ResourceKind::Workload);
        let host = Host::new("edge-1", "SN9", "uuid-9");
        let mut doc = Payload::Host(host).to_document().unwrap();
        doc["site"] = Value::String(bogus.to_string());
        assert!(extract_edges(&HOST, &doc).is_err());
    }

    #[test]
    fn test_mask_rejects_immutable_and_unknown() {
        let host = Host::new("edge-1", "SN9", "uuid-9");
        let src = Payload::Host(host.clone()).to_document().unwrap();
        let mut stored = src.clone();

        let err = apply_field_mask(&HOST, &mut stored, &src, &["serial_number".to_string()]);
        assert!(err.is_err());

        let err = apply_field_mask(&HOST, &mut stored, &src, &["flux_capacitor".to_string()]);
        assert!(err.is_err());

        let err = apply_field_mask(&HOST, &mut stored, &src, &[]);
        assert!(err.is_err());
    }

    #[test]
    fn test_mask_copies_named_fields_only() {
        let stored_host = Host::new("old-name", "SN9", "uuid-9");
        let mut stored = Payload::Host(stored_host).to_document().unwrap();
        let mut updated = Host::new("new-name", "SN9", "uuid-9");
        updated.note = "rack 4 moved".to_string();
        let src = Payload::Host(updated).to_document().unwrap();

        apply_field_mask(&HOST, &mut stored, &src, &["name".to_string()]).unwrap();
        assert_eq!(stored["name"], "new-name");
        assert_eq!(stored["note"], "");
    }
}
