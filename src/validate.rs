//! Validation pipeline - per-kind chains of pure checks
//!
//! Every write runs its payload through a chain of validators before a
//! transaction is opened. Validators are pure functions over the typed
//! payload (plus the schema registry for structural rules); a failure
//! names the violated rule and the offending field, and has no side
//! effects.

use crate::kind::ResourceKind;
use crate::resource::{Payload, Resource, UpdatePolicyMode};
use crate::schema::{self, FieldType};
use crate::{Error, Result};

/// Upper bound for every stored string field
pub const MAX_STRING_LEN: usize = 512;

/// A single validation rule over a payload
pub type Validator = fn(&Payload) -> Result<()>;

/// The standard chain applied to every create and update
const CHAIN: &[Validator] = &[structural, required_edges, semantic];

/// Run a payload through a validator chain
pub fn validate(payload: &Payload, validators: &[Validator]) -> Result<()> {
    for validator in validators {
        validator(payload)?;
    }
    Ok(())
}

/// Validate an envelope for Create: the id must be unset and the payload
/// must pass the standard chain.
pub fn validate_create(resource: &Resource) -> Result<()> {
    do_not_accept_resource_id(resource)?;
    validate(&resource.payload, CHAIN)
}

/// Validate a merged payload after a field-mask update
pub fn validate_update(payload: &Payload) -> Result<()> {
    validate(payload, CHAIN)
}

/// Create-time ids are assigned by the store, never by the caller
fn do_not_accept_resource_id(resource: &Resource) -> Result<()> {
    if resource.id.is_some() {
        return Err(Error::invalid(
            resource.kind(),
            "resource id must not be set on create",
        ));
    }
    Ok(())
}

/// String fields that must be non-empty, per kind
fn required_strings(kind: ResourceKind) -> &'static [&'static str] {
    match kind {
        ResourceKind::Host => &["serial_number", "uuid"],
        ResourceKind::HostDevice => &["pci_address"],
        ResourceKind::Site => &["name"],
        ResourceKind::Region => &["name"],
        ResourceKind::Instance => &["name"],
        ResourceKind::OsResource => &["name", "sha256"],
        ResourceKind::OsUpdatePolicy => &["name"],
        ResourceKind::OsUpdateRun => &["name"],
        ResourceKind::Workload => &["name"],
        ResourceKind::WorkloadMember => &[],
        ResourceKind::TelemetryLogsGroup => &["name"],
        ResourceKind::TelemetryLogsProfile => &[],
        ResourceKind::TelemetryMetricsGroup => &["name"],
        ResourceKind::TelemetryMetricsProfile => &[],
        ResourceKind::LocalAccount => &["username", "ssh_key"],
        ResourceKind::Provider => &["name"],
        ResourceKind::SingleSchedule => &["name"],
        ResourceKind::RepeatedSchedule => &["name"],
        ResourceKind::CustomConfig => &["name", "config"],
    }
}

/// Structural validity: required strings present, length and charset
/// limits on every string-typed field.
fn structural(payload: &Payload) -> Result<()> {
    let kind = payload.kind();
    let kind_schema = schema::schema_for(kind);
    let doc = payload.to_document()?;

    for name in required_strings(kind) {
        let empty = doc
            .get(*name)
            .and_then(serde_json::Value::as_str)
            .map(str::is_empty)
            .unwrap_or(true);
        if empty {
            return Err(Error::invalid(kind, format!("field {} is required", name)));
        }
    }

    for fdef in kind_schema.fields {
        if !matches!(fdef.ftype, FieldType::Str | FieldType::Enum) {
            continue;
        }
        if let Some(s) = doc.get(fdef.name).and_then(serde_json::Value::as_str) {
            if s.len() > MAX_STRING_LEN {
                return Err(Error::invalid(
                    kind,
                    format!("field {} exceeds {} bytes", fdef.name, MAX_STRING_LEN),
                ));
            }
            if s.chars().any(char::is_control) {
                return Err(Error::invalid(
                    kind,
                    format!("field {} contains control characters", fdef.name),
                ));
            }
        }
    }
    Ok(())
}

/// Every edge the schema marks required must be wired
fn required_edges(payload: &Payload) -> Result<()> {
    let kind = payload.kind();
    let kind_schema = schema::schema_for(kind);
    let doc = payload.to_document()?;
    for edef in kind_schema.edges {
        if !edef.required {
            continue;
        }
        let wired = matches!(doc.get(edef.name), Some(serde_json::Value::String(_)));
        if !wired {
            return Err(Error::invalid(
                kind,
                format!("relation {} is required", edef.name),
            ));
        }
    }
    Ok(())
}

/// Kind-specific semantic rules
fn semantic(payload: &Payload) -> Result<()> {
    match payload {
        Payload::OsUpdatePolicy(policy) => {
            let kind = ResourceKind::OsUpdatePolicy;
            match policy.update_policy {
                UpdatePolicyMode::Target => {
                    let target = policy.target_os.is_some();
                    let mutable = policy.has_mutable_fields();
                    if target && mutable {
                        return Err(Error::invalid(
                            kind,
                            "target_os and the mutable-OS fields are mutually exclusive",
                        ));
                    }
                    if !target && !mutable {
                        return Err(Error::invalid(
                            kind,
                            "one of target_os or the mutable-OS fields must be set",
                        ));
                    }
                }
                UpdatePolicyMode::Latest => {
                    if policy.target_os.is_some() || policy.has_mutable_fields() {
                        return Err(Error::invalid(
                            kind,
                            "LATEST policy allows neither target_os nor mutable-OS fields",
                        ));
                    }
                }
            }
            Ok(())
        }
        Payload::TelemetryLogsProfile(profile) => {
            if profile.target_count() != 1 {
                return Err(Error::invalid(
                    ResourceKind::TelemetryLogsProfile,
                    "exactly one of target_instance, target_site, target_region must be set",
                ));
            }
            Ok(())
        }
        Payload::TelemetryMetricsProfile(profile) => {
            if profile.target_count() != 1 {
                return Err(Error::invalid(
                    ResourceKind::TelemetryMetricsProfile,
                    "exactly one of target_instance, target_site, target_region must be set",
                ));
            }
            if profile.metrics_interval == 0 {
                return Err(Error::invalid(
                    ResourceKind::TelemetryMetricsProfile,
                    "metrics_interval must be positive",
                ));
            }
            Ok(())
        }
        Payload::SingleSchedule(sched) => {
            if sched.target_count() > 1 {
                return Err(Error::invalid(
                    ResourceKind::SingleSchedule,
                    "at most one of target_host, target_site, target_region may be set",
                ));
            }
            if sched.end_seconds != 0 && sched.end_seconds <= sched.start_seconds {
                return Err(Error::invalid(
                    ResourceKind::SingleSchedule,
                    "end_seconds must be after start_seconds",
                ));
            }
            Ok(())
        }
        Payload::RepeatedSchedule(sched) => {
            if sched.target_count() > 1 {
                return Err(Error::invalid(
                    ResourceKind::RepeatedSchedule,
                    "at most one of target_host, target_site, target_region may be set",
                ));
            }
            let crons = [
                ("cron_minutes", &sched.cron_minutes),
                ("cron_hours", &sched.cron_hours),
                ("cron_day_month", &sched.cron_day_month),
                ("cron_month", &sched.cron_month),
                ("cron_day_week", &sched.cron_day_week),
            ];
            for (name, value) in crons {
                if value.is_empty() {
                    return Err(Error::invalid(
                        ResourceKind::RepeatedSchedule,
                        format!("field {} is required", name),
                    ));
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ResourceId;
    use crate::resource::{
        Host, OsUpdatePolicy, SingleSchedule, TelemetryLogsProfile, TelemetryMetricsProfile,
        Workload,
    };

    fn sample_policy_target_os() -> OsUpdatePolicy {
        OsUpdatePolicy::new("weekly").with_target_os(ResourceId::generate(ResourceKind::OsResource))
    }

    #[test]
    fn test_create_rejects_caller_supplied_id() {
        let mut res = Resource::new(Payload::Workload(Workload::new("w")));
        res.id = Some(ResourceId::generate(ResourceKind::Workload));
        assert!(matches!(
            validate_create(&res),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_required_string_enforced() {
        let res = Resource::new(Payload::Host(Host::new("edge-1", "", "uuid")));
        assert!(validate_create(&res).is_err());
    }

    #[test]
    fn test_string_length_limit() {
        let long = "x".repeat(MAX_STRING_LEN + 1);
        let res = Resource::new(Payload::Workload(Workload::new(long)));
        assert!(validate_create(&res).is_err());
    }

    #[test]
    fn test_control_chars_rejected() {
        let res = Resource::new(Payload::Workload(Workload::new("bad\u{0007}name")));
        assert!(validate_create(&res).is_err());
    }

    #[test]
    fn test_policy_target_mode_exactly_one_group() {
        // target_os alone: ok
        let ok = Resource::new(Payload::OsUpdatePolicy(sample_policy_target_os()));
        assert!(validate_create(&ok).is_ok());

        // mutable group alone: ok
        let mut policy = OsUpdatePolicy::new("mutable");
        policy.kernel_command = "quiet".to_string();
        let ok = Resource::new(Payload::OsUpdatePolicy(policy));
        assert!(validate_create(&ok).is_ok());

        // both: rejected
        let mut policy = sample_policy_target_os();
        policy.install_packages = "curl".to_string();
        let bad = Resource::new(Payload::OsUpdatePolicy(policy));
        assert!(validate_create(&bad).is_err());

        // neither: rejected
        let bad = Resource::new(Payload::OsUpdatePolicy(OsUpdatePolicy::new("empty")));
        assert!(validate_create(&bad).is_err());
    }

    #[test]
    fn test_policy_latest_mode_requires_all_unset() {
        let mut policy = OsUpdatePolicy::new("latest");
        policy.update_policy = UpdatePolicyMode::Latest;
        let ok = Resource::new(Payload::OsUpdatePolicy(policy.clone()));
        assert!(validate_create(&ok).is_ok());

        policy.update_sources = vec!["deb http://mirror".to_string()];
        let bad = Resource::new(Payload::OsUpdatePolicy(policy));
        assert!(validate_create(&bad).is_err());
    }

    #[test]
    fn test_logs_profile_needs_exactly_one_target() {
        let group = ResourceId::generate(ResourceKind::TelemetryLogsGroup);
        let none = Resource::new(Payload::TelemetryLogsProfile(TelemetryLogsProfile::new(
            group.clone(),
        )));
        assert!(validate_create(&none).is_err());

        let site = ResourceId::generate(ResourceKind::Site);
        let region = ResourceId::generate(ResourceKind::Region);
        let two = TelemetryLogsProfile::new(group.clone())
            .targeting_site(site.clone())
            .targeting_region(region);
        assert!(validate_create(&Resource::new(Payload::TelemetryLogsProfile(two))).is_err());

        let one = TelemetryLogsProfile::new(group).targeting_site(site);
        assert!(validate_create(&Resource::new(Payload::TelemetryLogsProfile(one))).is_ok());
    }

    #[test]
    fn test_metrics_profile_interval_positive() {
        let group = ResourceId::generate(ResourceKind::TelemetryMetricsGroup);
        let site = ResourceId::generate(ResourceKind::Site);
        let zero = TelemetryMetricsProfile::new(group, 0).targeting_site(site);
        assert!(validate_create(&Resource::new(Payload::TelemetryMetricsProfile(zero))).is_err());
    }

    #[test]
    fn test_required_edge_enforced() {
        let mut member = crate::resource::WorkloadMember::new(
            ResourceId::generate(ResourceKind::Workload),
            ResourceId::generate(ResourceKind::Instance),
        );
        member.instance = None;
        let res = Resource::new(Payload::WorkloadMember(member));
        assert!(validate_create(&res).is_err());
    }

    #[test]
    fn test_schedule_window_ordering() {
        let mut sched = SingleSchedule::new("w", 100);
        sched.end_seconds = 50;
        assert!(validate_create(&Resource::new(Payload::SingleSchedule(sched))).is_err());
    }
}
