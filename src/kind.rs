//! Resource kinds - the fixed set of inventory entity types
//!
//! Every stored resource is exactly one of these kinds. The kind selects
//! the payload variant, the schema entry (fields, edges, immutables) and
//! the resource-id prefix.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The fixed set of resource kinds known to the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Physical or virtual compute host
    Host,
    /// Peripheral attached to a host (GPU, NIC, storage, USB)
    HostDevice,
    /// Physical deployment location
    Site,
    /// Geographic grouping of sites, possibly nested
    Region,
    /// OS instance provisioned on a host
    Instance,
    /// Installable operating system image
    OsResource,
    /// Policy describing how instances are updated
    OsUpdatePolicy,
    /// A single execution of an update policy against an instance
    OsUpdateRun,
    /// Deployed workload (cluster, service)
    Workload,
    /// Membership of an instance in a workload
    WorkloadMember,
    /// Named group of log sources
    TelemetryLogsGroup,
    /// Log collection settings bound to a target resource
    TelemetryLogsProfile,
    /// Named group of metric sources
    TelemetryMetricsGroup,
    /// Metric collection settings bound to a target resource
    TelemetryMetricsProfile,
    /// Local OS account provisioned on hosts
    LocalAccount,
    /// Infrastructure provider backing hosts
    Provider,
    /// One-shot maintenance window
    SingleSchedule,
    /// Cron-style recurring maintenance window
    RepeatedSchedule,
    /// Free-form cloud-init style configuration document
    CustomConfig,
}

impl ResourceKind {
    /// Get the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Host => "host",
            ResourceKind::HostDevice => "host_device",
            ResourceKind::Site => "site",
            ResourceKind::Region => "region",
            ResourceKind::Instance => "instance",
            ResourceKind::OsResource => "os_resource",
            ResourceKind::OsUpdatePolicy => "os_update_policy",
            ResourceKind::OsUpdateRun => "os_update_run",
            ResourceKind::Workload => "workload",
            ResourceKind::WorkloadMember => "workload_member",
            ResourceKind::TelemetryLogsGroup => "telemetry_logs_group",
            ResourceKind::TelemetryLogsProfile => "telemetry_logs_profile",
            ResourceKind::TelemetryMetricsGroup => "telemetry_metrics_group",
            ResourceKind::TelemetryMetricsProfile => "telemetry_metrics_profile",
            ResourceKind::LocalAccount => "local_account",
            ResourceKind::Provider => "provider",
            ResourceKind::SingleSchedule => "single_schedule",
            ResourceKind::RepeatedSchedule => "repeated_schedule",
            ResourceKind::CustomConfig => "custom_config",
        }
    }

    /// All resource kinds, in a stable order
    pub fn all() -> &'static [ResourceKind] {
        &[
            ResourceKind::Host,
            ResourceKind::HostDevice,
            ResourceKind::Site,
            ResourceKind::Region,
            ResourceKind::Instance,
            ResourceKind::OsResource,
            ResourceKind::OsUpdatePolicy,
            ResourceKind::OsUpdateRun,
            ResourceKind::Workload,
            ResourceKind::WorkloadMember,
            ResourceKind::TelemetryLogsGroup,
            ResourceKind::TelemetryLogsProfile,
            ResourceKind::TelemetryMetricsGroup,
            ResourceKind::TelemetryMetricsProfile,
            ResourceKind::LocalAccount,
            ResourceKind::Provider,
            ResourceKind::SingleSchedule,
            ResourceKind::RepeatedSchedule,
            ResourceKind::CustomConfig,
        ]
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::all()
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("unknown resource kind: {}", s)))
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
