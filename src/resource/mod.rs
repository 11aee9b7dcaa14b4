//! Resource envelope - tagged union over all inventory kinds
//!
//! A `Resource` is the unit every store operation accepts and returns:
//! an optional store-assigned id, the owning tenant, timestamps, and a
//! `Payload` carrying exactly one populated kind-specific struct.
//!
//! Payload structs live in per-domain submodules:
//! - `compute`: Host, HostDevice, Instance
//! - `location`: Region, Site
//! - `os`: OsResource, OsUpdatePolicy, OsUpdateRun
//! - `workload`: Workload, WorkloadMember
//! - `telemetry`: logs/metrics groups and profiles
//! - `provision`: LocalAccount, Provider, schedules, CustomConfig

pub mod compute;
pub mod location;
pub mod os;
pub mod provision;
pub mod telemetry;
pub mod workload;

pub use compute::{Host, HostDevice, HostState, Instance, InstanceState};
pub use location::{MetadataPair, Region, Site};
pub use os::{OsResource, OsUpdatePolicy, OsUpdateRun, UpdatePolicyMode, UpdateRunStatus};
pub use provision::{
    CustomConfig, LocalAccount, Provider, RepeatedSchedule, ScheduleStatus, SingleSchedule,
};
pub use telemetry::{
    CollectorKind, LogLevel, TelemetryLogsGroup, TelemetryLogsProfile, TelemetryMetricsGroup,
    TelemetryMetricsProfile,
};
pub use workload::{Workload, WorkloadMember};

use crate::id::{ResourceId, TenantId};
use crate::kind::ResourceKind;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind-specific payload; exactly one variant is populated per resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Host(Host),
    HostDevice(HostDevice),
    Site(Site),
    Region(Region),
    Instance(Instance),
    OsResource(OsResource),
    OsUpdatePolicy(OsUpdatePolicy),
    OsUpdateRun(OsUpdateRun),
    Workload(Workload),
    WorkloadMember(WorkloadMember),
    TelemetryLogsGroup(TelemetryLogsGroup),
    TelemetryLogsProfile(TelemetryLogsProfile),
    TelemetryMetricsGroup(TelemetryMetricsGroup),
    TelemetryMetricsProfile(TelemetryMetricsProfile),
    LocalAccount(LocalAccount),
    Provider(Provider),
    SingleSchedule(SingleSchedule),
    RepeatedSchedule(RepeatedSchedule),
    CustomConfig(CustomConfig),
}

impl Payload {
    /// The resource kind of the populated variant
    pub fn kind(&self) -> ResourceKind {
        match self {
            Payload::Host(_) => ResourceKind::Host,
            Payload::HostDevice(_) => ResourceKind::HostDevice,
            Payload::Site(_) => ResourceKind::Site,
            Payload::Region(_) => ResourceKind::Region,
            Payload::Instance(_) => ResourceKind::Instance,
            Payload::OsResource(_) => ResourceKind::OsResource,
            Payload::OsUpdatePolicy(_) => ResourceKind::OsUpdatePolicy,
            Payload::OsUpdateRun(_) => ResourceKind::OsUpdateRun,
            Payload::Workload(_) => ResourceKind::Workload,
            Payload::WorkloadMember(_) => ResourceKind::WorkloadMember,
            Payload::TelemetryLogsGroup(_) => ResourceKind::TelemetryLogsGroup,
            Payload::TelemetryLogsProfile(_) => ResourceKind::TelemetryLogsProfile,
            Payload::TelemetryMetricsGroup(_) => ResourceKind::TelemetryMetricsGroup,
            Payload::TelemetryMetricsProfile(_) => ResourceKind::TelemetryMetricsProfile,
            Payload::LocalAccount(_) => ResourceKind::LocalAccount,
            Payload::Provider(_) => ResourceKind::Provider,
            Payload::SingleSchedule(_) => ResourceKind::SingleSchedule,
            Payload::RepeatedSchedule(_) => ResourceKind::RepeatedSchedule,
            Payload::CustomConfig(_) => ResourceKind::CustomConfig,
        }
    }

    /// Serialize the inner struct to its canonical JSON document.
    ///
    /// The kind tag is stored in its own column, so the document is the
    /// bare object of the inner struct.
    pub fn to_document(&self) -> Result<Value> {
        let value = match self {
            Payload::Host(p) => serde_json::to_value(p)?,
            Payload::HostDevice(p) => serde_json::to_value(p)?,
            Payload::Site(p) => serde_json::to_value(p)?,
            Payload::Region(p) => serde_json::to_value(p)?,
            Payload::Instance(p) => serde_json::to_value(p)?,
            Payload::OsResource(p) => serde_json::to_value(p)?,
            Payload::OsUpdatePolicy(p) => serde_json::to_value(p)?,
            Payload::OsUpdateRun(p) => serde_json::to_value(p)?,
            Payload::Workload(p) => serde_json::to_value(p)?,
            Payload::WorkloadMember(p) => serde_json::to_value(p)?,
            Payload::TelemetryLogsGroup(p) => serde_json::to_value(p)?,
            Payload::TelemetryLogsProfile(p) => serde_json::to_value(p)?,
            Payload::TelemetryMetricsGroup(p) => serde_json::to_value(p)?,
            Payload::TelemetryMetricsProfile(p) => serde_json::to_value(p)?,
            Payload::LocalAccount(p) => serde_json::to_value(p)?,
            Payload::Provider(p) => serde_json::to_value(p)?,
            Payload::SingleSchedule(p) => serde_json::to_value(p)?,
            Payload::RepeatedSchedule(p) => serde_json::to_value(p)?,
            Payload::CustomConfig(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    /// Deserialize a payload of the given kind from its JSON document
    pub fn from_document(kind: ResourceKind, doc: Value) -> Result<Payload> {
        let payload = match kind {
            ResourceKind::Host => Payload::Host(serde_json::from_value(doc)?),
            ResourceKind::HostDevice => Payload::HostDevice(serde_json::from_value(doc)?),
            ResourceKind::Site => Payload::Site(serde_json::from_value(doc)?),
            ResourceKind::Region => Payload::Region(serde_json::from_value(doc)?),
            ResourceKind::Instance => Payload::Instance(serde_json::from_value(doc)?),
            ResourceKind::OsResource => Payload::OsResource(serde_json::from_value(doc)?),
            ResourceKind::OsUpdatePolicy => Payload::OsUpdatePolicy(serde_json::from_value(doc)?),
            ResourceKind::OsUpdateRun => Payload::OsUpdateRun(serde_json::from_value(doc)?),
            ResourceKind::Workload => Payload::Workload(serde_json::from_value(doc)?),
            ResourceKind::WorkloadMember => Payload::WorkloadMember(serde_json::from_value(doc)?),
            ResourceKind::TelemetryLogsGroup => {
                Payload::TelemetryLogsGroup(serde_json::from_value(doc)?)
            }
            ResourceKind::TelemetryLogsProfile => {
                Payload::TelemetryLogsProfile(serde_json::from_value(doc)?)
            }
            ResourceKind::TelemetryMetricsGroup => {
                Payload::TelemetryMetricsGroup(serde_json::from_value(doc)?)
            }
            ResourceKind::TelemetryMetricsProfile => {
                Payload::TelemetryMetricsProfile(serde_json::from_value(doc)?)
            }
            ResourceKind::LocalAccount => Payload::LocalAccount(serde_json::from_value(doc)?),
            ResourceKind::Provider => Payload::Provider(serde_json::from_value(doc)?),
            ResourceKind::SingleSchedule => Payload::SingleSchedule(serde_json::from_value(doc)?),
            ResourceKind::RepeatedSchedule => {
                Payload::RepeatedSchedule(serde_json::from_value(doc)?)
            }
            ResourceKind::CustomConfig => Payload::CustomConfig(serde_json::from_value(doc)?),
        };
        Ok(payload)
    }
}

/// The envelope every store operation accepts and returns.
///
/// `id`, `tenant` and the timestamps are store-assigned; a caller-built
/// envelope for Create must leave `id` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Store-assigned identifier; `None` until created
    pub id: Option<ResourceId>,
    /// Owning tenant; set by the store on every returned envelope
    pub tenant: Option<TenantId>,
    /// The kind-specific payload
    pub payload: Payload,
    /// Creation time, unix seconds, store-assigned
    pub created_at: u64,
    /// Last mutation time, unix seconds, store-assigned
    pub updated_at: u64,
}

impl Resource {
    /// Build a fresh envelope for Create
    pub fn new(payload: Payload) -> Self {
        Self {
            id: None,
            tenant: None,
            payload,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// The resource kind of the payload
    pub fn kind(&self) -> ResourceKind {
        self.payload.kind()
    }
}
