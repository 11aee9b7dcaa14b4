//! Resource and tenant identifiers
//!
//! Format: `<prefix>-<suffix>` where the prefix is fixed per kind and the
//! suffix is 8 random lowercase hex characters.
//!
//! Examples:
//! - `host-4c721d9a`
//! - `region-0b1c2d3e`
//!
//! Resource ids are assigned by the store exactly once at Create and are
//! immutable for the resource's lifetime. They are the sole external
//! identifier of a resource.

use crate::kind::ResourceKind;
use crate::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of hex characters in a generated id suffix
pub const ID_SUFFIX_LEN: usize = 8;

/// Opaque, store-assigned identifier of a single resource.
///
/// The kind prefix is part of the identifier, so an id carries enough
/// information to dispatch to the right schema entry without a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    kind: ResourceKind,
    suffix: String,
}

impl ResourceId {
    /// Generate a fresh id for a kind with a random suffix
    pub fn generate(kind: ResourceKind) -> Self {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
            .collect();
        Self { kind, suffix }
    }

    /// Parse an id string into a ResourceId
    ///
    /// Expected format: `<kind-prefix>-<hex-suffix>`
    pub fn parse(s: &str) -> Result<Self> {
        let (prefix, suffix) = s
            .rsplit_once('-')
            .ok_or_else(|| Error::InvalidArgument(format!("malformed resource id: {}", s)))?;

        let kind = ResourceKind::all()
            .iter()
            .find(|k| prefix_for(**k) == prefix)
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("unknown id prefix: {}", prefix)))?;

        if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidArgument(format!(
                "malformed resource id suffix: {}",
                s
            )));
        }

        Ok(Self {
            kind,
            suffix: suffix.to_ascii_lowercase(),
        })
    }

    /// The kind encoded in this id's prefix
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

/// Id prefix for a resource kind
pub fn prefix_for(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Host => "host",
        ResourceKind::HostDevice => "hostdev",
        ResourceKind::Site => "site",
        ResourceKind::Region => "region",
        ResourceKind::Instance => "inst",
        ResourceKind::OsResource => "os",
        ResourceKind::OsUpdatePolicy => "osupdatepolicy",
        ResourceKind::OsUpdateRun => "osupdaterun",
        ResourceKind::Workload => "workload",
        ResourceKind::WorkloadMember => "workloadmember",
        ResourceKind::TelemetryLogsGroup => "telemetrygroup",
        ResourceKind::TelemetryLogsProfile => "telemetryprofile",
        ResourceKind::TelemetryMetricsGroup => "metricgroup",
        ResourceKind::TelemetryMetricsProfile => "metricprofile",
        ResourceKind::LocalAccount => "localaccount",
        ResourceKind::Provider => "provider",
        ResourceKind::SingleSchedule => "singlesche",
        ResourceKind::RepeatedSchedule => "repeatedsche",
        ResourceKind::CustomConfig => "customconfig",
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", prefix_for(self.kind), self.suffix)
    }
}

impl FromStr for ResourceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ResourceId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Isolation boundary every resource belongs to.
///
/// Opaque to the store; callers typically pass a UUID. The store never
/// derives behavior from the contents, only scopes queries by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
