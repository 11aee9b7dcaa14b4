//! Workload resources - deployed workloads and their members

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// Classes of deployable workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkloadKind {
    #[default]
    Cluster,
    Dhcp,
}

/// A deployed workload spanning one or more instances.
///
/// Members reference the workload strongly, so a workload cannot be
/// deleted while members exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Workload {
    pub name: String,
    pub workload_kind: WorkloadKind,
    /// Free-form status string surfaced by the workload controller
    pub status: String,
}

impl Workload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Roles an instance can take inside a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberKind {
    #[default]
    ClusterNode,
}

/// Membership of an instance in a workload. Both ends are wired at create
/// and never rebound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkloadMember {
    pub member_kind: MemberKind,
    pub workload: Option<ResourceId>,
    pub instance: Option<ResourceId>,
}

impl WorkloadMember {
    pub fn new(workload: ResourceId, instance: ResourceId) -> Self {
        Self {
            member_kind: MemberKind::default(),
            workload: Some(workload),
            instance: Some(instance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;

    #[test]
    fn test_member_wiring() {
        let w = ResourceId::generate(ResourceKind::Workload);
        let i = ResourceId::generate(ResourceKind::Instance);
        let m = WorkloadMember::new(w.clone(), i.clone());
        assert_eq!(m.workload, Some(w));
        assert_eq!(m.instance, Some(i));
    }
}
