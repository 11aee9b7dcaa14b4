//! Operating system resources - images, update policies, update runs

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// Security posture baked into an OS image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityFeature {
    #[default]
    None,
    SecureBootAndFde,
}

/// Whether an image may be mutated in place or is replaced wholesale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OsType {
    #[default]
    Mutable,
    Immutable,
}

/// An installable operating system image.
///
/// `image_id` and `sha256` identify the exact artifact and never change;
/// a new artifact is a new resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OsResource {
    pub name: String,
    pub profile_name: String,
    pub image_url: String,
    pub image_id: String,
    pub sha256: String,
    pub security_feature: SecurityFeature,
    pub os_type: OsType,
}

impl OsResource {
    pub fn new(name: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha256: sha256.into(),
            ..Default::default()
        }
    }
}

/// How an update policy selects what to install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdatePolicyMode {
    /// Converge to a specific target: either a target OS image or the
    /// mutable-OS field group, never both
    #[default]
    Target,
    /// Track whatever is newest; no target fields may be set
    Latest,
}

/// A policy describing how instances are updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OsUpdatePolicy {
    pub name: String,
    pub description: String,
    /// Newline-separated packages for mutable-OS updates
    pub install_packages: String,
    /// APT/YUM source lines for mutable-OS updates
    pub update_sources: Vec<String>,
    /// Kernel command line for mutable-OS updates
    pub kernel_command: String,
    pub update_policy: UpdatePolicyMode,
    /// Target image for immutable-OS updates; immutable once set
    pub target_os: Option<ResourceId>,
}

impl OsUpdatePolicy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_target_os(mut self, os: ResourceId) -> Self {
        self.target_os = Some(os);
        self
    }

    /// True when any of the mutable-OS field group is set
    pub fn has_mutable_fields(&self) -> bool {
        !self.install_packages.is_empty()
            || !self.update_sources.is_empty()
            || !self.kernel_command.is_empty()
    }
}

/// Progress states of an update run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateRunStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Failed,
}

/// A single execution of an update policy against an instance.
///
/// The applied policy, the instance and the start time are facts about an
/// execution that already happened; all three are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OsUpdateRun {
    pub name: String,
    pub description: String,
    pub status: UpdateRunStatus,
    pub status_details: String,
    /// Unix seconds; immutable
    pub start_time: u64,
    /// Unix seconds; zero while the run is in flight
    pub end_time: u64,
    pub applied_policy: Option<ResourceId>,
    pub instance: Option<ResourceId>,
}

impl OsUpdateRun {
    pub fn new(name: impl Into<String>, policy: ResourceId, instance: ResourceId) -> Self {
        Self {
            name: name.into(),
            applied_policy: Some(policy),
            instance: Some(instance),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;

    #[test]
    fn test_mutable_field_group_detection() {
        let mut policy = OsUpdatePolicy::new("p");
        assert!(!policy.has_mutable_fields());
        policy.kernel_command = "quiet splash".to_string();
        assert!(policy.has_mutable_fields());
    }

    #[test]
    fn test_run_construction() {
        let policy = ResourceId::generate(ResourceKind::OsUpdatePolicy);
        let instance = ResourceId::generate(ResourceKind::Instance);
        let run = OsUpdateRun::new("nightly", policy.clone(), instance.clone());
        assert_eq!(run.applied_policy, Some(policy));
        assert_eq!(run.instance, Some(instance));
        assert_eq!(run.status, UpdateRunStatus::Planned);
    }
}
