//! Provisioning resources - providers, accounts, schedules, custom configs

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// A local OS account provisioned on hosts. Accounts are write-once;
/// rotating a key means creating a new account resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LocalAccount {
    pub username: String,
    pub ssh_key: String,
}

impl LocalAccount {
    pub fn new(username: impl Into<String>, ssh_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ssh_key: ssh_key.into(),
        }
    }
}

/// Backing infrastructure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderKind {
    #[default]
    Baremetal,
}

/// An infrastructure provider that onboards hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Provider {
    /// Unique provider name; immutable, hosts reference it by edge
    pub name: String,
    pub provider_kind: ProviderKind,
    pub api_endpoint: String,
    /// Credential identifiers (vault paths), never secrets themselves
    pub api_credentials: Vec<String>,
    /// Onboard newly registered hosts without operator approval
    pub auto_onboard: bool,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// What a maintenance window is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    #[default]
    Maintenance,
    OsUpdate,
}

/// A one-shot maintenance window against at most one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SingleSchedule {
    pub name: String,
    pub schedule_status: ScheduleStatus,
    /// Window start, unix seconds
    pub start_seconds: u64,
    /// Window end, unix seconds; zero means open-ended
    pub end_seconds: u64,
    pub target_host: Option<ResourceId>,
    pub target_site: Option<ResourceId>,
    pub target_region: Option<ResourceId>,
}

impl SingleSchedule {
    pub fn new(name: impl Into<String>, start_seconds: u64) -> Self {
        Self {
            name: name.into(),
            start_seconds,
            ..Default::default()
        }
    }

    pub fn targeting_host(mut self, id: ResourceId) -> Self {
        self.target_host = Some(id);
        self
    }

    pub fn targeting_site(mut self, id: ResourceId) -> Self {
        self.target_site = Some(id);
        self
    }

    pub fn targeting_region(mut self, id: ResourceId) -> Self {
        self.target_region = Some(id);
        self
    }

    /// Count of populated target edges
    pub fn target_count(&self) -> usize {
        [
            self.target_host.is_some(),
            self.target_site.is_some(),
            self.target_region.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// A cron-style recurring maintenance window against at most one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RepeatedSchedule {
    pub name: String,
    pub schedule_status: ScheduleStatus,
    /// Window length in seconds from each trigger
    pub duration_seconds: u64,
    pub cron_minutes: String,
    pub cron_hours: String,
    pub cron_day_month: String,
    pub cron_month: String,
    pub cron_day_week: String,
    pub target_host: Option<ResourceId>,
    pub target_site: Option<ResourceId>,
    pub target_region: Option<ResourceId>,
}

impl RepeatedSchedule {
    pub fn new(name: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            cron_minutes: "*".to_string(),
            cron_hours: "*".to_string(),
            cron_day_month: "*".to_string(),
            cron_month: "*".to_string(),
            cron_day_week: "*".to_string(),
            ..Default::default()
        }
    }

    pub fn targeting_host(mut self, id: ResourceId) -> Self {
        self.target_host = Some(id);
        self
    }

    pub fn targeting_site(mut self, id: ResourceId) -> Self {
        self.target_site = Some(id);
        self
    }

    pub fn targeting_region(mut self, id: ResourceId) -> Self {
        self.target_region = Some(id);
        self
    }

    /// Count of populated target edges
    pub fn target_count(&self) -> usize {
        [
            self.target_host.is_some(),
            self.target_site.is_some(),
            self.target_region.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// A free-form cloud-init style configuration document. The document is
/// write-once; instances reference it by edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CustomConfig {
    pub name: String,
    pub description: String,
    pub config: String,
}

impl CustomConfig {
    pub fn new(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            config: config.into(),
        }
    }
}
