//! Telemetry resources - log/metric groups and the profiles binding them
//!
//! Groups name what to collect; profiles bind a group to a target
//! resource (instance, site or region) with collection settings. A
//! profile targets exactly one resource; descendants of the target pick
//! the profile up through the hierarchy resolver's inherited mode.

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// Where the collector for a group runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectorKind {
    #[default]
    Host,
    Cluster,
}

/// Severity threshold for log collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// A named set of log sources to collect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TelemetryLogsGroup {
    pub name: String,
    pub collector_kind: CollectorKind,
    /// Log source identifiers (journald units, file globs)
    pub groups: Vec<String>,
}

impl TelemetryLogsGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// Log collection settings bound to a single target resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TelemetryLogsProfile {
    pub log_level: LogLevel,
    /// The group being collected
    pub group: Option<ResourceId>,
    /// Exactly one of the three targets is set
    pub target_instance: Option<ResourceId>,
    pub target_site: Option<ResourceId>,
    pub target_region: Option<ResourceId>,
}

impl TelemetryLogsProfile {
    pub fn new(group: ResourceId) -> Self {
        Self {
            group: Some(group),
            ..Default::default()
        }
    }

    pub fn targeting_instance(mut self, id: ResourceId) -> Self {
        self.target_instance = Some(id);
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
            self.target_instance.is_some(),
            self.target_site.is_some(),
            self.target_region.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// A named set of metric sources to collect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TelemetryMetricsGroup {
    pub name: String,
    pub collector_kind: CollectorKind,
    /// Metric source identifiers (collectd plugins, exporters)
    pub groups: Vec<String>,
}

impl TelemetryMetricsGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }
}

/// Metric collection settings bound to a single target resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TelemetryMetricsProfile {
    /// Scrape interval in seconds; must be positive
    pub metrics_interval: u64,
    pub group: Option<ResourceId>,
    /// Exactly one of the three targets is set
    pub target_instance: Option<ResourceId>,
    pub target_site: Option<ResourceId>,
    pub target_region: Option<ResourceId>,
}

impl TelemetryMetricsProfile {
    pub fn new(group: ResourceId, metrics_interval: u64) -> Self {
        Self {
            metrics_interval,
            group: Some(group),
            ..Default::default()
        }
    }

    pub fn targeting_instance(mut self, id: ResourceId) -> Self {
        self.target_instance = Some(id);
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
            self.target_instance.is_some(),
            self.target_site.is_some(),
            self.target_region.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::ResourceKind;

    #[test]
    fn test_target_count() {
        let group = ResourceId::generate(ResourceKind::TelemetryLogsGroup);
        let region = ResourceId::generate(ResourceKind::Region);
        let profile = TelemetryLogsProfile::new(group);
        assert_eq!(profile.target_count(), 0);
        let profile = profile.targeting_region(region);
        assert_eq!(profile.target_count(), 1);
    }

    #[test]
    fn test_log_level_symbol() {
        let json = serde_json::to_string(&LogLevel::Warn).unwrap();
        assert_eq!(json, "\"WARN\"");
    }
}
