//! Compute resources - hosts, host devices, instances
//!
//! Hosts and instances have a reconciled lifecycle: the store records the
//! desired state and an external reconciler drives the actual machine
//! towards it. Deleting either kind therefore tombstones the row
//! (`desired_state = DELETED`) instead of removing it.

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// Lifecycle states of a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostState {
    #[default]
    Registered,
    Onboarded,
    Deleted,
}

impl HostState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostState::Registered => "REGISTERED",
            HostState::Onboarded => "ONBOARDED",
            HostState::Deleted => "DELETED",
        }
    }
}

/// A physical or virtual compute host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Host {
    /// Display name
    pub name: String,
    /// Manufacturer serial number; immutable once created
    pub serial_number: String,
    /// SMBIOS uuid; immutable once created
    pub uuid: String,
    /// State the orchestrator wants the host in
    pub desired_state: HostState,
    /// State last reported by the reconciler
    pub current_state: HostState,
    /// Free-form operator note
    pub note: String,
    /// Site the host is racked in
    pub site: Option<ResourceId>,
    /// Provider that onboarded the host
    pub provider: Option<ResourceId>,
}

impl Host {
    pub fn new(
        name: impl Into<String>,
        serial_number: impl Into<String>,
        uuid: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            serial_number: serial_number.into(),
            uuid: uuid.into(),
            ..Default::default()
        }
    }

    pub fn with_site(mut self, site: ResourceId) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_provider(mut self, provider: ResourceId) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Device classes attachable to a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceKind {
    #[default]
    Gpu,
    Nic,
    Storage,
    Usb,
}

/// A peripheral discovered on a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HostDevice {
    pub name: String,
    /// PCI bus address; immutable, devices re-enumerate under the same address
    pub pci_address: String,
    pub device_kind: DeviceKind,
    /// Owning host
    pub host: Option<ResourceId>,
}

impl HostDevice {
    pub fn new(name: impl Into<String>, pci_address: impl Into<String>, host: ResourceId) -> Self {
        Self {
            name: name.into(),
            pci_address: pci_address.into(),
            device_kind: DeviceKind::default(),
            host: Some(host),
        }
    }
}

/// Lifecycle states of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceState {
    #[default]
    Running,
    Untrusted,
    Deleted,
}

impl InstanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceState::Running => "RUNNING",
            InstanceState::Untrusted => "UNTRUSTED",
            InstanceState::Deleted => "DELETED",
        }
    }
}

/// An OS instance provisioned on a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Instance {
    pub name: String,
    pub desired_state: InstanceState,
    pub current_state: InstanceState,
    /// Host the instance runs on; wired at create and never rebound
    pub host: Option<ResourceId>,
    /// OS image the instance should converge to
    pub desired_os: Option<ResourceId>,
    /// Cloud-init style configuration applied at provision time
    pub custom_config: Option<ResourceId>,
}

impl Instance {
    pub fn new(name: impl Into<String>, host: ResourceId) -> Self {
        Self {
            name: name.into(),
            host: Some(host),
            ..Default::default()
        }
    }

    pub fn with_desired_os(mut self, os: ResourceId) -> Self {
        self.desired_os = Some(os);
        self
    }
}
