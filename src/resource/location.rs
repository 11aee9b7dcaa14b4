//! Location resources - regions and sites
//!
//! Regions nest through `parent_region`, sites attach to a region, and
//! both carry free-form metadata pairs that descendants inherit through
//! the hierarchy resolver.

use crate::id::ResourceId;
use serde::{Deserialize, Serialize};

/// One metadata key/value pair attached to a location resource.
///
/// Pairs are stored as an ordered list, not a map: inheritance returns the
/// full ancestor stack without merging keys, display semantics belong to
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub key: String,
    pub value: String,
}

impl MetadataPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A geographic grouping of sites, possibly nested under a parent region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Region {
    pub name: String,
    /// Directly-attached metadata pairs
    pub metadata: Vec<MetadataPair>,
    /// Enclosing region, if any
    pub parent_region: Option<ResourceId>,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: ResourceId) -> Self {
        self.parent_region = Some(parent);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataPair::new(key, value));
        self
    }
}

/// A physical deployment location inside a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Site {
    pub name: String,
    /// Street address, free-form
    pub address: String,
    /// Directly-attached metadata pairs
    pub metadata: Vec<MetadataPair>,
    /// Region the site belongs to
    pub region: Option<ResourceId>,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_region(mut self, region: ResourceId) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataPair::new(key, value));
        self
    }
}
