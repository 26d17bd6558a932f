//! Catalog object model: nodes, children, and access control lists.
//!
//! The node type keeps unknown server fields in a flattened map so that a
//! fetched object can be written back without losing anything the engine
//! does not model.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One grant: a principal id plus the permission names it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclEntry {
    pub id: String,
    pub permissions: BTreeSet<String>,
}

impl AclEntry {
    pub fn new(id: &str, permissions: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// An access control list as the server models it: user grants plus
/// group grants, with an opaque optimistic-concurrency marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acl {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<AclEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<AclEntry>,
    /// Server-managed marker. Never part of grant comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_json::Value>,
}

impl Acl {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    /// Structural equality of the grants: same principals with the same
    /// permission sets, regardless of entry order. The version marker is
    /// ignored.
    pub fn grants_equal(&self, other: &Acl) -> bool {
        fn by_id(entries: &[AclEntry]) -> BTreeMap<&str, &BTreeSet<String>> {
            entries.iter().map(|e| (e.id.as_str(), &e.permissions)).collect()
        }
        by_id(&self.users) == by_id(&other.users) && by_id(&self.groups) == by_id(&other.groups)
    }

    /// Copy of this ACL with the version marker stripped, so a policy ACL
    /// written to a node never carries a stale marker.
    pub fn without_version(&self) -> Acl {
        Acl {
            users: self.users.clone(),
            groups: self.groups.clone(),
            version: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Source,
    Space,
    Folder,
    Dataset,
    File,
    Home,
}

impl EntityType {
    /// Entity types that can serve as a reconciliation base.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Source | Self::Space | Self::Folder)
    }
}

/// Kind tag on a child listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChildKind {
    Container,
    Dataset,
    File,
}

/// One entry in a container's child listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildRef {
    pub path: Vec<String>,
    #[serde(rename = "type")]
    pub kind: ChildKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
}

/// A full catalog object as fetched from the server.
///
/// Fields the engine does not model are preserved in `extra` and round-trip
/// unchanged through serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_control_list: Option<Acl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildRef>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CatalogNode {
    /// Current ACL, treating an absent list as empty.
    pub fn current_acl(&self) -> Acl {
        self.access_control_list.clone().unwrap_or_default()
    }

    /// Human-readable identity: spaces go by name, everything else by path.
    pub fn display_path(&self) -> String {
        if self.entity_type == EntityType::Space {
            if let Some(name) = &self.name {
                return name.clone();
            }
        }
        self.path.join("/")
    }
}
