//! Desired-state policy documents.
//!
//! A policy file is a JSON object with an `entities` array, each entry
//! pairing a catalog entity key with the ACL it should carry. Spaces are
//! keyed by bare name, every other entity by full path.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::model::{Acl, AclEntry, CatalogNode, EntityType};

/// Key identifying which catalog object a policy entry targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityKey {
    Name(String),
    Path(Vec<String>),
}

impl EntityKey {
    /// A name key matches a space by name; a path key matches any other
    /// entity by full path.
    pub fn matches(&self, node: &CatalogNode) -> bool {
        match self {
            Self::Name(name) => {
                node.entity_type == EntityType::Space && node.name.as_deref() == Some(name)
            }
            Self::Path(path) => node.entity_type != EntityType::Space && &node.path == path,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Path(path) => path.join("/"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyEntry {
    pub entity_path: EntityKey,
    pub access_control_list: Acl,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub entities: Vec<PolicyEntry>,
}

impl PolicyDocument {
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(text).map_err(|e| CatalogError::Policy(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    /// Entries whose key appears more than once. Later entries win during
    /// matching, so callers should warn on these.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut dupes = BTreeSet::new();
        for entry in &self.entities {
            let label = entry.entity_path.label();
            if !seen.insert(label.clone()) {
                dupes.insert(label);
            }
        }
        dupes.into_iter().collect()
    }

    /// Entries matching the given node, in document order.
    pub fn matching<'a>(&'a self, node: &'a CatalogNode) -> impl Iterator<Item = &'a PolicyEntry> {
        self.entities.iter().filter(|e| e.entity_path.matches(node))
    }
}

/// The fallback ACL granting READ and WRITE to the given principals.
/// Empty when neither a user nor a group is supplied.
pub fn default_acl(user: Option<&str>, group: Option<&str>) -> Acl {
    let mut acl = Acl::default();
    if let Some(user) = user {
        acl.users.push(AclEntry::new(user, &["READ", "WRITE"]));
    }
    if let Some(group) = group {
        acl.groups.push(AclEntry::new(group, &["READ", "WRITE"]));
    }
    acl
}
