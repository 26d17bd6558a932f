//! In-memory catalog fake shared by the unit and integration tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::CatalogError;
use crate::model::{Acl, CatalogNode, ChildKind, ChildRef, EntityType};
use crate::CatalogSource;

#[derive(Default)]
pub struct FakeCatalog {
    nodes: RefCell<BTreeMap<Vec<String>, CatalogNode>>,
    roots: Vec<ChildRef>,
    /// Paths whose child listing fails with a transport error.
    broken_listings: BTreeSet<Vec<String>>,
    /// Node ids whose update always fails.
    rejects: BTreeSet<String>,
    /// Ids passed to `update`, in call order.
    pub updates: RefCell<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: CatalogNode) {
        self.nodes.borrow_mut().insert(node.path.clone(), node);
    }

    pub fn add_root(&mut self, child: ChildRef) {
        self.roots.push(child);
    }

    pub fn break_listing(&mut self, path: &[&str]) {
        self.broken_listings.insert(to_path(path));
    }

    pub fn reject_updates(&mut self, id: &str) {
        self.rejects.insert(id.to_string());
    }

    pub fn node(&self, path: &[&str]) -> CatalogNode {
        self.nodes.borrow()[&to_path(path)].clone()
    }

    pub fn update_count(&self) -> usize {
        self.updates.borrow().len()
    }
}

impl CatalogSource for FakeCatalog {
    fn get_by_path(&self, path: &[String]) -> Result<CatalogNode, CatalogError> {
        self.nodes
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(path.join("/")))
    }

    fn get_children(&self, path: &[String]) -> Result<Vec<ChildRef>, CatalogError> {
        if self.broken_listings.contains(path) {
            return Err(CatalogError::Transport("listing failed".into()));
        }
        Ok(self.get_by_path(path)?.children)
    }

    fn get_roots(&self) -> Result<Vec<ChildRef>, CatalogError> {
        Ok(self.roots.clone())
    }

    fn update(&self, node: &CatalogNode) -> Result<(), CatalogError> {
        self.updates.borrow_mut().push(node.id.clone());
        if self.rejects.contains(&node.id) {
            return Err(CatalogError::Http(500, "simulated failure".into()));
        }
        self.nodes.borrow_mut().insert(node.path.clone(), node.clone());
        Ok(())
    }
}

pub fn to_path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

pub fn child(path: &[&str], kind: ChildKind, container_type: Option<&str>) -> ChildRef {
    ChildRef {
        path: to_path(path),
        kind,
        container_type: container_type.map(|s| s.to_string()),
    }
}

pub fn dataset(id: &str, path: &[&str], acl: Option<Acl>) -> CatalogNode {
    CatalogNode {
        id: id.to_string(),
        path: to_path(path),
        name: None,
        entity_type: EntityType::Dataset,
        access_control_list: acl,
        children: Vec::new(),
        extra: serde_json::Map::new(),
    }
}

pub fn container(
    id: &str,
    path: &[&str],
    entity_type: EntityType,
    children: Vec<ChildRef>,
) -> CatalogNode {
    CatalogNode {
        id: id.to_string(),
        path: to_path(path),
        name: path.last().map(|s| s.to_string()),
        entity_type,
        access_control_list: None,
        children,
        extra: serde_json::Map::new(),
    }
}
