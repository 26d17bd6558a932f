//! Subtree enumeration over a catalog tree.
//!
//! The walk is iterative with visited-path tracking, so a backend that
//! reports a cycle in its child listings cannot loop the walker forever.
//! A failed child listing skips that subtree, records the failure, and
//! leaves already-discovered siblings untouched.

use std::collections::BTreeSet;

use crate::error::CatalogError;
use crate::model::{CatalogNode, ChildKind, EntityType};
use crate::CatalogSource;

/// Result of a subtree enumeration: discovered paths in depth-first
/// pre-order, plus the subtrees that could not be listed.
#[derive(Debug, Default)]
pub struct Walk {
    pub paths: Vec<Vec<String>>,
    pub failed: Vec<(Vec<String>, CatalogError)>,
}

impl Walk {
    fn merge(&mut self, other: Walk) {
        self.paths.extend(other.paths);
        self.failed.extend(other.failed);
    }
}

#[derive(Clone, Copy)]
enum Collect {
    /// Dataset paths only.
    LeavesOnly,
    /// Container and dataset paths; datasets dropped when `include_vds`
    /// is false.
    All { include_vds: bool },
}

/// Depth-first list of every dataset transitively reachable under `root`.
/// `FILE` children are ignored, container paths are not emitted.
pub fn enumerate_leaves(
    source: &dyn CatalogSource,
    root: &CatalogNode,
    out: &mut dyn FnMut(&str),
) -> Walk {
    walk(source, root, Collect::LeavesOnly, out)
}

/// The root itself plus every container (and, with `include_vds`, every
/// dataset) under it. Spaces are emitted and listed by bare name.
pub fn enumerate_all(
    source: &dyn CatalogSource,
    root: &CatalogNode,
    include_vds: bool,
    out: &mut dyn FnMut(&str),
) -> Walk {
    walk(source, root, Collect::All { include_vds }, out)
}

/// Walk every top-level `SPACE` container in the catalog. Used when no
/// base path is given.
pub fn enumerate_spaces(
    source: &dyn CatalogSource,
    include_vds: bool,
    out: &mut dyn FnMut(&str),
) -> Result<Walk, CatalogError> {
    let mut combined = Walk::default();
    for root in source.get_roots()? {
        if root.kind != ChildKind::Container || root.container_type.as_deref() != Some("SPACE") {
            continue;
        }
        match source.get_by_path(&root.path) {
            Ok(node) => combined.merge(enumerate_all(source, &node, include_vds, out)),
            Err(e) => {
                out(&format!("unable to process {}: {e}", root.path.join("/")));
                combined.failed.push((root.path, e));
            }
        }
    }
    Ok(combined)
}

enum Task {
    Emit(Vec<String>),
    List(Vec<String>),
}

fn walk(
    source: &dyn CatalogSource,
    root: &CatalogNode,
    collect: Collect,
    out: &mut dyn FnMut(&str),
) -> Walk {
    let mut result = Walk::default();

    // A space keys by bare name, both for output and for child listing.
    let root_path = if root.entity_type == EntityType::Space {
        match &root.name {
            Some(name) => vec![name.clone()],
            None => root.path.clone(),
        }
    } else {
        root.path.clone()
    };

    if let Collect::All { .. } = collect {
        result.paths.push(root_path.clone());
    }

    let mut visited: BTreeSet<Vec<String>> = BTreeSet::new();
    visited.insert(root_path.clone());
    let mut stack = vec![Task::List(root_path)];

    while let Some(task) = stack.pop() {
        let path = match task {
            Task::Emit(path) => {
                result.paths.push(path);
                continue;
            }
            Task::List(path) => path,
        };
        let children = match source.get_children(&path) {
            Ok(children) => children,
            Err(e) => {
                out(&format!("unable to list {}: {e}", path.join("/")));
                result.failed.push((path, e));
                continue;
            }
        };
        // Reverse push so the first child in listing order pops first.
        for child in children.into_iter().rev() {
            if !visited.insert(child.path.clone()) {
                continue;
            }
            match child.kind {
                ChildKind::Dataset => {
                    let emit = match collect {
                        Collect::LeavesOnly => true,
                        Collect::All { include_vds } => include_vds,
                    };
                    if emit {
                        stack.push(Task::Emit(child.path));
                    }
                }
                ChildKind::Container => {
                    stack.push(Task::List(child.path.clone()));
                    if let Collect::All { .. } = collect {
                        stack.push(Task::Emit(child.path));
                    }
                }
                ChildKind::File => {}
            }
        }
    }

    result
}
