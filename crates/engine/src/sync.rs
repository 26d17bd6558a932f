//! High-level reconciliation runs: walk, reconcile, commit, report.

use crate::aggregate::aggregate;
use crate::matcher;
use crate::model::{Acl, CatalogNode, ChildKind, EntityType};
use crate::policy::PolicyDocument;
use crate::{commit, CatalogSource};

/// What a run achieved: how many nodes were committed and which dirty
/// nodes could not be.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub committed: usize,
    pub failed: Vec<CatalogNode>,
}

impl SyncOutcome {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_paths(&self) -> Vec<String> {
        self.failed.iter().map(|n| n.display_path()).collect()
    }

    fn absorb(&mut self, other: SyncOutcome) {
        self.committed += other.committed;
        self.failed.extend(other.failed);
    }
}

fn finish(
    source: &dyn CatalogSource,
    dirty: Vec<CatalogNode>,
    out: &mut dyn FnMut(&str),
) -> SyncOutcome {
    let total = dirty.len();
    let failed = commit::commit(source, dirty, out);
    if failed.is_empty() {
        out("commit complete");
    } else {
        let mut msg = format!("failed to commit the following {} items:", failed.len());
        for node in &failed {
            msg.push('\n');
            msg.push_str(&node.display_path());
        }
        out(&msg);
    }
    SyncOutcome { committed: total - failed.len(), failed }
}

fn reconcile_path(
    source: &dyn CatalogSource,
    path: &[String],
    policy: &PolicyDocument,
    default: &Acl,
    dirty: &mut Vec<CatalogNode>,
    out: &mut dyn FnMut(&str),
) {
    match source.get_by_path(path) {
        Ok(mut node) => {
            if matcher::reconcile(&mut node, policy, default, out) {
                dirty.push(node);
            }
        }
        Err(e) => out(&format!("unable to process {}: {e}", path.join("/"))),
    }
}

/// Reconcile a base container and the datasets under it.
///
/// A source base reconciles each of its direct container children (the
/// databases); any other container base reconciles itself. Unless
/// `source_only`, every enumerated leaf dataset is then fetched and
/// reconciled. All dirty nodes go through one fixed-point commit.
pub fn update_acl(
    source: &dyn CatalogSource,
    policy: &PolicyDocument,
    root: &CatalogNode,
    leaves: &[Vec<String>],
    source_only: bool,
    default: &Acl,
    out: &mut dyn FnMut(&str),
) -> SyncOutcome {
    let mut dirty = Vec::new();
    if root.entity_type == EntityType::Source {
        for child in &root.children {
            if child.kind != ChildKind::Container {
                continue;
            }
            reconcile_path(source, &child.path, policy, default, &mut dirty, out);
        }
    } else {
        let mut node = root.clone();
        if matcher::reconcile(&mut node, policy, default, out) {
            dirty.push(node);
        }
    }
    if !source_only {
        for path in leaves {
            reconcile_path(source, path, policy, default, &mut dirty, out);
        }
    }
    finish(source, dirty, out)
}

/// Reconcile every enumerated object (spaces, folders, datasets) against
/// the policy, then commit.
pub fn update_space_acl(
    source: &dyn CatalogSource,
    policy: &PolicyDocument,
    objects: &[Vec<String>],
    default: &Acl,
    out: &mut dyn FnMut(&str),
) -> SyncOutcome {
    let mut dirty = Vec::new();
    for path in objects {
        reconcile_path(source, path, policy, default, &mut dirty, out);
    }
    finish(source, dirty, out)
}

/// Aggregate leaf dataset ACLs into a superset and assign it to the
/// folder. An empty superset falls back to the default ACL; when that is
/// empty too there is nothing to assign and no update happens. Leaf ACLs
/// are deleted only after the folder commit succeeds.
pub fn rollup_to_folder(
    source: &dyn CatalogSource,
    leaves: &[Vec<String>],
    folder: &CatalogNode,
    default: &Acl,
    delete_leaf_acls: bool,
    out: &mut dyn FnMut(&str),
) -> SyncOutcome {
    let mut touched = Vec::new();
    for path in leaves {
        match source.get_by_path(path) {
            Ok(node) => {
                if !node.current_acl().is_empty() {
                    touched.push(node);
                }
            }
            Err(e) => out(&format!("unable to process {}: {e}", path.join("/"))),
        }
    }

    let superset = aggregate(touched.iter().filter_map(|n| n.access_control_list.as_ref()));
    let folder_acl = if !superset.is_empty() {
        superset
    } else if !default.is_empty() {
        default.without_version()
    } else {
        out(&format!("no ACLs found under {}, nothing to do", folder.display_path()));
        return SyncOutcome::default();
    };

    let mut folder_node = folder.clone();
    folder_node.access_control_list = Some(folder_acl);
    out(&format!("assigning aggregated ACLs to {}", folder_node.display_path()));
    let mut outcome = finish(source, vec![folder_node], out);

    if outcome.is_clean() && delete_leaf_acls {
        let mut blanked = Vec::new();
        for mut node in touched {
            out(&format!("deleted ACLs for {}", node.display_path()));
            node.access_control_list = Some(Acl::default());
            blanked.push(node);
        }
        outcome.absorb(finish(source, blanked, out));
    }
    outcome
}
