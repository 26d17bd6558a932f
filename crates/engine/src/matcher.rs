//! Per-object reconciliation decision.
//!
//! `decide` is a pure function of the node, the policy, and the default
//! ACL. `reconcile` applies the decision to the in-memory node and reports
//! what it did; submission is the commit coordinator's job.

use crate::model::{Acl, CatalogNode};
use crate::policy::PolicyDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetReason {
    /// A policy entry matched and its grants differ from the current ACL.
    Policy,
    /// No entry matched a non-default ACL; revoke back to the default.
    Revoke,
    /// No entry matched and the ACL is empty; fill in the default.
    FillDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Keep,
    Set { acl: Acl, reason: SetReason },
}

/// Decide what the node's ACL should become.
///
/// Matching entries are folded in document order; each entry whose grants
/// differ from the accumulated ACL replaces it, so with duplicate keys the
/// last differing entry wins. When no entry matches, a non-empty ACL that
/// differs from the default is revoked to the default, and an empty ACL is
/// filled with a non-empty default.
pub fn decide(node: &CatalogNode, policy: &PolicyDocument, default: &Acl) -> Decision {
    let current = node.current_acl();
    let mut acl = current.clone();
    let mut matched = false;
    let mut dirty = false;
    for entry in policy.matching(node) {
        matched = true;
        if !acl.grants_equal(&entry.access_control_list) {
            acl = entry.access_control_list.without_version();
            dirty = true;
        }
    }
    if matched {
        if dirty {
            Decision::Set { acl, reason: SetReason::Policy }
        } else {
            Decision::Keep
        }
    } else if !current.is_empty() && !current.grants_equal(default) {
        Decision::Set { acl: default.without_version(), reason: SetReason::Revoke }
    } else if current.is_empty() && !default.is_empty() {
        Decision::Set { acl: default.without_version(), reason: SetReason::FillDefault }
    } else {
        Decision::Keep
    }
}

/// Apply `decide` to the node. Returns true when the node changed and
/// needs to be committed.
pub fn reconcile(
    node: &mut CatalogNode,
    policy: &PolicyDocument,
    default: &Acl,
    out: &mut dyn FnMut(&str),
) -> bool {
    match decide(node, policy, default) {
        Decision::Keep => false,
        Decision::Set { acl, reason } => {
            let label = node.display_path();
            match reason {
                SetReason::Policy => out(&format!("updated ACLs for {label}")),
                SetReason::Revoke => out(&format!("revoked ACLs for {label}")),
                SetReason::FillDefault => {
                    out(&format!("ACLs for {label} are empty, setting to default ACL"))
                }
            }
            node.access_control_list = Some(acl);
            true
        }
    }
}
