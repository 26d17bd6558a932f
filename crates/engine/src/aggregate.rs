//! Superset aggregation of many ACLs into one.

use crate::model::{Acl, AclEntry};

/// Union-merge the given ACLs by principal id. A principal appearing in
/// several inputs ends up with the union of its permission sets; entries
/// keep first-seen append order. Aggregating an aggregate is a no-op.
pub fn aggregate<'a>(acls: impl IntoIterator<Item = &'a Acl>) -> Acl {
    let mut merged = Acl::default();
    for acl in acls {
        merge_entries(&mut merged.users, &acl.users);
        merge_entries(&mut merged.groups, &acl.groups);
    }
    merged
}

fn merge_entries(into: &mut Vec<AclEntry>, from: &[AclEntry]) {
    for entry in from {
        match into.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => existing.permissions.extend(entry.permissions.iter().cloned()),
            None => into.push(entry.clone()),
        }
    }
}
