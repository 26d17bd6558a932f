//! Read-only report and dump rows.

use serde::Serialize;

use crate::matcher::{decide, Decision, SetReason};
use crate::model::{Acl, EntityType};
use crate::policy::PolicyDocument;
use crate::CatalogSource;

/// One dumped leaf ACL.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpRow {
    pub id: String,
    pub path: Vec<String>,
    pub access_control_list: Acl,
}

/// One dumped object of any entity type. Spaces carry `path = [name]`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDumpRow {
    pub id: String,
    pub path: Vec<String>,
    pub entity_type: EntityType,
    pub access_control_list: Acl,
}

/// One pending action. Unreachable objects get an empty id and an
/// "unable to process" report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: String,
    pub path: Vec<String>,
    pub acl_report: String,
}

/// Dry-run counterpart of `sync::update_acl`: one row per leaf that would
/// change, nothing written back.
pub fn report_acl(
    source: &dyn CatalogSource,
    policy: &PolicyDocument,
    leaves: &[Vec<String>],
    default: &Acl,
    out: &mut dyn FnMut(&str),
) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    for path in leaves {
        let node = match source.get_by_path(path) {
            Ok(node) => node,
            Err(e) => {
                let report = format!("unable to process {}: {e}", path.join("/"));
                out(&report);
                rows.push(ReportRow { id: String::new(), path: path.clone(), acl_report: report });
                continue;
            }
        };
        let label = node.display_path();
        let report = match decide(&node, policy, default) {
            Decision::Keep => continue,
            Decision::Set { reason: SetReason::Policy, .. } => {
                format!("ACLs mismatch for {label}")
            }
            Decision::Set { reason: SetReason::Revoke, .. } => {
                format!("ACLs must be revoked for {label}")
            }
            Decision::Set { reason: SetReason::FillDefault, .. } => {
                format!("ACLs for {label} are empty, must set to default ACL")
            }
        };
        out(&report);
        rows.push(ReportRow { id: node.id, path: node.path, acl_report: report });
    }
    rows
}

/// Fetch each leaf and record its current ACL.
pub fn dump_acl(
    source: &dyn CatalogSource,
    leaves: &[Vec<String>],
    out: &mut dyn FnMut(&str),
) -> Vec<DumpRow> {
    let mut rows = Vec::new();
    for path in leaves {
        match source.get_by_path(path) {
            Ok(node) => rows.push(DumpRow {
                id: node.id.clone(),
                path: node.path.clone(),
                access_control_list: node.current_acl(),
            }),
            Err(e) => out(&format!("unable to process {}: {e}", path.join("/"))),
        }
    }
    rows
}

/// Fetch each enumerated object (space, folder, or dataset) and record
/// its current ACL.
pub fn dump_object_acls(
    source: &dyn CatalogSource,
    objects: &[Vec<String>],
    out: &mut dyn FnMut(&str),
) -> Vec<ObjectDumpRow> {
    let mut rows = Vec::new();
    for path in objects {
        match source.get_by_path(path) {
            Ok(node) => {
                let row_path = if node.entity_type == EntityType::Space {
                    match &node.name {
                        Some(name) => vec![name.clone()],
                        None => node.path.clone(),
                    }
                } else {
                    node.path.clone()
                };
                rows.push(ObjectDumpRow {
                    id: node.id.clone(),
                    path: row_path,
                    entity_type: node.entity_type,
                    access_control_list: node.current_acl(),
                });
            }
            Err(e) => out(&format!("unable to process {}: {e}", path.join("/"))),
        }
    }
    rows
}
