use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use permsync_engine::policy::default_acl;
use permsync_engine::report::{dump_object_acls, report_acl};
use permsync_engine::sync::{rollup_to_folder, update_acl, update_space_acl};
use permsync_engine::walker::{enumerate_all, enumerate_leaves, enumerate_spaces};
use permsync_engine::{
    Acl, AclEntry, CatalogError, CatalogNode, CatalogSource, ChildKind, ChildRef, EntityType,
    PolicyDocument,
};

// -------------------------------------------------------------------------
// In-memory catalog
// -------------------------------------------------------------------------

#[derive(Default)]
struct InMemoryCatalog {
    nodes: RefCell<BTreeMap<Vec<String>, CatalogNode>>,
    roots: Vec<ChildRef>,
    flaky: RefCell<BTreeMap<String, usize>>,
    rejects: BTreeSet<String>,
}

impl InMemoryCatalog {
    fn insert(&mut self, node: CatalogNode) {
        self.nodes.borrow_mut().insert(node.path.clone(), node);
    }

    /// Make updates of `id` fail the next `times` attempts, then succeed.
    fn flake(&mut self, id: &str, times: usize) {
        self.flaky.borrow_mut().insert(id.to_string(), times);
    }

    fn reject(&mut self, id: &str) {
        self.rejects.insert(id.to_string());
    }

    fn node(&self, path: &[&str]) -> CatalogNode {
        self.nodes.borrow()[&path_of(path)].clone()
    }
}

impl CatalogSource for InMemoryCatalog {
    fn get_by_path(&self, path: &[String]) -> Result<CatalogNode, CatalogError> {
        self.nodes
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(path.join("/")))
    }

    fn get_children(&self, path: &[String]) -> Result<Vec<ChildRef>, CatalogError> {
        Ok(self.get_by_path(path)?.children)
    }

    fn get_roots(&self) -> Result<Vec<ChildRef>, CatalogError> {
        Ok(self.roots.clone())
    }

    fn update(&self, node: &CatalogNode) -> Result<(), CatalogError> {
        if self.rejects.contains(&node.id) {
            return Err(CatalogError::Http(500, "rejected".into()));
        }
        if let Some(left) = self.flaky.borrow_mut().get_mut(&node.id) {
            if *left > 0 {
                *left -= 1;
                return Err(CatalogError::Conflict("stale version".into()));
            }
        }
        self.nodes.borrow_mut().insert(node.path.clone(), node.clone());
        Ok(())
    }
}

fn path_of(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn child(path: &[&str], kind: ChildKind) -> ChildRef {
    ChildRef { path: path_of(path), kind, container_type: None }
}

fn node(id: &str, path: &[&str], entity_type: EntityType, children: Vec<ChildRef>) -> CatalogNode {
    CatalogNode {
        id: id.to_string(),
        path: path_of(path),
        name: path.last().map(|s| s.to_string()),
        entity_type,
        access_control_list: None,
        children,
        extra: serde_json::Map::new(),
    }
}

fn user_acl(entries: &[(&str, &[&str])]) -> Acl {
    Acl {
        users: entries.iter().map(|(id, perms)| AclEntry::new(id, perms)).collect(),
        groups: vec![],
        version: None,
    }
}

/// sales (source)
/// └── crm (database)
///     ├── accounts  (dataset)
///     ├── contacts  (dataset)
///     └── archive   (folder)
///         └── leads (dataset)
fn sales_catalog() -> InMemoryCatalog {
    let mut cat = InMemoryCatalog::default();
    cat.insert(node(
        "sales",
        &["sales"],
        EntityType::Source,
        vec![child(&["sales", "crm"], ChildKind::Container)],
    ));
    cat.insert(node(
        "crm",
        &["sales", "crm"],
        EntityType::Folder,
        vec![
            child(&["sales", "crm", "accounts"], ChildKind::Dataset),
            child(&["sales", "crm", "contacts"], ChildKind::Dataset),
            child(&["sales", "crm", "archive"], ChildKind::Container),
        ],
    ));
    cat.insert(node(
        "archive",
        &["sales", "crm", "archive"],
        EntityType::Folder,
        vec![child(&["sales", "crm", "archive", "leads"], ChildKind::Dataset)],
    ));
    cat.insert(node("accounts", &["sales", "crm", "accounts"], EntityType::Dataset, vec![]));
    cat.insert(node("contacts", &["sales", "crm", "contacts"], EntityType::Dataset, vec![]));
    cat.insert(node("leads", &["sales", "crm", "archive", "leads"], EntityType::Dataset, vec![]));
    cat
}

fn sink() -> impl FnMut(&str) {
    |_: &str| {}
}

// -------------------------------------------------------------------------
// End-to-end update runs
// -------------------------------------------------------------------------

#[test]
fn update_acl_converges_remote_state_to_policy() {
    let mut cat = sales_catalog();
    // One leaf already carries a stray grant the policy does not know.
    let mut stray = cat.node(&["sales", "crm", "contacts"]);
    stray.access_control_list = Some(user_acl(&[("intern", &["WRITE"])]));
    cat.insert(stray);

    let mut policy_file = tempfile::NamedTempFile::new().unwrap();
    write!(
        policy_file,
        r#"{{"entities": [
            {{"entityPath": ["sales", "crm", "accounts"],
              "accessControlList": {{"users": [{{"id": "sales-team", "permissions": ["READ", "WRITE"]}}]}}}}
        ]}}"#
    )
    .unwrap();
    let policy = PolicyDocument::from_path(policy_file.path()).unwrap();
    let default = default_acl(Some("admin"), None);

    let root = cat.node(&["sales"]);
    let leaves = enumerate_leaves(&cat, &root, &mut sink());
    assert_eq!(leaves.paths.len(), 3);

    let outcome = update_acl(&cat, &policy, &root, &leaves.paths, false, &default, &mut sink());
    assert!(outcome.is_clean());
    // database + 3 leaves, all dirty
    assert_eq!(outcome.committed, 4);

    assert_eq!(
        cat.node(&["sales", "crm", "accounts"]).access_control_list,
        Some(user_acl(&[("sales-team", &["READ", "WRITE"])]))
    );
    // Stray grant revoked to the default, empty leaves filled with it.
    assert_eq!(cat.node(&["sales", "crm", "contacts"]).access_control_list, Some(default.clone()));
    assert_eq!(
        cat.node(&["sales", "crm", "archive", "leads"]).access_control_list,
        Some(default.clone())
    );
    assert_eq!(cat.node(&["sales", "crm"]).access_control_list, Some(default));
}

#[test]
fn second_run_is_a_no_op() {
    let mut cat = sales_catalog();
    let policy = PolicyDocument::default();
    let default = default_acl(Some("admin"), None);
    let root = cat.node(&["sales"]);
    let leaves = enumerate_leaves(&cat, &root, &mut sink());

    let first = update_acl(&cat, &policy, &root, &leaves.paths, false, &default, &mut sink());
    assert_eq!(first.committed, 4);

    let root = cat.node(&["sales"]);
    let second = update_acl(&cat, &policy, &root, &leaves.paths, false, &default, &mut sink());
    assert_eq!(second.committed, 0);
    assert!(second.is_clean());
}

#[test]
fn transient_conflicts_resolve_through_retry() {
    let mut cat = sales_catalog();
    cat.flake("contacts", 1);
    let policy = PolicyDocument::default();
    let default = default_acl(Some("admin"), None);
    let root = cat.node(&["sales"]);
    let leaves = enumerate_leaves(&cat, &root, &mut sink());

    let mut lines = Vec::new();
    let outcome = update_acl(&cat, &policy, &root, &leaves.paths, false, &default, &mut |s| {
        lines.push(s.to_string())
    });
    assert!(outcome.is_clean());
    assert_eq!(outcome.committed, 4);
    assert!(lines.iter().any(|l| l.starts_with("failed to commit sales/crm/contacts:")));
    assert!(lines.iter().any(|l| l == "commit complete"));
}

#[test]
fn persistent_failures_are_reported_not_retried_forever() {
    let mut cat = sales_catalog();
    cat.reject("leads");
    let policy = PolicyDocument::default();
    let default = default_acl(None, Some("analysts"));
    let root = cat.node(&["sales"]);
    let leaves = enumerate_leaves(&cat, &root, &mut sink());

    let outcome = update_acl(&cat, &policy, &root, &leaves.paths, false, &default, &mut sink());
    assert_eq!(outcome.committed, 3);
    assert_eq!(outcome.failed_paths(), vec!["sales/crm/archive/leads".to_string()]);
}

// -------------------------------------------------------------------------
// Space runs
// -------------------------------------------------------------------------

fn space_catalog() -> InMemoryCatalog {
    let mut cat = InMemoryCatalog::default();
    let mut space = node(
        "analytics",
        &["analytics"],
        EntityType::Space,
        vec![
            child(&["analytics", "kpis"], ChildKind::Dataset),
            child(&["analytics", "internal"], ChildKind::Container),
        ],
    );
    space.name = Some("analytics".to_string());
    cat.insert(space);
    cat.insert(node(
        "internal",
        &["analytics", "internal"],
        EntityType::Folder,
        vec![child(&["analytics", "internal", "churn"], ChildKind::Dataset)],
    ));
    cat.insert(node("kpis", &["analytics", "kpis"], EntityType::Dataset, vec![]));
    cat.insert(node("churn", &["analytics", "internal", "churn"], EntityType::Dataset, vec![]));
    cat.roots.push(ChildRef {
        path: path_of(&["analytics"]),
        kind: ChildKind::Container,
        container_type: Some("SPACE".to_string()),
    });
    cat
}

#[test]
fn space_policy_matches_by_bare_name() {
    let cat = space_catalog();
    let policy = PolicyDocument::from_json(
        r#"{"entities": [{"entityPath": "analytics",
             "accessControlList": {"groups": [{"id": "bi", "permissions": ["READ"]}]}}]}"#,
    )
    .unwrap();
    let root = cat.node(&["analytics"]);
    let objects = enumerate_all(&cat, &root, true, &mut sink());
    assert_eq!(
        objects.paths,
        vec![
            path_of(&["analytics"]),
            path_of(&["analytics", "kpis"]),
            path_of(&["analytics", "internal"]),
            path_of(&["analytics", "internal", "churn"]),
        ]
    );

    let outcome = update_space_acl(&cat, &policy, &objects.paths, &Acl::default(), &mut sink());
    assert!(outcome.is_clean());
    assert_eq!(outcome.committed, 1);
    let space = cat.node(&["analytics"]);
    assert_eq!(
        space.access_control_list.unwrap().groups,
        vec![AclEntry::new("bi", &["READ"])]
    );
}

#[test]
fn no_base_walks_every_space() {
    let cat = space_catalog();
    let walk = enumerate_spaces(&cat, false, &mut sink()).unwrap();
    assert_eq!(
        walk.paths,
        vec![path_of(&["analytics"]), path_of(&["analytics", "internal"])]
    );
    let rows = dump_object_acls(&cat, &walk.paths, &mut sink());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].path, path_of(&["analytics"]));
}

// -------------------------------------------------------------------------
// Rollup and report
// -------------------------------------------------------------------------

#[test]
fn rollup_supersets_then_clears_leaves() {
    let mut cat = sales_catalog();
    let mut a = cat.node(&["sales", "crm", "accounts"]);
    a.access_control_list = Some(user_acl(&[("u1", &["READ"])]));
    cat.insert(a);
    let mut b = cat.node(&["sales", "crm", "contacts"]);
    b.access_control_list = Some(user_acl(&[("u1", &["WRITE"]), ("u2", &["READ"])]));
    cat.insert(b);

    let folder = cat.node(&["sales", "crm"]);
    let leaves = enumerate_leaves(&cat, &folder, &mut sink());
    let outcome =
        rollup_to_folder(&cat, &leaves.paths, &folder, &Acl::default(), true, &mut sink());
    assert!(outcome.is_clean());

    assert_eq!(
        cat.node(&["sales", "crm"]).access_control_list,
        Some(user_acl(&[("u1", &["READ", "WRITE"]), ("u2", &["READ"])]))
    );
    assert_eq!(
        cat.node(&["sales", "crm", "accounts"]).access_control_list,
        Some(Acl::default())
    );
    // Leaf that never had an ACL stays untouched.
    assert_eq!(
        cat.node(&["sales", "crm", "archive", "leads"]).access_control_list,
        None
    );
}

#[test]
fn report_run_writes_nothing_back() {
    let mut cat = sales_catalog();
    let mut stray = cat.node(&["sales", "crm", "contacts"]);
    stray.access_control_list = Some(user_acl(&[("intern", &["WRITE"])]));
    cat.insert(stray.clone());

    let policy = PolicyDocument::default();
    let default = default_acl(Some("admin"), None);
    let root = cat.node(&["sales"]);
    let leaves = enumerate_leaves(&cat, &root, &mut sink());
    let rows = report_acl(&cat, &policy, &leaves.paths, &default, &mut sink());
    assert_eq!(rows.len(), 3);
    assert_eq!(
        cat.node(&["sales", "crm", "contacts"]).access_control_list,
        stray.access_control_list
    );
}
