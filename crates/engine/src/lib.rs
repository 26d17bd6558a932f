//! `permsync-engine` — Catalog ACL reconciliation engine.
//!
//! Pure engine crate: walks a catalog tree through the [`CatalogSource`]
//! seam, decides which objects need their ACL changed, and drives commits
//! to a fixed point. No HTTP or CLI dependencies.

pub mod aggregate;
pub mod commit;
pub mod error;
pub mod matcher;
pub mod model;
pub mod policy;
pub mod report;
pub mod sync;
pub mod walker;

pub use error::CatalogError;
pub use model::{Acl, AclEntry, CatalogNode, ChildKind, ChildRef, EntityType};
pub use policy::{default_acl, EntityKey, PolicyDocument, PolicyEntry};

/// Read/write access to a catalog tree. The HTTP client implements this;
/// tests substitute an in-memory fake.
pub trait CatalogSource {
    /// Fetch the full object at the given path.
    fn get_by_path(&self, path: &[String]) -> Result<CatalogNode, CatalogError>;

    /// List the direct children of the container at the given path.
    fn get_children(&self, path: &[String]) -> Result<Vec<ChildRef>, CatalogError>;

    /// List the top-level containers of the catalog.
    fn get_roots(&self) -> Result<Vec<ChildRef>, CatalogError>;

    /// Write the object back, replacing its server-side state.
    fn update(&self, node: &CatalogNode) -> Result<(), CatalogError>;
}

#[cfg(test)]
pub(crate) mod testutil;
