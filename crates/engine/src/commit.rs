//! Fixed-point commit of dirty nodes.
//!
//! Version-conflict failures often clear up once sibling updates land, so
//! the failing set is resubmitted until it stops shrinking. Termination is
//! the fixed point, not success: whatever survives is returned for the
//! caller to report.

use crate::model::CatalogNode;
use crate::{CatalogError, CatalogSource};

/// Submit every dirty node, resubmitting failures while each round makes
/// progress. Returns the nodes that still failed in the final round.
pub fn commit(
    source: &dyn CatalogSource,
    dirty: Vec<CatalogNode>,
    out: &mut dyn FnMut(&str),
) -> Vec<CatalogNode> {
    let mut bad = dirty;
    let mut last_run = bad.len() + 1;
    while bad.len() < last_run {
        last_run = bad.len();
        bad = submit(source, bad, out);
    }
    bad
}

fn submit(
    source: &dyn CatalogSource,
    nodes: Vec<CatalogNode>,
    out: &mut dyn FnMut(&str),
) -> Vec<CatalogNode> {
    let mut bad = Vec::new();
    for node in nodes {
        match source.update(&node) {
            Ok(()) => {}
            Err(e) => {
                log_failure(&node, &e, out);
                bad.push(node);
            }
        }
    }
    bad
}

fn log_failure(node: &CatalogNode, e: &CatalogError, out: &mut dyn FnMut(&str)) {
    out(&format!("failed to commit {}: {e}", node.display_path()));
}
