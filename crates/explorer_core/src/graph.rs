//! Graph model: additive merge and wholesale replacement of snapshots.
//!
//! Both operations are pure data transformations with no failure cases.
//! Malformed input (e.g. edges whose endpoints are not in the node set) is
//! accepted as-is; it reflects upstream data.

use std::collections::HashSet;

use shared::domain::GraphSnapshot;

/// Additive union of two snapshots keyed by node id and `(from, to)` edge
/// pair. The result carries every entry of `base` first, then incoming's
/// novel entries in their given order, so repeated merges are deterministic
/// and idempotent. Nothing is ever mutated or removed.
pub fn merge(base: &GraphSnapshot, incoming: GraphSnapshot) -> GraphSnapshot {
    let mut node_ids: HashSet<String> = base.nodes.iter().map(|node| node.id.clone()).collect();
    let mut edge_keys: HashSet<(String, String)> = base
        .edges
        .iter()
        .map(|edge| (edge.from.clone(), edge.to.clone()))
        .collect();

    let mut merged = base.clone();
    for node in incoming.nodes {
        if node_ids.insert(node.id.clone()) {
            merged.nodes.push(node);
        }
    }
    for edge in incoming.edges {
        if edge_keys.insert((edge.from.clone(), edge.to.clone())) {
            merged.edges.push(edge);
        }
    }
    merged
}

/// Wholesale replacement: the incoming snapshot becomes the graph verbatim.
/// Used for non-merge explores and for loading a saved exploration.
pub fn replace(incoming: GraphSnapshot) -> GraphSnapshot {
    incoming
}
