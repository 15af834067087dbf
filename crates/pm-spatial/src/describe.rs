//! Human-readable rendering of a [`PathResult`].

use crate::graph::RoadGraph;
use crate::router::PathResult;

/// Separator placed between consecutive labels by [`format_path`].
pub const PATH_SEPARATOR: &str = " -> ";

/// One label per node of `path`.
///
/// A node is labelled with its own name when it has one.  Otherwise the
/// label is the street it was reached by: among the previous node's edges
/// that target it, the most recently added one, when its name is non-empty.
/// Failing both, the node identifier is used.
pub fn path_labels(graph: &RoadGraph, path: &PathResult) -> Vec<String> {
    let mut labels = Vec::with_capacity(path.nodes.len());
    for (i, &id) in path.nodes.iter().enumerate() {
        if let Some(name) = graph.find_by_id(id).and_then(|n| n.name()) {
            labels.push(name.to_owned());
            continue;
        }

        let street = i
            .checked_sub(1)
            .and_then(|p| graph.index_of(path.nodes[p]))
            .and_then(|prev| graph.edges(prev).filter(|e| e.target == id).last())
            .map(|e| e.name)
            .filter(|name| !name.is_empty());

        labels.push(match street {
            Some(name) => name.to_owned(),
            None => id.to_string(),
        });
    }
    labels
}

/// Labels of `path` joined with [`PATH_SEPARATOR`].
pub fn format_path(graph: &RoadGraph, path: &PathResult) -> String {
    path_labels(graph, path).join(PATH_SEPARATOR)
}
