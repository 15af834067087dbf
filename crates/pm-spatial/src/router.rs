//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! Callers route through the [`Router`] trait, so an A* or contraction
//! hierarchy implementation can replace [`DijkstraRouter`] without touching
//! the resolver or the CLI.
//!
//! # Cost units
//!
//! Costs are edge lengths in **metres** (`f64`).  An unreachable target is
//! reported as [`PathResult::unreachable`]: infinite distance, empty path.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tracing::debug;

use pm_core::{NodeId, NodeIdx};

use crate::graph::RoadGraph;

// ── PathResult ────────────────────────────────────────────────────────────────

/// The result of a routing query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    /// Total length in metres; `f64::INFINITY` when unreachable.
    pub distance_m: f64,
    /// Node identifiers from source to target inclusive; empty when
    /// unreachable.
    pub nodes: Vec<NodeId>,
}

impl PathResult {
    pub fn unreachable() -> Self {
        Self { distance_m: f64::INFINITY, nodes: Vec::new() }
    }

    pub fn is_reachable(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Total length in metres, or `None` when unreachable.
    pub fn distance(&self) -> Option<f64> {
        self.is_reachable().then_some(self.distance_m)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable shortest-path engine.
pub trait Router {
    /// Compute the shortest path from `from` to `to`.
    ///
    /// Unknown identifiers and disconnected endpoints yield
    /// [`PathResult::unreachable`].  `from == to` yields a zero-length,
    /// single-node path.
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> PathResult;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra's algorithm over the CSR street graph with a binary min-heap.
///
/// Stale heap entries are discarded on extraction via a visited flag rather
/// than with decrease-key.  The search stops as soon as the target is
/// settled.  All per-query state lives in vectors owned by the call.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> PathResult {
        let (Some(source), Some(target)) = (graph.index_of(from), graph.index_of(to)) else {
            debug!(%from, %to, "route endpoint not in graph");
            return PathResult::unreachable();
        };
        let result = dijkstra(graph, source, target);
        debug!(
            %from,
            %to,
            distance_m = result.distance_m,
            hops = result.nodes.len().saturating_sub(1),
            "route computed"
        );
        result
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Total order over non-NaN edge costs for use as a heap key.
#[derive(Copy, Clone, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Per-query search state, indexed by `NodeIdx`.
struct SearchState {
    dist:    Vec<f64>,
    visited: Vec<bool>,
    prev:    Vec<NodeIdx>,
}

impl SearchState {
    fn new(n: usize) -> Self {
        Self {
            dist:    vec![f64::INFINITY; n],
            visited: vec![false; n],
            prev:    vec![NodeIdx::INVALID; n],
        }
    }
}

fn dijkstra(graph: &RoadGraph, source: NodeIdx, target: NodeIdx) -> PathResult {
    let n = graph.node_count();
    let mut state = SearchState::new(n);
    state.dist[source.index()] = 0.0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min-heap.
    // Secondary key NodeIdx makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeIdx)>> = BinaryHeap::with_capacity(n + 100);
    heap.push(Reverse((Cost(0.0), source)));

    while let Some(Reverse((_, node))) = heap.pop() {
        if state.visited[node.index()] {
            continue;
        }
        state.visited[node.index()] = true;
        if node == target {
            break;
        }

        let base = state.dist[node.index()];
        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_to[edge.index()];
            if state.visited[neighbor.index()] {
                continue;
            }
            let candidate = base + graph.edge_weight_m[edge.index()];
            if candidate < state.dist[neighbor.index()] {
                state.dist[neighbor.index()] = candidate;
                state.prev[neighbor.index()] = node;
                heap.push(Reverse((Cost(candidate), neighbor)));
            }
        }
    }

    let total = state.dist[target.index()];
    if !total.is_finite() {
        return PathResult::unreachable();
    }
    PathResult {
        distance_m: total,
        nodes: reconstruct(graph, &state.prev, target),
    }
}

fn reconstruct(graph: &RoadGraph, prev: &[NodeIdx], target: NodeIdx) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut cur = target;
    loop {
        nodes.push(graph.node(cur).id);
        let p = prev[cur.index()];
        if p == NodeIdx::INVALID {
            break;
        }
        cur = p;
    }
    nodes.reverse();
    nodes
}
