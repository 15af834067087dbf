//! Turning a user's location token into a routable node.
//!
//! Resolution runs in order and stops at the first step that yields
//! something:
//!
//! 1. the token, after leading whitespace, is a decimal integer naming an
//!    existing node;
//! 2. case-insensitive substring search over node names;
//! 3. fuzzy search (Levenshtein distance ≤ `fuzzy_max_distance`).
//!
//! Steps 2 and 3 return candidate lists for the caller to present; picking
//! one is left to the caller.  Once a node is chosen,
//! [`Resolver::snap_to_road`] replaces an isolated landmark with the closest
//! node of the street network.

use tracing::debug;

use pm_core::NodeId;

use crate::graph::{Node, RoadGraph};
use crate::{SpatialError, SpatialResult};

/// Resolver tuning.
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Largest edit distance accepted by the fuzzy fallback.
    pub fuzzy_max_distance: usize,
    /// Most candidates the fuzzy fallback collects.
    pub fuzzy_cap: usize,
    /// Most candidates offered in one selection menu.
    pub menu_limit: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { fuzzy_max_distance: 4, fuzzy_cap: 1_000, menu_limit: 10 }
    }
}

/// How a candidate list was produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchKind {
    Substring,
    Fuzzy,
}

/// Outcome of [`Resolver::resolve`].
#[derive(Clone, Debug)]
pub enum Resolution<'g> {
    /// The token named a node directly by identifier.
    Id(NodeId),
    /// One or more nodes matched by name.
    Candidates {
        kind: MatchKind,
        nodes: Vec<&'g Node>,
        /// The fuzzy cap cut the list short.
        truncated: bool,
    },
    NotFound,
}

impl Resolution<'_> {
    /// The candidates that fit in a menu of `limit` entries.
    pub fn menu(&self, limit: usize) -> &[&Node] {
        match self {
            Resolution::Candidates { nodes, .. } => &nodes[..nodes.len().min(limit)],
            _ => &[],
        }
    }

    /// Identifier picked by a 1-based menu `choice`, if it is in range.
    pub fn select(&self, choice: usize, limit: usize) -> Option<NodeId> {
        let menu = self.menu(limit);
        choice.checked_sub(1).and_then(|i| menu.get(i)).map(|n| n.id)
    }
}

/// A routing endpoint after snapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snap {
    pub requested: NodeId,
    pub road_node: NodeId,
    /// Great-circle distance from the requested node to the road node.
    pub distance_m: f64,
}

impl Snap {
    /// `true` if the requested node was replaced.
    pub fn moved(&self) -> bool {
        self.requested != self.road_node
    }
}

/// Resolves user tokens against one graph.
pub struct Resolver<'g> {
    graph: &'g RoadGraph,
    config: ResolverConfig,
}

impl<'g> Resolver<'g> {
    pub fn new(graph: &'g RoadGraph, config: ResolverConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `token` by identifier, then substring, then fuzzy match.
    pub fn resolve(&self, token: &str) -> Resolution<'g> {
        if let Ok(id) = token.trim_start().parse::<NodeId>() {
            if self.graph.find_by_id(id).is_some() {
                return Resolution::Id(id);
            }
            debug!(%id, "numeric token is not a node id; searching names");
        }

        let nodes = self.graph.find_by_substring(token);
        if !nodes.is_empty() {
            return Resolution::Candidates { kind: MatchKind::Substring, nodes, truncated: false };
        }

        let fuzzy = self
            .graph
            .find_fuzzy(token, self.config.fuzzy_max_distance, self.config.fuzzy_cap);
        if !fuzzy.nodes.is_empty() {
            return Resolution::Candidates {
                kind: MatchKind::Fuzzy,
                nodes: fuzzy.nodes,
                truncated: fuzzy.truncated,
            };
        }

        Resolution::NotFound
    }

    /// Replace an isolated node (no outgoing edges) with the nearest road
    /// node.  Nodes already on the network are returned unchanged.
    ///
    /// # Errors
    ///
    /// [`SpatialError::NodeNotFound`] for an unknown `id`,
    /// [`SpatialError::NoRoadNodes`] if the graph has no edges at all.
    pub fn snap_to_road(&self, id: NodeId) -> SpatialResult<Snap> {
        let idx = self.graph.index_of(id).ok_or(SpatialError::NodeNotFound(id))?;
        if self.graph.has_edges(idx) {
            return Ok(Snap { requested: id, road_node: id, distance_m: 0.0 });
        }

        let node = self.graph.node(idx);
        let road = self
            .graph
            .nearest_road_node(node.pos)
            .ok_or(SpatialError::NoRoadNodes)?;
        let snap = Snap {
            requested: id,
            road_node: road.id,
            distance_m: node.pos.distance_m(road.pos),
        };
        debug!(from = %id, to = %road.id, distance_m = snap.distance_m, "snapped isolated node");
        Ok(snap)
    }
}
