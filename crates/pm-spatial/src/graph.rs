//! Street graph representation and builder.
//!
//! # Data layout
//!
//! Nodes live in a single `Vec<Node>` in insertion order; a [`NodeIdx`] is a
//! position in that vector.  Map identifiers ([`NodeId`]) resolve to a
//! `NodeIdx` through a hash index, so the vector doubles as the stable full
//! enumeration and the index is the O(1) lookup path.
//!
//! Outgoing edges use **Compressed Sparse Row (CSR)** format.  Given a
//! `NodeIdx n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Edges point at their target by `NodeIdx`, not by map identifier, so the
//! router never probes the hash index while relaxing edges.  Within one
//! source node, edges keep the order in which they were added.
//!
//! Street names are interned: every edge of one way shares a [`NameId`],
//! and `NameId(0)` is always the empty name.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds every node with at least one outgoing edge.
//! It answers "closest road node to this point" for snapping isolated
//! landmarks onto the network.

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use tracing::debug;

use pm_core::{EdgeId, GeoPoint, NameId, NodeId, NodeIdx, contains_ignore_ascii_case, levenshtein};

// ── R-tree road entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D `[lat, lon]` point with the node's index.
#[derive(Clone)]
struct RoadEntry {
    point: [f64; 2], // [lat, lon]
    idx: NodeIdx,
}

impl RTreeObject for RoadEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for RoadEntry {
    /// Squared Euclidean distance in raw lat/lon degrees.  Only used to find
    /// the closest road node within a few hundred metres, where the
    /// distortion between degrees of latitude and longitude does not change
    /// the winner in practice.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        GeoPoint::new(self.point[0], self.point[1]).degree_distance_2(GeoPoint::new(point[0], point[1]))
    }
}

// ── Node / edge views ─────────────────────────────────────────────────────────

/// A point of the street graph.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub pos: GeoPoint,
    /// Display name aggregated from the node's naming tags, if any.
    pub name: Option<String>,
}

impl Node {
    #[inline]
    pub fn lat(&self) -> f64 {
        self.pos.lat
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.pos.lon
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Borrowed view of one directed edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeRef<'g> {
    pub id: EdgeId,
    pub target: NodeId,
    pub target_idx: NodeIdx,
    pub weight_m: f64,
    /// Street name; empty when the way carried no naming tag.
    pub name: &'g str,
}

/// Result of [`RoadGraph::find_fuzzy`].
#[derive(Clone, Debug, Default)]
pub struct FuzzyMatches<'g> {
    pub nodes: Vec<&'g Node>,
    /// `true` if more nodes matched than the cap allowed.
    pub truncated: bool,
}

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Weighted directed street graph in CSR format plus a spatial index of road
/// nodes.
///
/// The graph is immutable; build one with [`RoadGraphBuilder`].  Routing
/// keeps its per-query state outside the graph, so a `&RoadGraph` can be
/// shared freely between readers.
pub struct RoadGraph {
    // ── Node data ─────────────────────────────────────────────────────────
    /// All nodes in insertion order.  Indexed by `NodeIdx`.
    pub nodes: Vec<Node>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_to: Vec<NodeIdx>,

    /// Great-circle length of each edge in metres.  Used as Dijkstra cost.
    pub edge_weight_m: Vec<f64>,

    pub edge_name: Vec<NameId>,

    // ── Lookup structures ─────────────────────────────────────────────────
    names: Vec<String>,
    index: FxHashMap<NodeId, NodeIdx>,
    road_idx: RTree<RoadEntry>,
}

impl RoadGraph {
    /// Construct a graph with no nodes or edges.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes that carry at least one outgoing edge.
    pub fn road_node_count(&self) -> usize {
        self.road_idx.size()
    }

    // ── Node lookup ───────────────────────────────────────────────────────

    /// O(1) expected lookup by map identifier.
    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.nodes[idx.index()])
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIdx> {
        self.index.get(&id).copied()
    }

    #[inline]
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.index()]
    }

    /// Every node exactly once, in insertion order.
    pub fn all_nodes(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeIdx) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeIdx) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    #[inline]
    pub fn has_edges(&self, node: NodeIdx) -> bool {
        self.out_degree(node) > 0
    }

    pub fn edge(&self, edge: EdgeId) -> EdgeRef<'_> {
        let target_idx = self.edge_to[edge.index()];
        EdgeRef {
            id: edge,
            target: self.nodes[target_idx.index()].id,
            target_idx,
            weight_m: self.edge_weight_m[edge.index()],
            name: self.street_name(self.edge_name[edge.index()]),
        }
    }

    /// Outgoing edges of `node` as borrowed views, in insertion order.
    pub fn edges(&self, node: NodeIdx) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.out_edges(node).map(|e| self.edge(e))
    }

    pub fn street_name(&self, name: NameId) -> &str {
        &self.names[name.index()]
    }

    // ── Name search ───────────────────────────────────────────────────────

    /// Every node whose name contains `query`, ignoring ASCII case.
    ///
    /// Results follow insertion order.  An empty query matches nothing.
    pub fn find_by_substring(&self, query: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.name().is_some_and(|name| contains_ignore_ascii_case(name, query)))
            .collect()
    }

    /// Every named node within `max_distance` edits of `query`, ignoring
    /// ASCII case, capped at `cap` results.
    ///
    /// An empty query matches nothing.
    pub fn find_fuzzy(&self, query: &str, max_distance: usize, cap: usize) -> FuzzyMatches<'_> {
        let mut out = FuzzyMatches::default();
        if query.is_empty() {
            return out;
        }
        let query_len = query.len();

        for node in &self.nodes {
            let Some(name) = node.name() else { continue };
            // Byte-length difference is a lower bound on the edit distance.
            if name.len().abs_diff(query_len) > max_distance {
                continue;
            }
            if levenshtein(name, query) > max_distance {
                continue;
            }
            if out.nodes.len() == cap {
                out.truncated = true;
                break;
            }
            out.nodes.push(node);
        }
        out
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The road node (one with outgoing edges) closest to `pos` in raw
    /// degree space.
    ///
    /// Returns `None` only if no node has edges.
    pub fn nearest_road_node(&self, pos: GeoPoint) -> Option<&Node> {
        self.road_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| &self.nodes[e.idx.index()])
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// Nodes must be added before the edges that reference them; edges whose
/// source or target is unknown are dropped.  A repeated node identifier keeps
/// the first insertion.
///
/// # Example
///
/// ```
/// use pm_core::{GeoPoint, NodeId};
/// use pm_spatial::RoadGraphBuilder;
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_node(NodeId(1), GeoPoint::new(44.81, 20.46), None);
/// b.add_node(NodeId(2), GeoPoint::new(44.82, 20.46), None);
/// b.add_road(NodeId(1), NodeId(2), 1_112.0, "Knez Mihailova");
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // both directions
/// ```
pub struct RoadGraphBuilder {
    nodes:      Vec<Node>,
    index:      FxHashMap<NodeId, NodeIdx>,
    raw_edges:  Vec<RawEdge>,
    names:      Vec<String>,
    name_index: FxHashMap<String, NameId>,
}

struct RawEdge {
    from:     NodeIdx,
    to:       NodeIdx,
    weight_m: f64,
    name:     NameId,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocate for the expected number of nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        let mut b = Self {
            nodes:      Vec::with_capacity(nodes),
            index:      FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges:  Vec::new(),
            names:      Vec::new(),
            name_index: FxHashMap::default(),
        };
        b.intern("");
        b
    }

    /// Add a node.  Returns `false` (and changes nothing) if `id` is already
    /// present.
    pub fn add_node(&mut self, id: NodeId, pos: GeoPoint, name: Option<String>) -> bool {
        if self.index.contains_key(&id) {
            debug!(node = %id, "duplicate node id ignored");
            return false;
        }
        let idx = NodeIdx(self.nodes.len() as u32);
        self.nodes.push(Node { id, pos, name });
        self.index.insert(id, idx);
        true
    }

    /// Add a **directed** edge.  Returns `false` if either endpoint is
    /// unknown, in which case nothing is added.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, weight_m: f64, name: &str) -> bool {
        let (Some(from), Some(to)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        let name = self.intern(name);
        self.raw_edges.push(RawEdge { from, to, weight_m, name });
        true
    }

    /// Add edges in **both directions** with identical weight and name.
    /// Returns `false` if either endpoint is unknown.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, weight_m: f64, name: &str) -> bool {
        let (Some(ia), Some(ib)) = (self.index_of(a), self.index_of(b)) else {
            return false;
        };
        let name = self.intern(name);
        self.raw_edges.push(RawEdge { from: ia, to: ib, weight_m, name });
        self.raw_edges.push(RawEdge { from: ib, to: ia, weight_m, name });
        true
    }

    /// Look up a node added earlier (the loaders use it to weigh way
    /// segments).
    pub fn find_by_id(&self, id: NodeId) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.nodes[idx.index()])
    }

    fn index_of(&self, id: NodeId) -> Option<NodeIdx> {
        self.index.get(&id).copied()
    }

    fn intern(&mut self, name: &str) -> NameId {
        if let Some(&id) = self.name_index.get(name) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.name_index.insert(name.to_owned(), id);
        id
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the edge sort + O(R log R) for the
    /// R-tree bulk load, where E = edges, R = road nodes.
    pub fn build(self) -> RoadGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps per-node insertion order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_to:       Vec<NodeIdx> = raw.iter().map(|e| e.to).collect();
        let edge_weight_m: Vec<f64>     = raw.iter().map(|e| e.weight_m).collect();
        let edge_name:     Vec<NameId>  = raw.iter().map(|e| e.name).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let entries: Vec<RoadEntry> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| node_out_start[i + 1] > node_out_start[*i])
            .map(|(i, n)| RoadEntry {
                point: [n.pos.lat, n.pos.lon],
                idx: NodeIdx(i as u32),
            })
            .collect();
        let road_idx = RTree::bulk_load(entries);

        RoadGraph {
            nodes: self.nodes,
            node_out_start,
            edge_to,
            edge_weight_m,
            edge_name,
            names: self.names,
            index: self.index,
            road_idx,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
