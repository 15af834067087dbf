//! OSM XML loader.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use pm_spatial::osm::{IngestConfig, load_from_osm_xml};
//!
//! let (graph, stats) = load_from_osm_xml(Path::new("beograd.osm"), &IngestConfig::default())?;
//! ```
//!
//! # What is recognised
//!
//! The loader is a single-pass, line-oriented scanner rather than an XML
//! processor.  Each line is classified by the first matching pattern:
//!
//! | Pattern            | Effect                                                    |
//! |--------------------|-----------------------------------------------------------|
//! | `<node id lat lon` | self-closing: add a nameless node; otherwise open a node  |
//! | `</node>`          | add the open node with its aggregated name                |
//! | `<way`             | open a way                                                |
//! | `</way>`           | if tagged `highway`, add both directions of each segment  |
//! | `<nd ref`          | append a node reference to the open way                   |
//! | `<tag k v`         | naming tags feed the name; `highway` marks a road         |
//!
//! Attributes split across lines, several elements on one line, and CDATA
//! are not understood.  Lines that match a pattern but lack a required
//! attribute are skipped.  Every highway is treated as two-way.
//!
//! # Name aggregation
//!
//! `name`, `name:sr-Latn`, and `int_name` contribute to a display name.  The
//! first one seeds it; each later value that is not already a substring of
//! the accumulated name is appended after `" / "`.  The result depends on tag
//! order: `Street` then `Main Street` gives `Street / Main Street`, while the
//! reverse order gives just `Main Street`.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, trace, warn};

use pm_core::{GeoPoint, NodeId};

use crate::graph::{RoadGraph, RoadGraphBuilder};
use crate::{SpatialError, SpatialResult};

/// Tag keys whose values contribute to a display name.
pub const NAME_KEYS: [&str; 3] = ["name", "name:sr-Latn", "int_name"];

// ── Configuration & statistics ────────────────────────────────────────────────

/// Loader limits.
#[derive(Clone, Debug)]
pub struct IngestConfig {
    /// Node references kept per way; the rest are dropped.
    pub max_way_refs: usize,
    /// Expected node count, used to pre-size the graph.
    pub capacity_hint: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { max_way_refs: 50_000, capacity_hint: 100_000 }
    }
}

/// Counters collected while loading a map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub nodes:            usize,
    pub named_nodes:      usize,
    pub duplicate_nodes:  usize,
    pub ways:             usize,
    pub highway_ways:     usize,
    /// Directed edges added (two per road segment).
    pub edges:            usize,
    /// Way segments dropped because an endpoint was not a known node.
    pub skipped_segments: usize,
    pub truncated_ways:   usize,
    pub skipped_lines:    usize,
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Load a street graph from an OSM XML file.
///
/// # Errors
///
/// Returns [`SpatialError::MapFile`] if the file cannot be opened and
/// [`SpatialError::Io`] if reading fails part-way through.
pub fn load_from_osm_xml(path: &Path, config: &IngestConfig) -> SpatialResult<(RoadGraph, IngestStats)> {
    let file = File::open(path).map_err(|source| SpatialError::MapFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading OSM XML map");
    load_from_reader(BufReader::with_capacity(64 * 1024, file), config)
}

/// Like [`load_from_osm_xml`] but accepts any `BufRead` source.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_from_reader<R: BufRead>(
    mut reader: R,
    config: &IngestConfig,
) -> SpatialResult<(RoadGraph, IngestStats)> {
    let mut builder = RoadGraphBuilder::with_capacity(config.capacity_hint);
    let mut stats = IngestStats::default();

    let mut scope = Scope::Outside;
    // One scratch draft reused for every way in the file.
    let mut way = WayDraft::with_capacity(config.max_way_refs);
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let text = String::from_utf8_lossy(&buf);
        let line: &str = &text;

        if line.contains("<node") {
            match parse_node_head(line) {
                Some((id, pos)) if line.contains("/>") => {
                    add_node(&mut builder, &mut stats, id, pos, None);
                    scope = Scope::Outside;
                }
                Some((id, pos)) => scope = Scope::Node { id, pos, name: None },
                None => skip_line(&mut stats, line_no, line),
            }
        } else if line.contains("</node>") && matches!(scope, Scope::Node { .. }) {
            if let Scope::Node { id, pos, name } = std::mem::replace(&mut scope, Scope::Outside) {
                add_node(&mut builder, &mut stats, id, pos, name);
            }
        } else if line.contains("<way") {
            way.reset(attr(line, "id").and_then(|s| s.parse().ok()));
            stats.ways += 1;
            scope = Scope::Way;
        } else if line.contains("</way>") && matches!(scope, Scope::Way) {
            finish_way(&mut builder, &mut stats, &way);
            scope = Scope::Outside;
        } else if line.contains("<nd") && matches!(scope, Scope::Way) {
            match attr(line, "ref").and_then(|s| s.parse::<i64>().ok()) {
                Some(r) => way.push_ref(NodeId(r), config.max_way_refs),
                None => skip_line(&mut stats, line_no, line),
            }
        } else if line.contains("<tag") && !matches!(scope, Scope::Outside) {
            let (Some(k), Some(v)) = (attr(line, "k"), attr(line, "v")) else {
                skip_line(&mut stats, line_no, line);
                continue;
            };
            let v = unescape(v);
            match &mut scope {
                Scope::Node { name, .. } => {
                    if is_name_key(k) {
                        merge_name(name, &v);
                    }
                }
                Scope::Way => way.apply_tag(k, &v),
                Scope::Outside => {}
            }
        }
    }

    Ok(finish(builder, stats))
}

// ── Shared loader plumbing ────────────────────────────────────────────────────

/// What the scanner is currently inside of.
enum Scope {
    Outside,
    Node { id: NodeId, pos: GeoPoint, name: Option<String> },
    Way,
}

/// A way being collected: its references, road flag, and aggregated name.
pub(crate) struct WayDraft {
    pub(crate) id:        Option<i64>,
    pub(crate) refs:      Vec<NodeId>,
    pub(crate) highway:   bool,
    pub(crate) name:      Option<String>,
    pub(crate) truncated: bool,
}

impl WayDraft {
    pub(crate) fn with_capacity(refs: usize) -> Self {
        Self { id: None, refs: Vec::with_capacity(refs), highway: false, name: None, truncated: false }
    }

    fn reset(&mut self, id: Option<i64>) {
        self.id = id;
        self.refs.clear();
        self.highway = false;
        self.name = None;
        self.truncated = false;
    }

    pub(crate) fn push_ref(&mut self, node: NodeId, limit: usize) {
        if self.refs.len() < limit {
            self.refs.push(node);
        } else {
            self.truncated = true;
        }
    }

    pub(crate) fn apply_tag(&mut self, key: &str, value: &str) {
        if key == "highway" {
            self.highway = true;
        }
        if is_name_key(key) {
            merge_name(&mut self.name, value);
        }
    }
}

pub(crate) fn is_name_key(key: &str) -> bool {
    NAME_KEYS.contains(&key)
}

/// Fold one naming-tag value into an accumulated display name.
pub fn merge_name(acc: &mut Option<String>, value: &str) {
    match acc {
        None => *acc = Some(value.to_owned()),
        Some(name) if !name.contains(value) => {
            name.push_str(" / ");
            name.push_str(value);
        }
        Some(_) => {}
    }
}

pub(crate) fn add_node(
    builder: &mut RoadGraphBuilder,
    stats: &mut IngestStats,
    id: NodeId,
    pos: GeoPoint,
    name: Option<String>,
) {
    let named = name.is_some();
    if builder.add_node(id, pos, name) {
        stats.nodes += 1;
        stats.named_nodes += usize::from(named);
    } else {
        stats.duplicate_nodes += 1;
    }
}

/// Emit both directions of every segment of a finished highway way.
pub(crate) fn finish_way(builder: &mut RoadGraphBuilder, stats: &mut IngestStats, way: &WayDraft) {
    if way.truncated {
        stats.truncated_ways += 1;
        warn!(way = ?way.id, kept = way.refs.len(), "way has too many node references; truncated");
    }
    if !way.highway {
        return;
    }
    stats.highway_ways += 1;
    if way.refs.len() < 2 {
        return;
    }

    let name = way.name.as_deref().unwrap_or("");
    for pair in way.refs.windows(2) {
        let (u, v) = (pair[0], pair[1]);
        let (Some(a), Some(b)) = (builder.find_by_id(u), builder.find_by_id(v)) else {
            stats.skipped_segments += 1;
            continue;
        };
        let weight_m = a.pos.distance_m(b.pos);
        builder.add_road(u, v, weight_m, name);
        stats.edges += 2;
    }
}

pub(crate) fn finish(builder: RoadGraphBuilder, stats: IngestStats) -> (RoadGraph, IngestStats) {
    let graph = builder.build();
    info!(
        nodes = stats.nodes,
        named_nodes = stats.named_nodes,
        ways = stats.ways,
        highway_ways = stats.highway_ways,
        edges = stats.edges,
        road_nodes = graph.road_node_count(),
        "map loaded"
    );
    if stats.duplicate_nodes > 0 {
        warn!(count = stats.duplicate_nodes, "duplicate node ids ignored (first occurrence kept)");
    }
    (graph, stats)
}

// ── Line scanning helpers ─────────────────────────────────────────────────────

fn skip_line(stats: &mut IngestStats, line_no: usize, line: &str) {
    stats.skipped_lines += 1;
    trace!(line_no, line = line.trim_end(), "skipping malformed line");
}

fn parse_node_head(line: &str) -> Option<(NodeId, GeoPoint)> {
    let id = attr(line, "id")?.parse::<i64>().ok()?;
    let lat = attr(line, "lat")?.parse::<f64>().ok().filter(|v| v.is_finite())?;
    let lon = attr(line, "lon")?.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((NodeId(id), GeoPoint::new(lat, lon)))
}

/// Value of the double-quoted attribute `name` on `line`.
///
/// The attribute name must start the line or follow whitespace, so `id`
/// does not match inside `uid`.
fn attr<'l>(line: &'l str, name: &str) -> Option<&'l str> {
    let mut from = 0;
    while let Some(pos) = line[from..].find(name) {
        let start = from + pos;
        let after = start + name.len();
        let at_boundary = start == 0 || line.as_bytes()[start - 1].is_ascii_whitespace();
        if at_boundary && line[after..].starts_with("=\"") {
            let value = &line[after + 2..];
            return value.find('"').map(|end| &value[..end]);
        }
        from = after;
    }
    None
}

/// Decode the five predefined XML entities.
fn unescape(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
