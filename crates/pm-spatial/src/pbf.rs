//! OSM PBF loader — enabled with the `pbf` Cargo feature.
//!
//! Applies the same rules as the XML loader ([`crate::osm`]): naming tags
//! build display names, any `highway=*` way becomes two-way road edges
//! weighted by great-circle length, and references to unknown nodes are
//! dropped.
//!
//! PBF blocks store ways after nodes, but the loader does not rely on it:
//! highway ways are buffered during the pass and turned into edges once all
//! nodes are known.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use osmpbf::{Element, ElementReader};
use tracing::info;

use pm_core::{GeoPoint, NodeId};

use crate::graph::{RoadGraph, RoadGraphBuilder};
use crate::osm::{IngestConfig, IngestStats, WayDraft, add_node, finish, finish_way, is_name_key, merge_name};
use crate::{SpatialError, SpatialResult};

/// Load a street graph from an OSM PBF file.
///
/// # Errors
///
/// Returns [`SpatialError::MapFile`] if the file cannot be opened and
/// [`SpatialError::Osm`] on decode errors.
pub fn load_from_pbf(path: &Path, config: &IngestConfig) -> SpatialResult<(RoadGraph, IngestStats)> {
    let file = File::open(path).map_err(|source| SpatialError::MapFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading OSM PBF map");
    let reader = ElementReader::new(BufReader::new(file));

    let mut builder = RoadGraphBuilder::with_capacity(config.capacity_hint);
    let mut stats = IngestStats::default();
    let mut road_ways: Vec<WayDraft> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                let name = node_name(n.tags());
                add_node(&mut builder, &mut stats, NodeId(n.id()), GeoPoint::new(n.lat(), n.lon()), name);
            }
            Element::DenseNode(n) => {
                let name = node_name(n.tags());
                add_node(&mut builder, &mut stats, NodeId(n.id()), GeoPoint::new(n.lat(), n.lon()), name);
            }
            Element::Way(w) => {
                stats.ways += 1;
                let mut draft = WayDraft::with_capacity(0);
                draft.id = Some(w.id());
                for (k, v) in w.tags() {
                    draft.apply_tag(k, v);
                }
                if draft.highway {
                    for r in w.refs() {
                        draft.push_ref(NodeId(r), config.max_way_refs);
                    }
                    road_ways.push(draft);
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::Osm(e.to_string()))?;

    for way in &road_ways {
        finish_way(&mut builder, &mut stats, way);
    }

    Ok(finish(builder, stats))
}

fn node_name<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> Option<String> {
    let mut name = None;
    for (k, v) in tags {
        if is_name_key(k) {
            merge_name(&mut name, v);
        }
    }
    name
}
