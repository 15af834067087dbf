//! Spatial-subsystem error type.

use std::path::PathBuf;

use thiserror::Error;

use pm_core::NodeId;

/// Errors produced by `pm-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("graph has no road nodes to snap to")]
    NoRoadNodes,

    #[error("cannot read map file {path}: {source}")]
    MapFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "pbf")]
    #[error("OSM PBF parse error: {0}")]
    Osm(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
