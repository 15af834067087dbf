//! `pm-spatial` — street graph, map ingest, name resolution, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`graph`]    | `RoadGraph` (CSR + id index + R-tree), `RoadGraphBuilder`   |
//! | [`osm`]      | `load_from_osm_xml`, `IngestConfig`, `IngestStats`          |
//! | [`pbf`]      | `load_from_pbf` (feature = `"pbf"` only)                    |
//! | [`resolver`] | `Resolver`, `Resolution`, `Snap`                            |
//! | [`router`]   | `Router` trait, `PathResult`, `DijkstraRouter`              |
//! | [`describe`] | `path_labels`, `format_path`                                |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `pbf`   | Enables OSM PBF loading via the `osmpbf` crate.              |
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |
//!
//! # Concurrency
//!
//! A built [`RoadGraph`] is immutable and routing keeps its state per call,
//! so one graph can serve any number of readers.

pub mod describe;
pub mod error;
pub mod graph;
pub mod osm;
pub mod resolver;
pub mod router;

#[cfg(feature = "pbf")]
pub mod pbf;


pub use describe::{format_path, path_labels};
pub use error::{SpatialError, SpatialResult};
pub use graph::{EdgeRef, FuzzyMatches, Node, RoadGraph, RoadGraphBuilder};
pub use osm::{IngestConfig, IngestStats, load_from_osm_xml};
pub use resolver::{MatchKind, Resolution, Resolver, ResolverConfig, Snap};
pub use router::{DijkstraRouter, PathResult, Router};
