//! `pm-core` — foundational types for the `pathmap` street router.
//!
//! This crate is a dependency of every other `pm-*` crate.  It has no
//! `pm-*` dependencies and only small external ones (`strsim`, `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId` (map identifier), `NodeIdx`, `EdgeId`, `NameId` |
//! | [`geo`]         | `GeoPoint`, haversine distance                        |
//! | [`text`]        | case-insensitive substring match, Levenshtein distance |
//! | [`error`]       | `PmError`                                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod text;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::PmError;
pub use geo::{EARTH_RADIUS_M, GeoPoint, distance_m};
pub use ids::{EdgeId, NameId, NodeId, NodeIdx};
pub use text::{contains_ignore_ascii_case, levenshtein};
