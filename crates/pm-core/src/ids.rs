//! Strongly typed identifier wrappers.
//!
//! Two families live here:
//!
//! - [`NodeId`] is the identifier a map file assigns to a point.  It is a
//!   signed 64-bit integer, sparse, and only meaningful as a lookup key.
//! - [`NodeIdx`], [`EdgeId`], and [`NameId`] are dense `u32` positions into
//!   the frozen graph's arrays.  They are `Copy + Ord + Hash` and expose an
//!   `.index()` helper for direct `Vec` indexing on hot paths.

use std::fmt;
use std::str::FromStr;

use crate::PmError;

/// Generate a dense index wrapper around a primitive integer.
macro_rules! typed_index {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid index".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized indexes are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_index! {
    /// Position of a node in the graph's node array (insertion order).
    pub struct NodeIdx(u32);
}

typed_index! {
    /// Position of a directed edge in the graph's CSR edge arrays.
    pub struct EdgeId(u32);
}

typed_index! {
    /// Position of an interned street name.  `NameId(0)` is the empty name.
    pub struct NameId(u32);
}

/// Identifier of a map node as it appears in the source document.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    #[inline]
    fn from(raw: i64) -> Self {
        NodeId(raw)
    }
}

impl FromStr for NodeId {
    type Err = PmError;

    /// Accepts an optionally signed decimal integer and nothing else.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(NodeId)
            .map_err(|_| PmError::InvalidNodeId(s.to_owned()))
    }
}
