//! Core error type.
//!
//! Sub-crates define their own error enums; `PmError` covers parsing the
//! core value types from text.

use thiserror::Error;

/// Errors produced by `pm-core`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PmError {
    #[error("invalid node identifier {0:?}: expected a decimal integer")]
    InvalidNodeId(String),
}
