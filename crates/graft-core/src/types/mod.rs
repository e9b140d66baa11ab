//! # Core Type Definitions
//!
//! This module contains the leaf types of the rewriting engine:
//! - Vertex identifiers and labels (`VertexId`, `Label`)
//! - The immutable `Vertex`
//! - Error types (`GraftError`, `MappingViolation`, `PatternSide`)
//!
//! ## Determinism Guarantees
//!
//! All identifier types implement `Ord` so they can key `BTreeMap`/`BTreeSet`
//! and iterate in the same order on every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS & LABELS
// =============================================================================

/// Opaque identifier of a vertex, unique within its owning graph.
///
/// Identifiers are compared as strings. In productions, an identifier that
/// occurs in both pattern graphs names the same surviving role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub String);

impl VertexId {
    /// Create a new identifier from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VertexId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for VertexId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Category tag of a vertex. Matching compares labels, never identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub String);

impl Label {
    /// Create a new label from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// =============================================================================
// VERTEX
// =============================================================================

/// A labelled vertex. Immutable once constructed; a graph owns its vertices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    id: VertexId,
    label: Label,
}

impl Vertex {
    /// Create a new vertex.
    #[must_use]
    pub fn new(id: impl Into<VertexId>, label: impl Into<Label>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }

    /// The vertex identifier.
    #[must_use]
    pub fn id(&self) -> &VertexId {
        &self.id
    }

    /// The vertex label.
    #[must_use]
    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Two vertices are label-equal when their labels match, whatever their ids.
    #[must_use]
    pub fn label_eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Which pattern graph of a production an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternSide {
    Lhs,
    Rhs,
}

impl fmt::Display for PatternSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lhs => f.write_str("lhs"),
            Self::Rhs => f.write_str("rhs"),
        }
    }
}

/// The reason an LHS mapping was rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingViolation {
    /// Two pattern vertices map to the same host vertex.
    #[error("host vertex {host} is the image of both {first} and {second}")]
    NotInjective {
        host: VertexId,
        first: VertexId,
        second: VertexId,
    },

    /// An LHS vertex has no image.
    #[error("lhs vertex {0} is not mapped")]
    MissingVertex(VertexId),

    /// The mapping names a vertex that is not part of the LHS.
    #[error("{0} is not an lhs vertex")]
    UnknownPatternVertex(VertexId),

    /// The image of an LHS vertex does not exist in the host graph.
    #[error("host vertex {host} (image of {pattern}) does not exist")]
    UnknownHostVertex { pattern: VertexId, host: VertexId },

    /// The image of an LHS vertex carries a different label.
    #[error("{pattern} has label {expected} but host vertex {host} has label {found}")]
    LabelMismatch {
        pattern: VertexId,
        host: VertexId,
        expected: Label,
        found: Label,
    },

    /// An LHS edge has no counterpart in the host graph.
    #[error("lhs edge {from} -> {to} is not realized in the host graph")]
    MissingEdge { from: VertexId, to: VertexId },
}

/// Errors that can occur in the rewriting engine.
///
/// - No silent failures
/// - Use `Result<T, GraftError>` for fallible operations
/// - All errors are local to one call; the engine never panics
#[derive(Debug, Error)]
pub enum GraftError {
    /// The supplied LHS mapping is not a valid occurrence.
    #[error("Invalid mapping: {0}")]
    InvalidMapping(#[from] MappingViolation),

    /// A pattern edge references a vertex absent from the same pattern graph.
    #[error("Malformed production: {side} edge {from} -> {to} references an undeclared vertex")]
    MalformedProduction {
        side: PatternSide,
        from: VertexId,
        to: VertexId,
    },

    /// A pattern graph declares one identifier with two different labels.
    #[error("Malformed production: {side} vertex {id} is both {existing} and {declared}")]
    DuplicateVertex {
        side: PatternSide,
        id: VertexId,
        existing: Label,
        declared: Label,
    },

    /// An id-based graph mutation referenced a vertex that does not exist.
    #[error("Vertex not found: {0}")]
    UnknownVertex(VertexId),

    /// The configured backtracking budget ran out before the search finished.
    #[error("Search budget exhausted after {steps} steps")]
    SearchBudgetExhausted { steps: u64 },

    /// Configuration could not be parsed or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),
}

// =============================================================================
// TESTS
// =============================================================================
