//! # Production
//!
//! A rewrite rule: the LHS pattern to find (and partially remove) and the RHS
//! pattern describing the local structure after the rewrite.
//!
//! LHS and RHS are correlated purely by vertex identifier:
//! - identifier in both: the role survives the rewrite
//! - identifier only in the LHS: the matched host vertex is deleted
//! - identifier only in the RHS: a new host vertex is created

use crate::graph::Graph;
use crate::{GraftError, PatternSide, Vertex, VertexId};

/// An immutable (LHS, RHS) pair.
#[derive(Debug, Clone)]
pub struct Production {
    name: Option<String>,
    lhs: Graph,
    rhs: Graph,
}

impl Production {
    /// Create a new anonymous production.
    #[must_use]
    pub fn new(lhs: Graph, rhs: Graph) -> Self {
        Self {
            name: None,
            lhs,
            rhs,
        }
    }

    /// Create a named production. The name is used in logs and reports only.
    #[must_use]
    pub fn named(name: impl Into<String>, lhs: Graph, rhs: Graph) -> Self {
        Self {
            name: Some(name.into()),
            lhs,
            rhs,
        }
    }

    /// Build a production from raw vertex and edge lists.
    ///
    /// Fails with `MalformedProduction` when an edge names a vertex that is
    /// not declared on the same side, and with `DuplicateVertex` when one
    /// side declares an identifier twice with different labels.
    pub fn from_parts(
        name: Option<String>,
        lhs: (Vec<Vertex>, Vec<(VertexId, VertexId)>),
        rhs: (Vec<Vertex>, Vec<(VertexId, VertexId)>),
    ) -> Result<Self, GraftError> {
        Ok(Self {
            name,
            lhs: build_pattern(PatternSide::Lhs, lhs.0, lhs.1)?,
            rhs: build_pattern(PatternSide::Rhs, rhs.0, rhs.1)?,
        })
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The pattern to match.
    #[must_use]
    pub fn lhs(&self) -> &Graph {
        &self.lhs
    }

    /// The pattern to leave behind.
    #[must_use]
    pub fn rhs(&self) -> &Graph {
        &self.rhs
    }

    /// Identifiers present on both sides, in identifier order.
    pub fn preserved_ids(&self) -> impl Iterator<Item = &VertexId> {
        self.lhs
            .vertex_ids()
            .filter(|id| self.rhs.contains_vertex(id))
    }

    /// Identifiers present only in the LHS.
    pub fn deleted_ids(&self) -> impl Iterator<Item = &VertexId> {
        self.lhs
            .vertex_ids()
            .filter(|id| !self.rhs.contains_vertex(id))
    }

    /// Vertices present only in the RHS.
    pub fn created_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.rhs
            .vertices()
            .filter(|v| !self.lhs.contains_vertex(v.id()))
    }

    /// Identifiers present on both sides whose RHS label differs from the
    /// LHS label. The host keeps the matched label for these roles.
    pub fn relabelled_ids(&self) -> impl Iterator<Item = &VertexId> {
        self.lhs.vertices().filter_map(|v| {
            self.rhs
                .vertex(v.id())
                .filter(|r| !r.label_eq(v))
                .map(|_| v.id())
        })
    }

    /// Whether applying this production can change nothing: same vertex
    /// identifiers, same labels, same edges on both sides.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.lhs.vertex_count() == self.rhs.vertex_count()
            && self.lhs.edge_count() == self.rhs.edge_count()
            && self
                .lhs
                .vertices()
                .all(|v| self.rhs.vertex(v.id()).is_some_and(|r| r.label_eq(v)))
            && self.lhs.edges().all(|(from, to)| self.rhs.has_edge(from, to))
    }
}

fn build_pattern(
    side: PatternSide,
    vertices: Vec<Vertex>,
    edges: Vec<(VertexId, VertexId)>,
) -> Result<Graph, GraftError> {
    let mut graph = Graph::new();
    for vertex in vertices {
        if let Some(existing) = graph.vertex(vertex.id()) {
            if !existing.label_eq(&vertex) {
                return Err(GraftError::DuplicateVertex {
                    side,
                    id: vertex.id().clone(),
                    existing: existing.label().clone(),
                    declared: vertex.label().clone(),
                });
            }
            continue;
        }
        graph.add_vertex(vertex);
    }
    for (from, to) in edges {
        if graph.connect(&from, &to).is_err() {
            return Err(GraftError::MalformedProduction { side, from, to });
        }
    }
    Ok(graph)
}

// =============================================================================
// TESTS
// =============================================================================
