//! # Graph
//!
//! The mutable, identifier-keyed directed graph used both as host graph and
//! as production pattern.
//!
//! All data structures use `BTreeMap` for deterministic ordering.
//! Adjacency is kept as an insertion-ordered target list per source, plus a
//! reverse index so that removing a vertex touches only its own edges.

use crate::{GraftError, Label, Vertex, VertexId};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix of identifiers handed out by [`Graph::fresh_identifier`].
pub const FRESH_PREFIX: &str = "v";

/// A directed graph of labelled vertices.
///
/// Invariants:
/// - every edge endpoint has an entry in `vertices`
/// - no duplicate edge (same source, same target)
/// - `incoming` is the exact transpose of `edges`
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Vertex storage: VertexId -> Vertex
    vertices: BTreeMap<VertexId, Vertex>,

    /// Adjacency list: source -> targets, in insertion order
    edges: BTreeMap<VertexId, Vec<VertexId>>,

    /// Reverse adjacency: target -> sources
    incoming: BTreeMap<VertexId, BTreeSet<VertexId>>,

    /// Counter behind `fresh_identifier`; only ever grows
    next_fresh: u64,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Insert a vertex if its identifier is not already present.
    ///
    /// Returns `false` (and keeps the existing label) when the identifier is
    /// taken.
    pub fn add_vertex(&mut self, vertex: Vertex) -> bool {
        if self.vertices.contains_key(vertex.id()) {
            return false;
        }
        let id = vertex.id().clone();
        self.edges.entry(id.clone()).or_default();
        self.incoming.entry(id.clone()).or_default();
        self.vertices.insert(id, vertex);
        true
    }

    /// Add the edge `source -> target`, inserting either vertex if missing.
    ///
    /// Idempotent: returns `false` when the edge already existed.
    pub fn add_edge(&mut self, source: Vertex, target: Vertex) -> bool {
        let from = source.id().clone();
        let to = target.id().clone();
        self.add_vertex(source);
        self.add_vertex(target);
        self.link(from, to)
    }

    /// Add the edge `from -> to` between two existing vertices.
    ///
    /// Returns `Ok(false)` when the edge already existed.
    pub fn connect(&mut self, from: &VertexId, to: &VertexId) -> Result<bool, GraftError> {
        for id in [from, to] {
            if !self.vertices.contains_key(id) {
                return Err(GraftError::UnknownVertex(id.clone()));
            }
        }
        Ok(self.link(from.clone(), to.clone()))
    }

    fn link(&mut self, from: VertexId, to: VertexId) -> bool {
        let targets = self.edges.entry(from.clone()).or_default();
        if targets.contains(&to) {
            return false;
        }
        targets.push(to.clone());
        self.incoming.entry(to).or_default().insert(from);
        true
    }

    /// Remove the edge `from -> to`. Returns whether an edge was removed.
    pub fn remove_edge(&mut self, from: &VertexId, to: &VertexId) -> bool {
        let Some(targets) = self.edges.get_mut(from) else {
            return false;
        };
        let Some(position) = targets.iter().position(|t| t == to) else {
            return false;
        };
        targets.remove(position);
        if let Some(sources) = self.incoming.get_mut(to) {
            sources.remove(from);
        }
        true
    }

    /// Remove a vertex together with every edge it is source or target of.
    ///
    /// Returns the removed vertex, or `None` if it was not present.
    pub fn remove_vertex(&mut self, id: &VertexId) -> Option<Vertex> {
        let vertex = self.vertices.remove(id)?;

        for target in self.edges.remove(id).unwrap_or_default() {
            if let Some(sources) = self.incoming.get_mut(&target) {
                sources.remove(id);
            }
        }
        for source in self.incoming.remove(id).unwrap_or_default() {
            if let Some(targets) = self.edges.get_mut(&source) {
                targets.retain(|t| t != id);
            }
        }

        Some(vertex)
    }

    /// Allocate an identifier that no vertex of this graph currently uses.
    ///
    /// Draws `v0`, `v1`, ... from a per-graph counter that never goes back,
    /// skipping values already taken by inserted vertices.
    pub fn fresh_identifier(&mut self) -> VertexId {
        loop {
            let candidate = VertexId::new(format!("{FRESH_PREFIX}{}", self.next_fresh));
            self.next_fresh = self.next_fresh.saturating_add(1);
            if !self.vertices.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Check if the graph contains the edge `from -> to`.
    #[must_use]
    pub fn has_edge(&self, from: &VertexId, to: &VertexId) -> bool {
        self.edges
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// Check if the graph contains a vertex.
    #[must_use]
    pub fn contains_vertex(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Lookup a vertex by identifier.
    #[must_use]
    pub fn vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    /// Lookup the label of a vertex.
    #[must_use]
    pub fn label(&self, id: &VertexId) -> Option<&Label> {
        self.vertices.get(id).map(Vertex::label)
    }

    /// Get the total number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Out-neighbours of a vertex in insertion order. Empty for unknown ids.
    #[must_use]
    pub fn successors(&self, id: &VertexId) -> &[VertexId] {
        self.edges.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// In-neighbours of a vertex in identifier order.
    pub fn predecessors(&self, id: &VertexId) -> impl Iterator<Item = &VertexId> + '_ {
        self.incoming.get(id).into_iter().flatten()
    }

    #[must_use]
    pub fn out_degree(&self, id: &VertexId) -> usize {
        self.successors(id).len()
    }

    /// Get all vertices in deterministic order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Get all vertex identifiers in deterministic order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = &VertexId> {
        self.vertices.keys()
    }

    /// Get all edges in deterministic order (by source, then insertion).
    pub fn edges(&self) -> impl Iterator<Item = (&VertexId, &VertexId)> + '_ {
        self.edges
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    /// Vertices carrying the given label, in identifier order.
    pub fn vertices_with_label<'a>(
        &'a self,
        label: &'a Label,
    ) -> impl Iterator<Item = &'a Vertex> + 'a {
        self.vertices.values().filter(move |v| v.label() == label)
    }

    /// Verify the structural invariants: every edge endpoint exists, no edge
    /// is duplicated, and the reverse index mirrors the adjacency list.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = BTreeSet::new();
        for (from, to) in self.edges() {
            if !self.contains_vertex(from) || !self.contains_vertex(to) {
                return false;
            }
            if !seen.insert((from, to)) {
                return false;
            }
            if !self.incoming.get(to).is_some_and(|s| s.contains(from)) {
                return false;
            }
        }
        let reverse_edges: usize = self.incoming.values().map(BTreeSet::len).sum();
        reverse_edges == seen.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> VertexId {
        VertexId::new(s)
    }

    #[test]
    fn add_vertex_does_not_overwrite_label() {
        let mut graph = Graph::new();

        assert!(graph.add_vertex(Vertex::new("g0", "A")));
        assert!(!graph.add_vertex(Vertex::new("g0", "B")));

        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.label(&id("g0")), Some(&Label::new("A")));
    }

    #[test]
    fn add_vertex_starts_with_empty_adjacency() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("g0", "A"));

        assert!(graph.successors(&id("g0")).is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn add_edge_inserts_missing_endpoints() {
        let mut graph = Graph::new();
        assert!(graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B")));

        assert_eq!(graph.vertex_count(), 2);
        assert!(graph.has_edge(&id("g0"), &id("g1")));
        assert!(!graph.has_edge(&id("g1"), &id("g0")));
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut graph = Graph::new();
        assert!(graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B")));
        assert!(!graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B")));

        assert_eq!(graph.successors(&id("g0")).len(), 1);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn successors_keep_insertion_order() {
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("a", "A"), Vertex::new("c", "C"));
        graph.add_edge(Vertex::new("a", "A"), Vertex::new("b", "B"));

        assert_eq!(graph.successors(&id("a")), &[id("c"), id("b")]);
    }

    #[test]
    fn connect_rejects_unknown_vertices() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("g0", "A"));

        let result = graph.connect(&id("g0"), &id("missing"));
        assert!(matches!(result, Err(GraftError::UnknownVertex(v)) if v == id("missing")));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn remove_edge_is_noop_when_absent() {
        let mut graph = Graph::new();
        graph.add_edge(Vertex::new("g0", "A"), Vertex::new("g1", "B"));

        assert!(!graph.remove_edge(&id("g1"), &id("g0")));
        assert!(graph.remove_edge(&id("g0"), &id("g1")));
        assert!(!graph.remove_edge(&id("g0"), &id("g1")));

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.predecessors(&id("g1")).count(), 0);
    }

    #[test]
    fn remove_vertex_cascades_edges() {
        let mut graph = Graph::new();
        let hub = Vertex::new("hub", "H");
        graph.add_edge(Vertex::new("a", "A"), hub.clone());
        graph.add_edge(hub.clone(), Vertex::new("b", "B"));
        graph.add_edge(hub.clone(), hub.clone());
        graph.add_edge(Vertex::new("a", "A"), Vertex::new("b", "B"));

        let removed = graph.remove_vertex(&id("hub"));

        assert_eq!(removed, Some(hub));
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.has_edge(&id("a"), &id("b")));
        assert!(graph.edges().all(|(f, t)| f != &id("hub") && t != &id("hub")));
        assert!(graph.is_consistent());
    }

    #[test]
    fn remove_missing_vertex_returns_none() {
        let mut graph = Graph::new();
        assert!(graph.remove_vertex(&id("ghost")).is_none());
    }

    #[test]
    fn fresh_identifier_counts_from_zero() {
        let mut graph = Graph::new();
        assert_eq!(graph.fresh_identifier(), id("v0"));
        assert_eq!(graph.fresh_identifier(), id("v1"));
    }

    #[test]
    fn fresh_identifier_skips_taken_values() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("v0", "A"));
        graph.add_vertex(Vertex::new("v1", "A"));

        let fresh = graph.fresh_identifier();
        assert_eq!(fresh, id("v2"));
        assert!(!graph.contains_vertex(&fresh));
    }

    #[test]
    fn vertices_with_label_filters_in_order() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new("b", "X"));
        graph.add_vertex(Vertex::new("a", "X"));
        graph.add_vertex(Vertex::new("c", "Y"));

        let label = Label::new("X");
        let ids: Vec<_> = graph.vertices_with_label(&label).map(|v| v.id().clone()).collect();
        assert_eq!(ids, vec![id("a"), id("b")]);
    }
}
