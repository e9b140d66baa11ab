//! # Generator
//!
//! Finds occurrences of productions in a host graph and applies them.
//!
//! Applying a production is a validate-then-commit pipeline:
//!
//! ```text
//! validate lhs mapping ──► map rhs to graph ──► delete missing edges
//!        (reject, no mutation)                       │
//!                                                    ▼
//!     add new edges ◄── add new vertices ◄── delete missing vertices
//! ```
//!
//! Edge deletion runs before vertex deletion so its decisions still see
//! intact endpoints; vertex insertion runs before edge insertion so new edges
//! can reference new vertices.

use crate::config::SearchConfig;
use crate::graph::Graph;
use crate::mapping::Mapping;
use crate::matcher::Matcher;
use crate::production::Production;
use crate::{GraftError, MappingViolation, Vertex};

/// One match of one production: the production and its LHS mapping.
#[derive(Debug, Clone)]
pub struct Occurrence<'p> {
    /// Position of the production in the input sequence.
    pub production_index: usize,
    pub production: &'p Production,
    /// LHS identifier -> host identifier.
    pub mapping: Mapping,
}

/// What one application of a production did to the host graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub edges_removed: usize,
    pub vertices_removed: usize,
    pub vertices_added: usize,
    pub edges_added: usize,
    /// RHS identifier -> host identifier, including freshly created vertices.
    pub rhs_mapping: Mapping,
}

impl RewriteSummary {
    /// True when the host graph was left untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.edges_removed == 0
            && self.vertices_removed == 0
            && self.vertices_added == 0
            && self.edges_added == 0
    }
}

/// Matching and rewriting engine.
///
/// Holds only search configuration; graphs and productions are passed per
/// call, so one generator can serve any number of host graphs.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: SearchConfig,
}

impl Generator {
    /// Create a generator with unbounded search.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // =========================================================================
    // MATCHING
    // =========================================================================

    /// Every occurrence of every production, productions in input order.
    ///
    /// A production matching several times contributes one entry per match;
    /// the same production supplied twice contributes twice. An empty LHS
    /// matches once with an empty mapping unless `skip_empty_patterns` is set.
    pub fn find_matching_productions<'p>(
        &self,
        graph: &Graph,
        productions: &'p [Production],
    ) -> Result<Vec<Occurrence<'p>>, GraftError> {
        let limits = self.config.limits();
        let mut occurrences = Vec::new();

        for (production_index, production) in productions.iter().enumerate() {
            if production.lhs().is_empty() {
                if self.config.skip_empty_patterns {
                    continue;
                }
                tracing::warn!(
                    production = production_index,
                    name = production.name(),
                    "empty lhs matches trivially"
                );
            }

            let matches = Matcher::new(production.lhs(), graph)
                .with_limits(limits)
                .find_all()?;
            tracing::debug!(
                production = production_index,
                name = production.name(),
                matches = matches.len(),
                "matched production"
            );

            occurrences.extend(matches.into_iter().map(|mapping| Occurrence {
                production_index,
                production,
                mapping,
            }));
        }

        Ok(occurrences)
    }

    // =========================================================================
    // REWRITING
    // =========================================================================

    /// Rewrite `graph` in place with `production` at `lhs_mapping`.
    ///
    /// The mapping is validated first; on rejection the graph is untouched.
    pub fn apply_production(
        &self,
        graph: &mut Graph,
        production: &Production,
        lhs_mapping: &Mapping,
    ) -> Result<RewriteSummary, GraftError> {
        Self::validate_mapping(graph, production, lhs_mapping)?;

        let mut rhs_mapping = Self::map_rhs_to_graph(production, lhs_mapping);
        let edges_removed =
            Self::delete_missing_edges(graph, production, lhs_mapping, &rhs_mapping);
        let vertices_removed = Self::delete_missing_vertices(graph, production, lhs_mapping);
        let vertices_added = Self::add_new_vertices(graph, production, &mut rhs_mapping);
        let edges_added = Self::add_new_edges(graph, production, &rhs_mapping);

        tracing::debug!(
            name = production.name(),
            edges_removed,
            vertices_removed,
            vertices_added,
            edges_added,
            "applied production"
        );

        Ok(RewriteSummary {
            edges_removed,
            vertices_removed,
            vertices_added,
            edges_added,
            rhs_mapping,
        })
    }

    /// Check that `lhs_mapping` is an occurrence of the production's LHS.
    ///
    /// Rejects mappings that are not injective, omit an LHS vertex, name a
    /// non-LHS vertex, point at a missing host vertex or one with another
    /// label, or leave an LHS edge unrealized.
    pub fn validate_mapping(
        graph: &Graph,
        production: &Production,
        lhs_mapping: &Mapping,
    ) -> Result<(), GraftError> {
        let lhs = production.lhs();

        if let Some((pattern, _)) = lhs_mapping.iter().find(|(p, _)| !lhs.contains_vertex(p)) {
            return Err(MappingViolation::UnknownPatternVertex(pattern.clone()).into());
        }
        if let Some((host, first, second)) = lhs_mapping.find_collision() {
            return Err(MappingViolation::NotInjective {
                host,
                first,
                second,
            }
            .into());
        }

        for vertex in lhs.vertices() {
            let pattern = vertex.id();
            let Some(host) = lhs_mapping.get(pattern) else {
                return Err(MappingViolation::MissingVertex(pattern.clone()).into());
            };
            let Some(found) = graph.label(host) else {
                return Err(MappingViolation::UnknownHostVertex {
                    pattern: pattern.clone(),
                    host: host.clone(),
                }
                .into());
            };
            if found != vertex.label() {
                return Err(MappingViolation::LabelMismatch {
                    pattern: pattern.clone(),
                    host: host.clone(),
                    expected: vertex.label().clone(),
                    found: found.clone(),
                }
                .into());
            }
        }

        for (from, to) in lhs.edges() {
            let realized = lhs_mapping
                .edge_image(from, to)
                .is_some_and(|(gf, gt)| graph.has_edge(gf, gt));
            if !realized {
                return Err(MappingViolation::MissingEdge {
                    from: from.clone(),
                    to: to.clone(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Phase 1: carry the host image of every identifier shared by LHS and
    /// RHS over to the RHS mapping. RHS-only identifiers stay unmapped.
    ///
    /// A shared identifier keeps its host label even when the RHS declares
    /// another one; that is logged, not applied.
    #[must_use]
    pub fn map_rhs_to_graph(production: &Production, lhs_mapping: &Mapping) -> Mapping {
        for pattern in production.relabelled_ids() {
            tracing::warn!(
                name = production.name(),
                %pattern,
                "rhs label differs from lhs label, host label kept"
            );
        }

        production
            .rhs()
            .vertex_ids()
            .filter_map(|id| lhs_mapping.get(id).map(|host| (id.clone(), host.clone())))
            .collect()
    }

    /// Phase 2: remove every host edge matched by an LHS edge that no RHS
    /// edge maps onto. Returns the number of edges removed.
    pub fn delete_missing_edges(
        graph: &mut Graph,
        production: &Production,
        lhs_mapping: &Mapping,
        rhs_mapping: &Mapping,
    ) -> usize {
        let rhs = production.rhs();
        let mut removed = 0;

        for (from, to) in production.lhs().edges() {
            let Some((gf, gt)) = lhs_mapping.edge_image(from, to) else {
                tracing::warn!(%from, %to, "lhs edge endpoint unmapped, skipping");
                continue;
            };
            let survives = rhs
                .edges()
                .any(|(rf, rt)| rhs_mapping.edge_image(rf, rt) == Some((gf, gt)));
            if !survives && graph.remove_edge(gf, gt) {
                tracing::trace!(from = %gf, to = %gt, "removed edge");
                removed += 1;
            }
        }

        removed
    }

    /// Phase 3: remove the host image of every LHS-only vertex, with all of
    /// its edges. Returns the number of vertices removed.
    pub fn delete_missing_vertices(
        graph: &mut Graph,
        production: &Production,
        lhs_mapping: &Mapping,
    ) -> usize {
        let mut removed = 0;

        for pattern in production.deleted_ids() {
            let Some(host) = lhs_mapping.get(pattern) else {
                tracing::warn!(%pattern, "deleted lhs vertex unmapped, skipping");
                continue;
            };
            if graph.remove_vertex(host).is_some() {
                tracing::trace!(vertex = %host, "removed vertex");
                removed += 1;
            }
        }

        removed
    }

    /// Phase 4: create a host vertex for every RHS-only vertex under a fresh
    /// identifier, and record it in `rhs_mapping`. Returns the number added.
    pub fn add_new_vertices(
        graph: &mut Graph,
        production: &Production,
        rhs_mapping: &mut Mapping,
    ) -> usize {
        let mut added = 0;

        for vertex in production.created_vertices() {
            let host = graph.fresh_identifier();
            graph.add_vertex(Vertex::new(host.clone(), vertex.label().clone()));
            tracing::trace!(pattern = %vertex.id(), vertex = %host, "added vertex");
            rhs_mapping.insert(vertex.id().clone(), host);
            added += 1;
        }

        added
    }

    /// Phase 5: add the host image of every RHS edge whose endpoints are both
    /// mapped, unless it already exists. Returns the number of edges added.
    pub fn add_new_edges(
        graph: &mut Graph,
        production: &Production,
        rhs_mapping: &Mapping,
    ) -> usize {
        let mut added = 0;

        for (from, to) in production.rhs().edges() {
            let Some((gf, gt)) = rhs_mapping.edge_image(from, to) else {
                continue;
            };
            match graph.connect(gf, gt) {
                Ok(true) => {
                    tracing::trace!(from = %gf, to = %gt, "added edge");
                    added += 1;
                }
                Ok(false) => {}
                Err(err) => tracing::warn!(%err, "rhs edge image dangles, skipping"),
            }
        }

        added
    }
}

// =============================================================================
// TESTS
// =============================================================================
