//! # Matcher
//!
//! Backtracking subgraph search: finds every injective, label-preserving,
//! edge-preserving embedding of a pattern graph into a host graph.
//!
//! The pattern is matched as a subgraph, not an induced subgraph: extra host
//! vertices and edges are never a reason to reject a match.
//!
//! ## Determinism
//!
//! Pattern vertices are placed in a fixed plan (most constrained first, ties
//! broken by identifier) and host candidates are tried in identifier order,
//! so the same graph/pattern pair always yields the same match sequence.
//!
//! The search is exponential in the worst case. [`SearchLimits::step_limit`]
//! bounds the number of candidate extensions tried per search.

use crate::graph::Graph;
use crate::mapping::Mapping;
use crate::{GraftError, Label, VertexId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

/// Bounds applied to one pattern search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Maximum number of candidate extensions tried. `None` = unbounded.
    pub step_limit: Option<u64>,
    /// Stop after collecting this many matches. `None` = all matches.
    pub max_matches: Option<usize>,
}

impl SearchLimits {
    /// No bounds at all.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            step_limit: None,
            max_matches: None,
        }
    }
}

/// An edge between the vertex being placed and one placed earlier.
#[derive(Debug, Clone, Copy)]
struct Constraint {
    /// Plan position of the earlier vertex.
    earlier: usize,
    /// `true` for pattern edge `current -> earlier`, `false` for the reverse.
    outgoing: bool,
}

#[derive(Debug)]
struct Step<'a> {
    pattern: &'a VertexId,
    candidates: Vec<&'a VertexId>,
    constraints: Vec<Constraint>,
    self_loop: bool,
}

/// Subgraph matcher for one (pattern, host) pair.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'a> {
    pattern: &'a Graph,
    host: &'a Graph,
    limits: SearchLimits,
}

impl<'a> Matcher<'a> {
    /// Create an unbounded matcher.
    #[must_use]
    pub fn new(pattern: &'a Graph, host: &'a Graph) -> Self {
        Self {
            pattern,
            host,
            limits: SearchLimits::unbounded(),
        }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Every match, in deterministic order.
    ///
    /// An empty pattern yields exactly one empty mapping.
    pub fn find_all(&self) -> Result<Vec<Mapping>, GraftError> {
        if self.limits.max_matches == Some(0) {
            return Ok(Vec::new());
        }
        if self.pattern.is_empty() {
            return Ok(vec![Mapping::new()]);
        }

        let Some(plan) = self.plan() else {
            tracing::trace!("pattern label absent from host, no candidates");
            return Ok(Vec::new());
        };

        let mut search = Search {
            host: self.host,
            plan: &plan,
            limits: self.limits,
            images: Vec::with_capacity(plan.len()),
            used: BTreeSet::new(),
            steps: 0,
            found: Vec::new(),
        };
        search.extend(0)?;

        tracing::trace!(
            pattern_vertices = plan.len(),
            steps = search.steps,
            matches = search.found.len(),
            "subgraph search finished"
        );
        Ok(search.found)
    }

    /// The first match in deterministic order, if any.
    pub fn find_first(&self) -> Result<Option<Mapping>, GraftError> {
        let limits = SearchLimits {
            max_matches: Some(1),
            ..self.limits
        };
        Ok(self.with_limits(limits).find_all()?.into_iter().next())
    }

    /// Order pattern vertices for placement. `None` when some pattern vertex
    /// has no label-compatible host vertex.
    fn plan(&self) -> Option<Vec<Step<'a>>> {
        let mut by_label: BTreeMap<&Label, Vec<&'a VertexId>> = BTreeMap::new();
        for vertex in self.host.vertices() {
            by_label.entry(vertex.label()).or_default().push(vertex.id());
        }

        let mut candidates: BTreeMap<&'a VertexId, Vec<&'a VertexId>> = BTreeMap::new();
        for vertex in self.pattern.vertices() {
            let hosts = by_label.get(vertex.label())?.clone();
            candidates.insert(vertex.id(), hosts);
        }

        let mut placed: Vec<&'a VertexId> = Vec::with_capacity(candidates.len());
        let mut plan = Vec::with_capacity(candidates.len());

        while !candidates.is_empty() {
            let next = candidates
                .iter()
                .min_by_key(|(id, hosts)| {
                    let links = placed
                        .iter()
                        .filter(|q| self.pattern.has_edge(id, q) || self.pattern.has_edge(q, id))
                        .count();
                    (Reverse(links), hosts.len(), *id)
                })
                .map(|(id, _)| *id)?;
            let hosts = candidates.remove(next)?;

            let mut constraints = Vec::new();
            for (earlier, q) in placed.iter().enumerate() {
                if self.pattern.has_edge(next, q) {
                    constraints.push(Constraint {
                        earlier,
                        outgoing: true,
                    });
                }
                if self.pattern.has_edge(q, next) {
                    constraints.push(Constraint {
                        earlier,
                        outgoing: false,
                    });
                }
            }

            plan.push(Step {
                pattern: next,
                candidates: hosts,
                constraints,
                self_loop: self.pattern.has_edge(next, next),
            });
            placed.push(next);
        }

        Some(plan)
    }
}

/// Mutable state of one depth-first search.
struct Search<'s, 'a> {
    host: &'a Graph,
    plan: &'s [Step<'a>],
    limits: SearchLimits,
    images: Vec<&'a VertexId>,
    used: BTreeSet<&'a VertexId>,
    steps: u64,
    found: Vec<Mapping>,
}

impl<'a> Search<'_, 'a> {
    /// Extend the partial embedding at `depth`. Returns `Ok(true)` once the
    /// match quota is reached.
    fn extend(&mut self, depth: usize) -> Result<bool, GraftError> {
        let plan = self.plan;
        let Some(step) = plan.get(depth) else {
            self.found.push(self.current_mapping());
            return Ok(self
                .limits
                .max_matches
                .is_some_and(|quota| self.found.len() >= quota));
        };

        for &candidate in &step.candidates {
            self.steps = self.steps.saturating_add(1);
            if self.limits.step_limit.is_some_and(|limit| self.steps > limit) {
                return Err(GraftError::SearchBudgetExhausted { steps: self.steps });
            }
            if self.used.contains(candidate) || !self.admits(step, candidate) {
                continue;
            }

            self.images.push(candidate);
            self.used.insert(candidate);
            let done = self.extend(depth + 1)?;
            self.used.remove(candidate);
            self.images.pop();

            if done {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Edge checks against the vertices already placed.
    fn admits(&self, step: &Step<'a>, candidate: &VertexId) -> bool {
        if step.self_loop && !self.host.has_edge(candidate, candidate) {
            return false;
        }
        step.constraints.iter().all(|c| {
            let other = self.images[c.earlier];
            if c.outgoing {
                self.host.has_edge(candidate, other)
            } else {
                self.host.has_edge(other, candidate)
            }
        })
    }

    fn current_mapping(&self) -> Mapping {
        self.plan
            .iter()
            .zip(&self.images)
            .map(|(step, host)| (step.pattern.clone(), (*host).clone()))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
