//! # Derivation
//!
//! Repeated application of productions, driven by a caller-supplied
//! [`Strategy`].
//!
//! The engine itself has no opinion on which occurrence to rewrite or when to
//! stop. A strategy answers both questions; the loop in [`Derivation::run`]
//! only matches, asks, and applies.

use crate::config::{DerivationConfig, GeneratorConfig, SelectionPolicy};
use crate::generator::{Generator, Occurrence, RewriteSummary};
use crate::graph::Graph;
use crate::production::Production;
use crate::GraftError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// STRATEGY TRAIT
// =============================================================================

/// Selection and termination policy for a derivation.
pub trait Strategy {
    /// Pick one of the current occurrences by index, or `None` to stop.
    ///
    /// Only called with a non-empty slice.
    fn choose(&mut self, occurrences: &[Occurrence<'_>]) -> Option<usize>;

    /// Whether to attempt step number `step` (counted from zero) on `graph`.
    fn should_continue(&mut self, step: usize, graph: &Graph) -> bool;
}

/// Always rewrites the first occurrence in match order.
#[derive(Debug, Clone, Copy)]
pub struct FirstMatch {
    pub max_steps: usize,
}

impl Strategy for FirstMatch {
    fn choose(&mut self, _occurrences: &[Occurrence<'_>]) -> Option<usize> {
        Some(0)
    }

    fn should_continue(&mut self, step: usize, _graph: &Graph) -> bool {
        step < self.max_steps
    }
}

/// Always rewrites the last occurrence in match order.
#[derive(Debug, Clone, Copy)]
pub struct LastMatch {
    pub max_steps: usize,
}

impl Strategy for LastMatch {
    fn choose(&mut self, occurrences: &[Occurrence<'_>]) -> Option<usize> {
        occurrences.len().checked_sub(1)
    }

    fn should_continue(&mut self, step: usize, _graph: &Graph) -> bool {
        step < self.max_steps
    }
}

/// Rewrites a uniformly random occurrence. Reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
    max_steps: usize,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64, max_steps: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_steps,
        }
    }
}

impl Strategy for SeededRandom {
    fn choose(&mut self, occurrences: &[Occurrence<'_>]) -> Option<usize> {
        if occurrences.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..occurrences.len()))
    }

    fn should_continue(&mut self, step: usize, _graph: &Graph) -> bool {
        step < self.max_steps
    }
}

/// Build the bundled strategy described by `config`.
#[must_use]
pub fn strategy_from_config(config: &DerivationConfig) -> Box<dyn Strategy> {
    match config.selection {
        SelectionPolicy::First => Box::new(FirstMatch {
            max_steps: config.max_steps,
        }),
        SelectionPolicy::Last => Box::new(LastMatch {
            max_steps: config.max_steps,
        }),
        SelectionPolicy::Random => Box::new(SeededRandom::new(config.seed, config.max_steps)),
    }
}

// =============================================================================
// DERIVATION LOOP
// =============================================================================

/// Why a derivation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The strategy declined to attempt another step.
    Halted,
    /// No production matched the current graph.
    Exhausted,
    /// The strategy was offered occurrences and chose none.
    Declined,
}

/// One rewrite performed during a derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedStep {
    pub production_index: usize,
    pub production_name: Option<String>,
    pub summary: RewriteSummary,
}

/// Outcome of a derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationReport {
    pub steps: Vec<AppliedStep>,
    pub stop: StopReason,
}

/// Match-choose-apply loop over a borrowed generator.
#[derive(Debug, Clone, Copy)]
pub struct Derivation<'g> {
    generator: &'g Generator,
}

impl<'g> Derivation<'g> {
    #[must_use]
    pub fn new(generator: &'g Generator) -> Self {
        Self { generator }
    }

    /// Rewrite `graph` until the strategy halts or declines, or nothing
    /// matches. Errors from matching or rewriting abort the derivation;
    /// steps already applied stay applied.
    pub fn run(
        &self,
        graph: &mut Graph,
        productions: &[Production],
        strategy: &mut dyn Strategy,
    ) -> Result<DerivationReport, GraftError> {
        let mut steps = Vec::new();

        let stop = loop {
            if !strategy.should_continue(steps.len(), graph) {
                break StopReason::Halted;
            }

            let occurrences = self.generator.find_matching_productions(graph, productions)?;
            if occurrences.is_empty() {
                break StopReason::Exhausted;
            }

            let chosen = strategy
                .choose(&occurrences)
                .and_then(|index| occurrences.get(index));
            let Some(occurrence) = chosen else {
                break StopReason::Declined;
            };

            let summary = self.generator.apply_production(
                graph,
                occurrence.production,
                &occurrence.mapping,
            )?;
            steps.push(AppliedStep {
                production_index: occurrence.production_index,
                production_name: occurrence.production.name().map(str::to_string),
                summary,
            });
        };

        tracing::debug!(
            steps = steps.len(),
            stop = ?stop,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "derivation finished"
        );
        Ok(DerivationReport { steps, stop })
    }
}

/// Rewrite `graph` with `productions` as configured: search settings from
/// `config.search`, the bundled strategy from `config.derivation`.
pub fn apply_productions(
    graph: &mut Graph,
    productions: &[Production],
    config: &GeneratorConfig,
) -> Result<DerivationReport, GraftError> {
    config.validate()?;
    let generator = Generator::with_config(config.search.clone());
    let mut strategy = strategy_from_config(&config.derivation);
    Derivation::new(&generator).run(graph, productions, strategy.as_mut())
}

// =============================================================================
// TESTS
// =============================================================================
