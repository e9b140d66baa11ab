//! # graft-core
//!
//! The deterministic graph rewriting engine.
//!
//! A [`Production`] pairs a left-hand-side pattern with a right-hand-side
//! pattern. The [`Generator`] finds every occurrence of a production's LHS in
//! a host [`Graph`] and rewrites one occurrence in place:
//!
//! 1. map RHS identifiers shared with the LHS onto the matched host vertices
//! 2. delete host edges the RHS no longer has
//! 3. delete host vertices whose role exists only in the LHS
//! 4. add host vertices for RHS-only roles, under fresh identifiers
//! 5. add host edges the RHS introduces
//!
//! Which occurrence to rewrite and when to stop belong to a caller-supplied
//! [`Strategy`]; [`Derivation`] runs the loop.
//!
//! ## Architectural Constraints
//!
//! - No async, no I/O: matching and rewriting are pure in-memory computations
//! - Deterministic: `BTreeMap`/`BTreeSet` everywhere, randomness only seeded
//! - Validate-then-commit: a rejected mapping never mutates the host graph
//! - Mutation takes `&mut Graph`, so one rewrite at a time per graph

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod derivation;
pub mod generator;
pub mod graph;
pub mod mapping;
pub mod matcher;
pub mod production;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{GraftError, Label, MappingViolation, PatternSide, Vertex, VertexId};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use config::{
    DerivationConfig, GeneratorConfig, Grammar, PatternDef, ProductionDef, SearchConfig,
    SelectionPolicy,
};
pub use derivation::{
    AppliedStep, Derivation, DerivationReport, FirstMatch, LastMatch, SeededRandom, StopReason,
    Strategy, apply_productions, strategy_from_config,
};
pub use generator::{Generator, Occurrence, RewriteSummary};
pub use graph::Graph;
pub use mapping::Mapping;
pub use matcher::{Matcher, SearchLimits};
pub use production::Production;
