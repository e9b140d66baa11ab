//! # Configuration
//!
//! TOML-loadable settings for matching and derivation, and serde definitions
//! of productions so a whole grammar can be declared in one document:
//!
//! ```toml
//! [search]
//! step_limit = 100000
//!
//! [derivation]
//! max_steps = 20
//! selection = "random"
//! seed = 7
//!
//! [[production]]
//! name = "grow"
//! lhs.vertices = [{ id = "a", label = "A" }]
//! rhs.vertices = [{ id = "a", label = "A" }, { id = "b", label = "B" }]
//! rhs.edges = [["a", "b"]]
//! ```

use crate::matcher::SearchLimits;
use crate::production::Production;
use crate::{GraftError, Vertex, VertexId};
use serde::{Deserialize, Serialize};

/// Default iteration cap of the bundled derivation strategies.
pub const DEFAULT_MAX_STEPS: usize = 100;

// =============================================================================
// ENGINE CONFIGURATION
// =============================================================================

/// Matching settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum candidate extensions per pattern search. `None` = unbounded.
    pub step_limit: Option<u64>,
    /// Maximum occurrences collected per production. `None` = all.
    pub max_matches: Option<usize>,
    /// Drop productions whose LHS is empty instead of matching them trivially.
    pub skip_empty_patterns: bool,
}

impl SearchConfig {
    #[must_use]
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            step_limit: self.step_limit,
            max_matches: self.max_matches,
        }
    }
}

/// Which occurrence a bundled strategy picks at each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// First occurrence in match order.
    #[default]
    First,
    /// Last occurrence in match order.
    Last,
    /// Uniformly random occurrence, from a seeded generator.
    Random,
}

/// Derivation loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    pub max_steps: usize,
    pub seed: u64,
    pub selection: SelectionPolicy,
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            seed: 0,
            selection: SelectionPolicy::First,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub search: SearchConfig,
    pub derivation: DerivationConfig,
}

impl GeneratorConfig {
    /// Parse a configuration document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, GraftError> {
        let config: Self = toml::from_str(source).map_err(|e| GraftError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that can never produce a useful search.
    pub fn validate(&self) -> Result<(), GraftError> {
        if self.search.max_matches == Some(0) {
            return Err(GraftError::Config(
                "search.max_matches must be at least 1".to_string(),
            ));
        }
        if self.search.step_limit == Some(0) {
            return Err(GraftError::Config(
                "search.step_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// PRODUCTION DEFINITIONS
// =============================================================================

/// Vertices and edges of one pattern graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternDef {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<(VertexId, VertexId)>,
}

/// Declarative form of a [`Production`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionDef {
    pub name: Option<String>,
    pub lhs: PatternDef,
    pub rhs: PatternDef,
}

impl TryFrom<ProductionDef> for Production {
    type Error = GraftError;

    fn try_from(def: ProductionDef) -> Result<Self, Self::Error> {
        Production::from_parts(
            def.name,
            (def.lhs.vertices, def.lhs.edges),
            (def.rhs.vertices, def.rhs.edges),
        )
    }
}

#[derive(Debug, Deserialize)]
struct GrammarDef {
    #[serde(default)]
    search: SearchConfig,
    #[serde(default)]
    derivation: DerivationConfig,
    #[serde(default, rename = "production")]
    productions: Vec<ProductionDef>,
}

/// A configuration together with the productions it drives.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub config: GeneratorConfig,
    pub productions: Vec<Production>,
}

impl Grammar {
    /// Parse a grammar document: `[search]`, `[derivation]`, and any number
    /// of `[[production]]` tables.
    pub fn from_toml_str(source: &str) -> Result<Self, GraftError> {
        let def: GrammarDef =
            toml::from_str(source).map_err(|e| GraftError::Config(e.to_string()))?;

        let config = GeneratorConfig {
            search: def.search,
            derivation: def.derivation,
        };
        config.validate()?;

        let productions = def
            .productions
            .into_iter()
            .map(Production::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(productions = productions.len(), "loaded grammar");
        Ok(Self {
            config,
            productions,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
