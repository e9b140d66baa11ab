//! # Mapping
//!
//! Correspondence from pattern vertex identifiers to host vertex identifiers.
//!
//! Nothing in the type enforces injectivity; [`Mapping::find_collision`] is
//! the explicit check used before a mapping is allowed to drive a rewrite.

use crate::VertexId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// An ordered partial function pattern-id -> host-id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<VertexId, VertexId>);

impl Mapping {
    /// Create a new empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Image of a pattern vertex, if mapped.
    #[must_use]
    pub fn get(&self, pattern: &VertexId) -> Option<&VertexId> {
        self.0.get(pattern)
    }

    /// Map `pattern` to `host`, returning the previous image if any.
    pub fn insert(&mut self, pattern: VertexId, host: VertexId) -> Option<VertexId> {
        self.0.insert(pattern, host)
    }

    /// Drop the image of a pattern vertex.
    pub fn remove(&mut self, pattern: &VertexId) -> Option<VertexId> {
        self.0.remove(pattern)
    }

    #[must_use]
    pub fn contains(&self, pattern: &VertexId) -> bool {
        self.0.contains_key(pattern)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs in pattern-identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&VertexId, &VertexId)> {
        self.0.iter()
    }

    /// Host identifiers in the image of the mapping.
    pub fn images(&self) -> impl Iterator<Item = &VertexId> {
        self.0.values()
    }

    /// Images of both endpoints of a pattern edge, when both are mapped.
    #[must_use]
    pub fn edge_image(&self, from: &VertexId, to: &VertexId) -> Option<(&VertexId, &VertexId)> {
        Some((self.0.get(from)?, self.0.get(to)?))
    }

    /// First pair of pattern vertices sharing an image, as
    /// `(host, first, second)`. `None` means the mapping is injective.
    #[must_use]
    pub fn find_collision(&self) -> Option<(VertexId, VertexId, VertexId)> {
        let mut preimage: BTreeMap<&VertexId, &VertexId> = BTreeMap::new();
        for (pattern, host) in &self.0 {
            match preimage.entry(host) {
                Entry::Occupied(seen) => {
                    return Some((host.clone(), (*seen.get()).clone(), pattern.clone()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(pattern);
                }
            }
        }
        None
    }

    #[must_use]
    pub fn is_injective(&self) -> bool {
        self.find_collision().is_none()
    }
}

impl<P: Into<VertexId>, H: Into<VertexId>> FromIterator<(P, H)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (P, H)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(p, h)| (p.into(), h.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Mapping {
    type Item = (&'a VertexId, &'a VertexId);
    type IntoIter = std::collections::btree_map::Iter<'a, VertexId, VertexId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// TESTS
// =============================================================================
