//! Candidate obstacle lookup.
//!
//! The host document owns the real spatial index; the engine only
//! needs to pull candidates overlapping a query volume, with the right
//! to stop pulling early.

use std::sync::Arc;

use sightline_mesh::{Aabb3, ObstacleModel, SegmentVolume};

/// A spatial index over obstacle-capable objects.
///
/// Implementations call `visit` for each candidate whose bounds may
/// overlap `volume`, in any order, and must stop as soon as `visit`
/// returns `false`. Candidates may be large; the engine relies on
/// these short-circuit semantics.
pub trait ObstacleIndex {
    /// Visit candidates overlapping `volume` until exhausted or `visit`
    /// returns `false`.
    fn for_each_candidate(
        &self,
        volume: &SegmentVolume,
        visit: &mut dyn FnMut(&Arc<ObstacleModel>) -> bool,
    );

    /// True when the index holds no candidates at all (e.g. no
    /// obstacle layer matched the host's filter). Used only for
    /// advisory records; indexes that cannot cheaply tell may keep the
    /// default.
    fn is_empty(&self) -> bool {
        false
    }
}

/// Linear-scan index with AABB pre-filtering.
///
/// Adequate for small documents and tests; hosts with many objects
/// should supply their own [`ObstacleIndex`].
#[derive(Debug, Default)]
pub struct BruteForceIndex {
    entries: Vec<(Arc<ObstacleModel>, Aabb3)>,
}

impl BruteForceIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model, caching its world bounds.
    pub fn push(&mut self, model: Arc<ObstacleModel>) {
        let bounds = model.bounds_world();
        self.entries.push((model, bounds));
    }

    /// Number of indexed models.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no models are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ObstacleIndex for BruteForceIndex {
    fn for_each_candidate(
        &self,
        volume: &SegmentVolume,
        visit: &mut dyn FnMut(&Arc<ObstacleModel>) -> bool,
    ) {
        for (model, bounds) in &self.entries {
            if bounds.is_empty() || !volume.intersects_box(bounds) {
                continue;
            }
            if !visit(model) {
                return;
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
