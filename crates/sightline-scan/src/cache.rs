//! Per-scan cache of model inverse transforms.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use sightline_math::Transform;
use sightline_mesh::ObstacleModel;

/// Caches the inverse of each obstacle model's transform for the
/// duration of one scan.
///
/// Entries are keyed by model identity and hold only a [`Weak`]
/// association, so a long scan never keeps a model alive after the
/// host drops it. A missing or stale entry is recomputed, never an
/// error.
#[derive(Debug, Default)]
pub struct InverseCache {
    entries: HashMap<usize, (Weak<ObstacleModel>, Transform)>,
}

impl InverseCache {
    /// Create an empty cache for one scan execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached inverse of `model`'s transform, computing it on miss.
    ///
    /// A non-invertible transform degrades to the identity: the walk
    /// then tests in world space, which can only under-report hits for
    /// a model that is itself degenerate.
    pub fn inverse_of(&mut self, model: &Arc<ObstacleModel>) -> Transform {
        let key = Arc::as_ptr(model) as usize;
        if let Some((weak, inverse)) = self.entries.get(&key) {
            if let Some(live) = weak.upgrade() {
                if Arc::ptr_eq(&live, model) {
                    return inverse.clone();
                }
            }
            // Stale: a dropped model's address was reused.
            self.entries.remove(&key);
        }

        let inverse = model
            .transform()
            .inverse()
            .unwrap_or_else(Transform::identity);
        self.entries
            .insert(key, (Arc::downgrade(model), inverse.clone()));
        self.prune();
        inverse
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|(weak, _)| weak.strong_count() > 0)
            .count()
    }

    /// True if the cache holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.entries.retain(|_, (weak, _)| weak.strong_count() > 0);
    }
}
