//! Violation ranges and the open/close accumulator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sightline_mesh::ObstacleModel;

use crate::keyframe::{push_keyframe, Keyframe};

/// A contiguous station interval on one alignment where the visibility
/// predicate was false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRange {
    /// Owning alignment's display name.
    pub alignment: String,
    /// First violating station.
    pub start: f64,
    /// Last violating station (or the path end if it ended while open).
    pub end: f64,
    /// Compressed keyframe sequence for playback.
    pub keyframes: Vec<Keyframe>,
    /// Names of the obstacle models observed to block within the range.
    pub obstacle_names: Vec<String>,
    /// The blocking models themselves. Not serialized; hosts resolving
    /// a persisted range go through [`ViolationRange::obstacle_names`].
    #[serde(skip)]
    pub obstacles: Vec<Arc<ObstacleModel>>,
}

/// Folds per-station violation verdicts into emitted ranges.
///
/// State machine per range: closed, opens on the first violating
/// station, extends while stations keep violating (appending or
/// merging a keyframe each time), and closes on the first clear
/// station. A path that ends while a range is open still emits that
/// range, closed at the path end.
#[derive(Debug)]
pub struct RangeBuilder {
    alignment: String,
    open: Option<ViolationRange>,
    emitted: Vec<ViolationRange>,
}

impl RangeBuilder {
    /// Start accumulating for one alignment.
    pub fn new(alignment: impl Into<String>) -> Self {
        Self {
            alignment: alignment.into(),
            open: None,
            emitted: Vec::new(),
        }
    }

    /// Record a violating station.
    ///
    /// `target` is the target station at first obstruction (or the
    /// object's station for object scans). `blockers` is empty for
    /// stations violating only through a view gate.
    pub fn observe_violation(&mut self, station: f64, target: f64, blockers: &[Arc<ObstacleModel>]) {
        let range = self.open.get_or_insert_with(|| ViolationRange {
            alignment: self.alignment.clone(),
            start: station,
            end: station,
            keyframes: Vec::new(),
            obstacle_names: Vec::new(),
            obstacles: Vec::new(),
        });
        range.end = station;
        push_keyframe(&mut range.keyframes, station, target);
        for blocker in blockers {
            if !range.obstacles.iter().any(|m| Arc::ptr_eq(m, blocker)) {
                range.obstacle_names.push(blocker.name.clone());
                range.obstacles.push(blocker.clone());
            }
        }
    }

    /// Record a clear station, closing and emitting any open range.
    pub fn observe_clear(&mut self) {
        if let Some(range) = self.open.take() {
            self.emitted.push(range);
        }
    }

    /// Finish the path: a still-open range closes at `end_station`
    /// (the path end). Returns all emitted ranges, ordered by
    /// ascending start station.
    pub fn finish(mut self, end_station: f64) -> Vec<ViolationRange> {
        if let Some(mut range) = self.open.take() {
            range.end = end_station;
            self.emitted.push(range);
        }
        self.emitted
    }
}
