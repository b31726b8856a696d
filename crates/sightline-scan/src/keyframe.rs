//! Compressed keyframe sequences for violation playback.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sightline_math::search::{decode_insertion, search_by};
use sightline_math::KEYFRAME_MERGE_EPS;

/// One compressed sample of how the blocked target moved relative to
/// the observer across part of a violation range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// First observer station covered by this frame.
    pub observer_start: f64,
    /// Last observer station covered by this frame.
    pub observer_end: f64,
    /// Target station at first obstruction, common to the covered span.
    pub target: f64,
}

/// Append an `(observer, target)` sample, merging into the last frame
/// when the target station has not moved beyond the merge tolerance.
///
/// Keyframe count therefore scales with the rate of change of the
/// target position, not with the number of sampled stations.
pub fn push_keyframe(frames: &mut Vec<Keyframe>, observer: f64, target: f64) {
    if let Some(last) = frames.last_mut() {
        if (target - last.target).abs() < KEYFRAME_MERGE_EPS {
            last.observer_end = observer;
            return;
        }
    }
    frames.push(Keyframe {
        observer_start: observer,
        observer_end: observer,
        target,
    });
}

/// The frame active at normalized playback time `t` in `[0, 1]`.
///
/// `t` maps linearly onto the total observer-station span of the
/// sequence; the active frame is the last one starting at or before
/// the mapped station, located by ordered search rather than a linear
/// scan.
pub fn keyframe_at(frames: &[Keyframe], t: f64) -> Option<&Keyframe> {
    let first = frames.first()?;
    let last = frames.last()?;
    let station = first.observer_start
        + t.clamp(0.0, 1.0) * (last.observer_end - first.observer_start);

    let found = search_by(frames, |frame| {
        frame
            .observer_start
            .partial_cmp(&station)
            .unwrap_or(Ordering::Equal)
    });
    let idx = if found >= 0 {
        found as usize
    } else {
        decode_insertion(found).saturating_sub(1)
    };
    frames.get(idx)
}
