#![warn(missing_docs)]

//! Station-sweep visibility scan engine for road-like alignments.
//!
//! Detects stretches of an alignment where a moving observer cannot
//! see either a target moving ahead along the same alignment or a
//! fixed object, because a 3D obstacle blocks the view. Per-station
//! verdicts are folded into contiguous violation ranges carrying a
//! compressed keyframe sequence for later playback.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sightline_scan::{
//!     scan_intervisibility, Alignment, BruteForceIndex, LinearAlignment, NullMonitor,
//!     ScanSettings,
//! };
//!
//! let road: Arc<dyn Alignment> = Arc::new(LinearAlignment::new("road", a, b));
//! let mut index = BruteForceIndex::new();
//! index.push(building);
//!
//! let outcome = scan_intervisibility(
//!     &[road],
//!     &index,
//!     &ScanSettings::default(),
//!     &mut NullMonitor,
//! )?;
//! for range in &outcome.ranges {
//!     println!("blocked from {} to {}", range.start, range.end);
//! }
//! ```

pub mod alignment;
pub mod cache;
pub mod error;
pub mod index;
pub mod keyframe;
pub mod monitor;
pub mod range;
pub mod sweep;

pub use alignment::{
    format_chainage, Alignment, AlignmentHandle, DirectedAlignment, LinearAlignment,
    ScanDirection,
};
pub use cache::InverseCache;
pub use error::{Result, ScanError};
pub use index::{BruteForceIndex, ObstacleIndex};
pub use keyframe::{keyframe_at, push_keyframe, Keyframe};
pub use monitor::{NullMonitor, Pacer, ScanMonitor};
pub use range::{RangeBuilder, ViolationRange};
pub use sweep::{
    scan_intervisibility, scan_object_visibility, Advisory, ScanOutcome, ScanStats, Severity,
};

use serde::{Deserialize, Serialize};

/// Which side of the alignment an object must lie on to be considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SideRestriction {
    /// Objects on either side are considered.
    #[default]
    Both,
    /// Only objects left of the direction of travel (negative offset).
    Left,
    /// Only objects right of the direction of travel (positive offset).
    Right,
}

impl SideRestriction {
    /// True if an object at this lateral offset passes the restriction.
    /// An object on the centerline passes either side.
    pub fn allows(&self, offset: f64) -> bool {
        match self {
            SideRestriction::Both => true,
            SideRestriction::Left => offset <= 0.0,
            SideRestriction::Right => offset >= 0.0,
        }
    }
}

/// Scan parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Station step between observer samples.
    pub observer_step: f64,
    /// Station step between target samples ahead of the observer.
    pub target_step: f64,
    /// Maximum sight distance: along the alignment for the
    /// intervisibility scan, straight-line for the object scan.
    pub max_view_distance: f64,
    /// Observer eye height above the centerline elevation.
    pub observer_height: f64,
    /// Target marker height above the centerline elevation
    /// (intervisibility scan only; objects are sighted at their
    /// centroid).
    pub target_height: f64,
    /// Direction the sweep walks each alignment.
    pub direction: ScanDirection,
    /// Side restriction applied to objects (object scan only).
    pub side: SideRestriction,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            observer_step: 10.0,
            target_step: 10.0,
            max_view_distance: 300.0,
            observer_height: 1.05,
            target_height: 0.60,
            direction: ScanDirection::Forward,
            side: SideRestriction::Both,
        }
    }
}

impl ScanSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.observer_step <= 0.0 {
            return Err(ScanError::InvalidSettings(
                "observer_step must be positive".into(),
            ));
        }
        if self.target_step <= 0.0 {
            return Err(ScanError::InvalidSettings(
                "target_step must be positive".into(),
            ));
        }
        if self.max_view_distance <= 0.0 {
            return Err(ScanError::InvalidSettings(
                "max_view_distance must be positive".into(),
            ));
        }
        if self.observer_height < 0.0 || self.target_height < 0.0 {
            return Err(ScanError::InvalidSettings(
                "heights must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
