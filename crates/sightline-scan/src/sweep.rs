//! The two station-sweep visibility algorithms.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sightline_math::Point3;
use sightline_mesh::{model_blocks_segment, ObstacleModel, SegmentVolume};

use crate::alignment::{Alignment, AlignmentHandle, DirectedAlignment};
use crate::cache::InverseCache;
use crate::error::Result;
use crate::index::ObstacleIndex;
use crate::monitor::{Pacer, ScanMonitor};
use crate::range::{RangeBuilder, ViolationRange};
use crate::ScanSettings;

/// Tolerance for station-step boundary comparisons.
const STEP_FUZZ: f64 = 1e-9;

/// Severity of an advisory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Informational.
    Info,
    /// Missing collaborator data; the scan continued without it.
    Warning,
}

/// A non-violation diagnostic record produced during a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    /// Record severity.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Affected alignment, when the record concerns one.
    pub alignment: Option<String>,
}

impl Advisory {
    fn warning(message: impl Into<String>, alignment: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            alignment,
        }
    }
}

/// Counters accumulated across one scan.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Observer stations evaluated.
    pub stations_visited: u64,
    /// Spatial index queries issued.
    pub obstacle_queries: u64,
}

/// Everything a completed scan produced.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Violation ranges, grouped by alignment in input order and
    /// sorted by ascending start station within each alignment.
    pub ranges: Vec<ViolationRange>,
    /// Advisory records for missing or unusable collaborator data.
    pub advisories: Vec<Advisory>,
    /// Work counters.
    pub stats: ScanStats,
}

/// Scan each alignment for stretches where a moving observer cannot
/// see a target moving ahead along the same alignment.
///
/// For every observer station the target walks forward until it leaves
/// the maximum view distance (measured along the alignment). The
/// observer station is a violation only when some obstacle blocks the
/// sight segment before that cutoff; running out of view distance
/// without a hit leaves the station clear.
pub fn scan_intervisibility(
    alignments: &[Arc<dyn Alignment>],
    index: &dyn ObstacleIndex,
    settings: &ScanSettings,
    monitor: &mut dyn ScanMonitor,
) -> Result<ScanOutcome> {
    settings.validate()?;
    let mut outcome = ScanOutcome::default();
    let mut cache = InverseCache::new();
    let mut pacer = Pacer::new();

    check_inputs(alignments, index, &mut outcome);

    for (i, alignment) in alignments.iter().enumerate() {
        let path = DirectedAlignment::new(AlignmentHandle::new(alignment), settings.direction);
        let length = path.length();
        if length <= 0.0 {
            outcome.advisories.push(Advisory::warning(
                "alignment has no length",
                Some(path.name().to_string()),
            ));
            continue;
        }

        let mut builder = RangeBuilder::new(path.name());
        pacer.force(
            monitor,
            i as f64 / alignments.len() as f64,
            &path.chainage_label(0.0),
        )?;

        let mut station = 0.0;
        while station <= length + STEP_FUZZ {
            let fraction = (i as f64 + station / length) / alignments.len() as f64;
            pacer.tick(monitor, fraction, &path.chainage_label(station))?;
            outcome.stats.stations_visited += 1;

            match first_obstruction(&path, station, index, settings, &mut cache, &mut outcome.stats)
            {
                Some((target, blockers)) => builder.observe_violation(station, target, &blockers),
                None => builder.observe_clear(),
            }
            station += settings.observer_step;
        }
        outcome.ranges.extend(builder.finish(length));
    }

    Ok(outcome)
}

/// Walk the target forward from `observer + target_step`, returning
/// the first target station whose sight segment is blocked, with every
/// model reported blocking there.
fn first_obstruction(
    path: &DirectedAlignment,
    observer: f64,
    index: &dyn ObstacleIndex,
    settings: &ScanSettings,
    cache: &mut InverseCache,
    stats: &mut ScanStats,
) -> Option<(f64, Vec<Arc<ObstacleModel>>)> {
    let length = path.length();
    let eye = probe_point(path, observer, settings.observer_height);

    let mut target = observer + settings.target_step;
    while target <= length + STEP_FUZZ
        && target - observer <= settings.max_view_distance + STEP_FUZZ
    {
        let mark = probe_point(path, target, settings.target_height);
        let blockers = blocking_models(index, cache, stats, &eye, &mark);
        if !blockers.is_empty() {
            return Some((target, blockers));
        }
        target += settings.target_step;
    }
    None
}

/// Scan each alignment for stretches where a moving observer cannot
/// see a fixed object.
///
/// Each object is reduced to its world centroid (objects without mesh
/// geometry are skipped with a warning). A station is out of view when
/// the object is farther than the view distance, more than 90 degrees
/// off the travel direction, or already behind the observer; otherwise
/// the sight segment to the centroid is tested for obstruction. Both
/// kinds of failure accumulate into ranges, but only genuine
/// obstruction hits contribute obstacle models.
pub fn scan_object_visibility(
    alignments: &[Arc<dyn Alignment>],
    objects: &[Arc<ObstacleModel>],
    index: &dyn ObstacleIndex,
    settings: &ScanSettings,
    monitor: &mut dyn ScanMonitor,
) -> Result<ScanOutcome> {
    settings.validate()?;
    let mut outcome = ScanOutcome::default();
    let mut cache = InverseCache::new();
    let mut pacer = Pacer::new();

    check_inputs(alignments, index, &mut outcome);
    if objects.is_empty() {
        outcome
            .advisories
            .push(Advisory::warning("no objects to test visibility against", None));
    }

    let total = (alignments.len() * objects.len()).max(1) as f64;
    let mut done = 0usize;

    for object in objects {
        let Some(centroid) = object.world_centroid() else {
            outcome.advisories.push(Advisory::warning(
                format!("object '{}' has no mesh geometry", object.name),
                None,
            ));
            done += alignments.len();
            continue;
        };

        for alignment in alignments {
            let path = DirectedAlignment::new(AlignmentHandle::new(alignment), settings.direction);
            let length = path.length();
            if length <= 0.0 {
                done += 1;
                continue;
            }

            let (object_station, object_offset) = path.from_world(&centroid);
            if !settings.side.allows(object_offset) {
                done += 1;
                continue;
            }

            let mut builder = RangeBuilder::new(path.name());
            pacer.force(monitor, done as f64 / total, &path.chainage_label(0.0))?;

            let mut station = 0.0;
            while station <= length + STEP_FUZZ {
                let fraction = (done as f64 + station / length) / total;
                pacer.tick(monitor, fraction, &path.chainage_label(station))?;
                outcome.stats.stations_visited += 1;

                let eye = probe_point(&path, station, settings.observer_height);
                let line = centroid - eye;
                let out_of_view = line.norm() > settings.max_view_distance
                    || path.tangent_at(station).dot(&line) < 0.0
                    || object_station < station;

                if out_of_view {
                    builder.observe_violation(station, object_station, &[]);
                } else {
                    let blockers =
                        blocking_models(index, &mut cache, &mut outcome.stats, &eye, &centroid);
                    if blockers.is_empty() {
                        builder.observe_clear();
                    } else {
                        builder.observe_violation(station, object_station, &blockers);
                    }
                }
                station += settings.observer_step;
            }
            outcome.ranges.extend(builder.finish(length));
            done += 1;
        }
    }

    Ok(outcome)
}

/// Shared missing-data advisories.
fn check_inputs(
    alignments: &[Arc<dyn Alignment>],
    index: &dyn ObstacleIndex,
    outcome: &mut ScanOutcome,
) {
    if alignments.is_empty() {
        outcome
            .advisories
            .push(Advisory::warning("no alignments to scan", None));
    }
    if index.is_empty() {
        outcome
            .advisories
            .push(Advisory::warning("no obstacle candidates in the index", None));
    }
}

/// Sight-line endpoint at a station: centerline position with the
/// elevation query plus a height above it.
fn probe_point(path: &DirectedAlignment, station: f64, height: f64) -> Point3 {
    let mut point = path.to_world(station, 0.0);
    point.z = path.elevation_at(station) + height;
    point
}

/// All models confirmed to block the segment `[a, b]`.
///
/// Every candidate overlapping the query volume is tested so the
/// violation record can name the full blocking set at this station;
/// short-circuiting happens inside the per-model triangle walk.
fn blocking_models(
    index: &dyn ObstacleIndex,
    cache: &mut InverseCache,
    stats: &mut ScanStats,
    a: &Point3,
    b: &Point3,
) -> Vec<Arc<ObstacleModel>> {
    let volume = SegmentVolume::new(*a, *b);
    stats.obstacle_queries += 1;
    let mut hits = Vec::new();
    index.for_each_candidate(&volume, &mut |model| {
        let inverse = cache.inverse_of(model);
        if model_blocks_segment(model, &inverse, a, b) {
            hits.push(model.clone());
        }
        true
    });
    hits
}
