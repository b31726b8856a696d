//! End-to-end scan scenarios over straight alignments with
//! hand-verifiable wall geometry.

use std::sync::Arc;

use approx::assert_relative_eq;
use sightline_math::{Point3, Transform};
use sightline_mesh::{ModelMesh, ObstacleModel, TriangleMesh};
use sightline_scan::{
    keyframe_at, scan_intervisibility, scan_object_visibility, Alignment, BruteForceIndex,
    LinearAlignment, NullMonitor, ScanDirection, ScanError, ScanMonitor, ScanSettings, Severity,
    SideRestriction,
};

fn straight_road() -> Arc<dyn Alignment> {
    Arc::new(LinearAlignment::new(
        "road",
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1000.0, 0.0, 0.0),
    ))
}

fn settings() -> ScanSettings {
    ScanSettings {
        observer_step: 10.0,
        target_step: 10.0,
        max_view_distance: 300.0,
        observer_height: 2.0,
        target_height: 0.0,
        direction: ScanDirection::Forward,
        side: SideRestriction::Both,
    }
}

/// A single triangle in the YZ plane at `x`, facing +X, reaching from
/// below grade up to `z_top` at its apex.
fn wall(name: &str, x: f64, half_width: f64, z_top: f64) -> Arc<ObstacleModel> {
    let mesh = TriangleMesh::from_triangles(
        &[
            Point3::new(0.0, -half_width, -1.0),
            Point3::new(0.0, half_width, -1.0),
            Point3::new(0.0, 0.0, z_top),
        ],
        &[0, 1, 2],
    );
    Arc::new(ObstacleModel::new(
        name,
        vec![ModelMesh::new(mesh)],
        Transform::translation(x, 0.0, 0.0),
    ))
}

/// Eye height 4.0 looking down at grade-level targets: the sight line
/// from observer `s` to the target at station `t` crosses the wall
/// plane at x = 495 at height `4 (t - 495) / (t - s)`, minimized at
/// the first target past the wall (t = 500). With the wall apex at
/// z = 0.21 that crossing clears the wall for observers past station
/// ~405, and the wall is out of view range before station 200, so the
/// blocked window is stations 200..400 inclusive.
#[test]
fn intervisibility_blocked_window() {
    let road = straight_road();
    let mut index = BruteForceIndex::new();
    let wall = wall("wall", 495.0, 50.0, 0.21);
    index.push(wall.clone());

    let mut settings = settings();
    settings.observer_height = 4.0;
    let outcome =
        scan_intervisibility(&[road], &index, &settings, &mut NullMonitor).unwrap();

    assert_eq!(outcome.ranges.len(), 1, "ranges: {:?}", outcome.ranges);
    let range = &outcome.ranges[0];
    assert_eq!(range.alignment, "road");
    assert_relative_eq!(range.start, 200.0, epsilon = 1e-9);
    assert_relative_eq!(range.end, 400.0, epsilon = 1e-9);
    assert_eq!(range.obstacle_names, vec!["wall"]);
    assert_eq!(range.obstacles.len(), 1);
    assert!(Arc::ptr_eq(&range.obstacles[0], &wall));

    // The blocking target never moves: the whole range compresses to a
    // single keyframe at target station 500.
    assert_eq!(range.keyframes.len(), 1);
    assert_relative_eq!(range.keyframes[0].target, 500.0, epsilon = 1e-9);
    assert_relative_eq!(range.keyframes[0].observer_start, 200.0, epsilon = 1e-9);
    assert_relative_eq!(range.keyframes[0].observer_end, 400.0, epsilon = 1e-9);

    // Playback anywhere inside the range resolves to that frame.
    assert_relative_eq!(
        keyframe_at(&range.keyframes, 0.5).unwrap().target,
        500.0,
        epsilon = 1e-9
    );

    assert_eq!(outcome.stats.stations_visited, 101);
    assert!(outcome.advisories.is_empty());
}

/// Scanning backward the sight lines run -X into the wall's back face;
/// the one-sided triangle test never reports it as blocking.
#[test]
fn intervisibility_ignores_backfaces() {
    let road = straight_road();
    let mut index = BruteForceIndex::new();
    index.push(wall("wall", 495.0, 50.0, 0.21));

    let mut settings = settings();
    settings.observer_height = 4.0;
    settings.direction = ScanDirection::Backward;
    let outcome =
        scan_intervisibility(&[road], &index, &settings, &mut NullMonitor).unwrap();
    assert!(outcome.ranges.is_empty());
}

#[test]
fn empty_index_warns_and_finds_nothing() {
    let road = straight_road();
    let index = BruteForceIndex::new();
    let outcome =
        scan_intervisibility(&[road], &index, &settings(), &mut NullMonitor).unwrap();

    assert!(outcome.ranges.is_empty());
    let warnings: Vec<_> = outcome
        .advisories
        .iter()
        .filter(|a| a.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("no obstacle candidates"));
}

#[test]
fn no_alignments_warns() {
    let mut index = BruteForceIndex::new();
    index.push(wall("wall", 495.0, 50.0, 0.21));
    let outcome =
        scan_intervisibility(&[], &index, &settings(), &mut NullMonitor).unwrap();
    assert!(outcome.ranges.is_empty());
    assert!(outcome
        .advisories
        .iter()
        .any(|a| a.severity == Severity::Warning && a.message.contains("no alignments")));
}

struct CancelImmediately;

impl ScanMonitor for CancelImmediately {
    fn progress(&mut self, _fraction: f64, _chainage: &str) -> bool {
        false
    }
}

#[test]
fn cancellation_aborts_without_output() {
    let road = straight_road();
    let mut index = BruteForceIndex::new();
    index.push(wall("wall", 495.0, 50.0, 0.21));

    let result = scan_intervisibility(&[road], &index, &settings(), &mut CancelImmediately);
    assert!(matches!(result, Err(ScanError::Cancelled)));
}

#[test]
fn invalid_settings_rejected_up_front() {
    let road = straight_road();
    let index = BruteForceIndex::new();
    let mut bad = settings();
    bad.observer_step = -1.0;
    let result = scan_intervisibility(&[road], &index, &bad, &mut NullMonitor);
    assert!(matches!(result, Err(ScanError::InvalidSettings(_))));
}

/// A small marker whose single triangle is centered on the model
/// origin, so the world centroid lands exactly on the translation.
fn marker(name: &str, at: Point3) -> Arc<ObstacleModel> {
    let mesh = TriangleMesh::from_triangles(
        &[
            Point3::new(-1.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, 2.0),
        ],
        &[0, 1, 2],
    );
    Arc::new(ObstacleModel::new(
        name,
        vec![ModelMesh::new(mesh)],
        Transform::translation(at.x, at.y, at.z),
    ))
}

/// Object at station 500, offset +50 (right side). Stations up to 200
/// are out of view by distance; 210..440 are blocked by a tall wall at
/// x = 445; 450..500 see the object; past 500 it is behind the
/// observer. Expect two ranges: [0, 440] carrying the wall, and
/// [510, 1000] closed at the path end with no obstacles.
#[test]
fn object_visibility_gates_and_obstructions() {
    let road = straight_road();
    let object = marker("sign", Point3::new(500.0, -50.0, 0.0));
    let mut index = BruteForceIndex::new();
    let wall = wall("wall", 445.0, 100.0, 200.0);
    index.push(wall.clone());

    let outcome = scan_object_visibility(
        &[road],
        &[object],
        &index,
        &settings(),
        &mut NullMonitor,
    )
    .unwrap();

    assert_eq!(outcome.ranges.len(), 2, "ranges: {:?}", outcome.ranges);

    let first = &outcome.ranges[0];
    assert_relative_eq!(first.start, 0.0, epsilon = 1e-9);
    assert_relative_eq!(first.end, 440.0, epsilon = 1e-9);
    assert_eq!(first.obstacle_names, vec!["wall"]);

    let second = &outcome.ranges[1];
    assert_relative_eq!(second.start, 510.0, epsilon = 1e-9);
    assert_relative_eq!(second.end, 1000.0, epsilon = 1e-9);
    assert!(second.obstacles.is_empty());

    // The object never moves: each range compresses to one keyframe
    // pinned at the object's station.
    for range in &outcome.ranges {
        assert_eq!(range.keyframes.len(), 1);
        assert_relative_eq!(range.keyframes[0].target, 500.0, epsilon = 1e-9);
    }
}

#[test]
fn object_on_wrong_side_is_skipped() {
    let road = straight_road();
    // Offset +50: right of travel. Restricting to the left skips it.
    let object = marker("sign", Point3::new(500.0, -50.0, 0.0));
    let index = BruteForceIndex::new();

    let mut settings = settings();
    settings.side = SideRestriction::Left;
    let outcome = scan_object_visibility(
        &[road],
        &[object],
        &index,
        &settings,
        &mut NullMonitor,
    )
    .unwrap();
    assert!(outcome.ranges.is_empty());
}

#[test]
fn object_without_geometry_warns() {
    let road = straight_road();
    let object = Arc::new(ObstacleModel::new(
        "ghost",
        vec![ModelMesh::new(TriangleMesh::new())],
        Transform::identity(),
    ));
    let index = BruteForceIndex::new();

    let outcome = scan_object_visibility(
        &[road],
        &[object],
        &index,
        &settings(),
        &mut NullMonitor,
    )
    .unwrap();
    assert!(outcome.ranges.is_empty());
    assert!(outcome
        .advisories
        .iter()
        .any(|a| a.severity == Severity::Warning && a.message.contains("ghost")));
}

/// A zero-length alignment cannot be swept: it earns an advisory and
/// the scan continues with the remaining alignments.
#[test]
fn unusable_alignment_is_advised_and_skipped() {
    let road = straight_road();
    let mut index = BruteForceIndex::new();
    index.push(wall("wall", 495.0, 50.0, 0.21));

    let stub: Arc<dyn Alignment> = Arc::new(LinearAlignment::new(
        "stub",
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
    ));
    let outcome =
        scan_intervisibility(&[stub, road], &index, &settings(), &mut NullMonitor).unwrap();

    assert!(outcome
        .advisories
        .iter()
        .any(|a| a.alignment.as_deref() == Some("stub")));
    assert!(outcome.ranges.iter().all(|r| r.alignment == "road"));
}
