//! Alignment query surface, weak handles, and the direction-aware
//! adapter the sweep algorithms sample through.

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use sightline_math::{Point3, Vec3, DEGENERATE_EPS};

/// The path query surface supplied by the host document.
///
/// Stations are distances along the centerline from the path start;
/// offsets are lateral distances, positive to the right of the
/// direction of travel.
pub trait Alignment {
    /// Total centerline length.
    fn length(&self) -> f64;
    /// Display name.
    fn name(&self) -> String;
    /// World position at `(station, offset)`.
    fn to_world(&self, station: f64, offset: f64) -> Point3;
    /// Project a world point back to `(station, offset)`.
    fn from_world(&self, point: &Point3) -> (f64, f64);
    /// Forward tangent direction at a station.
    fn tangent_at(&self, station: f64) -> Vec3;
    /// Centerline elevation at a station.
    fn elevation_at(&self, station: f64) -> f64;
    /// Human-readable chainage label for a station.
    fn chainage_label(&self, station: f64) -> String;
}

/// Non-owning handle to a host-owned alignment.
///
/// Scalar metadata (length, name) is captured at wrap time so the
/// engine keeps working if the referenced entity is later removed.
/// Queries through a dead handle return neutral defaults rather than
/// failing; callers must tolerate an alignment becoming unavailable
/// mid-scan.
#[derive(Clone)]
pub struct AlignmentHandle {
    target: Weak<dyn Alignment>,
    length: f64,
    name: String,
}

impl AlignmentHandle {
    /// Wrap an alignment, caching its scalar metadata.
    pub fn new(alignment: &Arc<dyn Alignment>) -> Self {
        Self {
            target: Arc::downgrade(alignment),
            length: alignment.length(),
            name: alignment.name(),
        }
    }

    /// Cached centerline length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Cached display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the referenced entity still exists.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    fn with<T>(&self, neutral: T, query: impl FnOnce(&dyn Alignment) -> T) -> T {
        match self.target.upgrade() {
            Some(alignment) => query(alignment.as_ref()),
            None => neutral,
        }
    }

    /// World position, or the origin if the alignment is gone.
    pub fn to_world(&self, station: f64, offset: f64) -> Point3 {
        self.with(Point3::origin(), |a| a.to_world(station, offset))
    }

    /// `(station, offset)`, or `(0, 0)` if the alignment is gone.
    pub fn from_world(&self, point: &Point3) -> (f64, f64) {
        self.with((0.0, 0.0), |a| a.from_world(point))
    }

    /// Forward tangent, or the zero vector if the alignment is gone.
    pub fn tangent_at(&self, station: f64) -> Vec3 {
        self.with(Vec3::zeros(), |a| a.tangent_at(station))
    }

    /// Elevation, or zero if the alignment is gone.
    pub fn elevation_at(&self, station: f64) -> f64 {
        self.with(0.0, |a| a.elevation_at(station))
    }

    /// Chainage label, or an empty string if the alignment is gone.
    pub fn chainage_label(&self, station: f64) -> String {
        self.with(String::new(), |a| a.chainage_label(station))
    }
}

impl std::fmt::Debug for AlignmentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignmentHandle")
            .field("name", &self.name)
            .field("length", &self.length)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Which way the sweep walks an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanDirection {
    /// Stations increase with the path's own parameterization.
    #[default]
    Forward,
    /// Stations run from the path end back to its start.
    Backward,
}

/// An alignment plus a scan direction.
///
/// For [`ScanDirection::Forward`] all queries pass through unchanged.
/// For [`ScanDirection::Backward`] stations are mirrored to
/// `length - s`, tangents are negated, and lateral offsets are
/// sign-flipped in both directions, so every sweep algorithm can be
/// written once, oblivious to direction.
#[derive(Debug, Clone)]
pub struct DirectedAlignment {
    handle: AlignmentHandle,
    direction: ScanDirection,
}

impl DirectedAlignment {
    /// Wrap a handle with a direction.
    pub fn new(handle: AlignmentHandle, direction: ScanDirection) -> Self {
        Self { handle, direction }
    }

    /// Cached centerline length (direction-independent).
    pub fn length(&self) -> f64 {
        self.handle.length()
    }

    /// Cached display name.
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    fn mirror(&self, station: f64) -> f64 {
        match self.direction {
            ScanDirection::Forward => station,
            ScanDirection::Backward => self.handle.length() - station,
        }
    }

    /// World position at a direction-relative `(station, offset)`.
    pub fn to_world(&self, station: f64, offset: f64) -> Point3 {
        match self.direction {
            ScanDirection::Forward => self.handle.to_world(station, offset),
            ScanDirection::Backward => self.handle.to_world(self.mirror(station), -offset),
        }
    }

    /// Direction-relative `(station, offset)` of a world point.
    pub fn from_world(&self, point: &Point3) -> (f64, f64) {
        let (station, offset) = self.handle.from_world(point);
        match self.direction {
            ScanDirection::Forward => (station, offset),
            ScanDirection::Backward => (self.handle.length() - station, -offset),
        }
    }

    /// Tangent in the direction of travel.
    pub fn tangent_at(&self, station: f64) -> Vec3 {
        match self.direction {
            ScanDirection::Forward => self.handle.tangent_at(station),
            ScanDirection::Backward => -self.handle.tangent_at(self.mirror(station)),
        }
    }

    /// Centerline elevation at a direction-relative station.
    pub fn elevation_at(&self, station: f64) -> f64 {
        self.handle.elevation_at(self.mirror(station))
    }

    /// Chainage label at a direction-relative station.
    pub fn chainage_label(&self, station: f64) -> String {
        self.handle.chainage_label(self.mirror(station))
    }
}

/// A straight alignment between two points.
///
/// The simplest concrete path: constant tangent, linear elevation.
/// Useful for small documents and as the reference geometry in tests.
#[derive(Debug, Clone)]
pub struct LinearAlignment {
    name: String,
    start: Point3,
    end: Point3,
}

impl LinearAlignment {
    /// Create a straight alignment from `start` to `end`.
    pub fn new(name: impl Into<String>, start: Point3, end: Point3) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    fn dir(&self) -> Vec3 {
        let d = self.end - self.start;
        let len = d.norm();
        if len < DEGENERATE_EPS {
            Vec3::x()
        } else {
            d / len
        }
    }

    /// Unit vector pointing to the right of the direction of travel.
    fn lateral(&self) -> Vec3 {
        let right = self.dir().cross(&Vec3::z());
        let len = right.norm();
        if len < DEGENERATE_EPS {
            // Vertical centerline: pick an arbitrary horizontal right.
            Vec3::new(0.0, -1.0, 0.0)
        } else {
            right / len
        }
    }
}

impl Alignment for LinearAlignment {
    fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn to_world(&self, station: f64, offset: f64) -> Point3 {
        self.start + self.dir() * station + self.lateral() * offset
    }

    fn from_world(&self, point: &Point3) -> (f64, f64) {
        let station = (point - self.start).dot(&self.dir());
        let foot = self.start + self.dir() * station;
        let offset = (point - foot).dot(&self.lateral());
        (station, offset)
    }

    fn tangent_at(&self, _station: f64) -> Vec3 {
        self.dir()
    }

    fn elevation_at(&self, station: f64) -> f64 {
        (self.start + self.dir() * station).z
    }

    fn chainage_label(&self, station: f64) -> String {
        format_chainage(station)
    }
}

/// Format a station as a chainage label, e.g. `PK 12+340`.
pub fn format_chainage(station: f64) -> String {
    let total = station.round().max(0.0) as i64;
    format!("PK {}+{:03}", total / 1000, total % 1000)
}
