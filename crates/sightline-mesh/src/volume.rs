//! Segment-shaped query volume for spatial index culling.

use sightline_math::{Point3, Transform, Vec3, DEGENERATE_EPS, GEOM_EPS};

use crate::bbox::Aabb3;

/// A query shape wrapping the sight segment between an observer and a
/// target point.
///
/// The volume behaves as a thin tube of epsilon radius around its
/// centerline. It exists to cull candidate obstacles at the spatial
/// index level before exact triangle tests run.
#[derive(Debug, Clone, Copy)]
pub struct SegmentVolume {
    /// Observer-side endpoint.
    pub start: Point3,
    /// Target-side endpoint.
    pub end: Point3,
}

impl SegmentVolume {
    /// Create a volume from the two segment endpoints.
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Segment direction, unnormalized.
    fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    /// True if the segment passes through the box (slab method, with
    /// the parameter interval clipped to the segment).
    pub fn intersects_box(&self, aabb: &Aabb3) -> bool {
        let dir = self.direction();
        let mut t_min = 0.0f64;
        let mut t_max = 1.0f64;
        for axis in 0..3 {
            let o = self.start[axis];
            let d = dir[axis];
            let lo = aabb.min[axis] - GEOM_EPS;
            let hi = aabb.max[axis] + GEOM_EPS;
            if d.abs() < DEGENERATE_EPS {
                if o < lo || o > hi {
                    return false;
                }
            } else {
                let t1 = (lo - o) / d;
                let t2 = (hi - o) / d;
                let (near, far) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
                t_min = t_min.max(near);
                t_max = t_max.min(far);
                if t_min > t_max {
                    return false;
                }
            }
        }
        true
    }

    /// Closest-approach test against another segment.
    ///
    /// True when the minimum distance between the two segments is
    /// within the epsilon tube radius. Degenerates to a
    /// point-containment test when this volume's own endpoints
    /// coincide.
    pub fn intersects_segment(&self, a: &Point3, b: &Point3) -> bool {
        let d1 = self.direction();
        if d1.norm_squared() < DEGENERATE_EPS {
            return point_segment_distance(&self.start, a, b) < GEOM_EPS;
        }
        segment_segment_distance(&self.start, &self.end, a, b) < GEOM_EPS
    }

    /// True if `p` lies within epsilon of the infinite line through the
    /// two endpoints.
    ///
    /// This is a line-distance test, not a true segment-containment
    /// test: a point beyond either endpoint but on the line still
    /// passes. Callers needing segment clamping must layer that check
    /// themselves.
    pub fn contains_point(&self, p: &Point3) -> bool {
        let dir = self.direction();
        let len_sq = dir.norm_squared();
        if len_sq < DEGENERATE_EPS {
            return (p - self.start).norm() < GEOM_EPS;
        }
        let t = (p - self.start).dot(&dir) / len_sq;
        let foot = self.start + dir * t;
        (p - foot).norm() < GEOM_EPS
    }

    /// Return a new volume with both endpoints transformed.
    pub fn transformed(&self, m: &Transform) -> Self {
        Self {
            start: m.apply_point(&self.start),
            end: m.apply_point(&self.end),
        }
    }

    /// Level-of-detail hint for index consumers.
    ///
    /// Always unbounded: the volume imposes no screen-space
    /// simplification on the candidates it selects.
    pub fn tolerance(&self) -> f64 {
        f64::INFINITY
    }

    /// Clip against an infinite line. Always reports no clip; this
    /// shape does not implement clipping.
    pub fn clip_line(&self, _origin: &Point3, _dir: &Vec3) -> Option<(Point3, Point3)> {
        None
    }

    /// Clip against a ray. Always reports no clip.
    pub fn clip_ray(&self, _origin: &Point3, _dir: &Vec3) -> Option<(Point3, Point3)> {
        None
    }

    /// Clip against another segment. Always reports no clip.
    pub fn clip_segment(&self, _a: &Point3, _b: &Point3) -> Option<(Point3, Point3)> {
        None
    }
}

/// Distance from a point to a segment (clamped to the endpoints).
fn point_segment_distance(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < DEGENERATE_EPS {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// Minimum distance between two segments (both clamped).
fn segment_segment_distance(p1: &Point3, q1: &Point3, p2: &Point3, q2: &Point3) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a < DEGENERATE_EPS && e < DEGENERATE_EPS {
        return (p1 - p2).norm();
    }
    if a < DEGENERATE_EPS {
        return point_segment_distance(p1, p2, q2);
    }
    if e < DEGENERATE_EPS {
        return point_segment_distance(p2, p1, q1);
    }

    let c = d1.dot(&r);
    let b = d1.dot(&d2);
    let denom = a * e - b * b;

    // Parallel segments: pick an arbitrary s and clamp.
    let mut s = if denom.abs() > DEGENERATE_EPS {
        ((b * f - c * e) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut t = (b * s + f) / e;
    if t < 0.0 {
        t = 0.0;
        s = (-c / a).clamp(0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = ((b - c) / a).clamp(0.0, 1.0);
    }

    let closest1 = p1 + d1 * s;
    let closest2 = p2 + d2 * t;
    (closest1 - closest2).norm()
}
