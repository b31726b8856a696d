//! Segment-triangle intersection (closed-form).

use sightline_math::{Point3, DEGENERATE_EPS, GEOM_EPS};

/// Test whether the segment `[seg_start, seg_end]` passes through the
/// triangle `(a, b, c)`.
///
/// Möller–Trumbore style barycentric test. The hit is accepted when the
/// plane crossing lies within the segment (`0 <= t <= length`) and
/// inside the triangle (`u, v >= 0`, `u + v <= 1`), all within the
/// symmetric geometric band.
///
/// The test is one-sided: a triangle whose normal points against the
/// segment direction (determinant at or below the degenerate guard) is
/// never reported as a hit. Obstacle meshes are expected to present
/// front-facing winding toward viewers.
///
/// A segment shorter than the degenerate guard returns `false` without
/// falling back to a point-in-triangle test, so a zero-length probe can
/// miss a triangle it is actually inside.
pub fn segment_hits_triangle(
    seg_start: &Point3,
    seg_end: &Point3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
) -> bool {
    let dir = seg_end - seg_start;
    let len_sq = dir.norm_squared();
    if len_sq < DEGENERATE_EPS {
        return false;
    }
    let len = len_sq.sqrt();
    let d = dir / len;

    let e1 = b - a;
    let e2 = c - a;
    let normal = e1.cross(&e2);

    // Near-parallel or back-facing relative to the segment direction.
    let det = d.dot(&normal);
    if det <= DEGENERATE_EPS {
        return false;
    }
    let inv_det = 1.0 / det;

    let w = a - seg_start;
    let t = w.dot(&normal) * inv_det;
    if t < -GEOM_EPS || t > len + GEOM_EPS {
        return false;
    }

    let u = d.dot(&e2.cross(&w)) * inv_det;
    if u < -GEOM_EPS {
        return false;
    }
    let v = d.dot(&w.cross(&e1)) * inv_det;
    if v < -GEOM_EPS || u + v > 1.0 + GEOM_EPS {
        return false;
    }

    true
}
