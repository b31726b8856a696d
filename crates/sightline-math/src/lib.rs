#![warn(missing_docs)]

//! Math types for the sightline visibility engine.
//!
//! Thin wrappers around nalgebra providing domain-specific types for
//! 3D sight-line geometry: points, vectors, directions, affine
//! transforms, and the tolerance constants shared by the intersection
//! tests and the sweep engine.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};

pub mod search;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D space.
pub type Point2 = nalgebra::Point2<f64>;

/// Symmetric geometric comparison band, in model length units.
///
/// Used for barycentric acceptance, segment parameter bounds, and
/// point/segment distance tests.
pub const GEOM_EPS: f64 = 1e-3;

/// Guard for near-zero determinants and squared segment lengths.
///
/// Values at or below this are treated as degenerate (no
/// intersection), never as errors.
pub const DEGENERATE_EPS: f64 = 1e-7;

/// Keyframe merge tolerance, in station units.
///
/// Consecutive keyframes whose target stations differ by less than
/// this collapse into one.
pub const KEYFRAME_MERGE_EPS: f64 = 0.01;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation, applies rotation/scale).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_translation() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let p = Point3::new(1.0, 2.0, 3.0);
        let result = t.apply_point(&p);
        assert!((result.x - 11.0).abs() < 1e-12);
        assert!((result.y - 22.0).abs() < 1e-12);
        assert!((result.z - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_translation_ignores_vectors() {
        let t = Transform::translation(10.0, 20.0, 30.0);
        let v = Vec3::new(1.0, 0.0, 0.0);
        let result = t.apply_vec(&v);
        assert!((result - v).norm() < 1e-12);
    }

    #[test]
    fn test_rotation_z_90() {
        let t = Transform::rotation_z(PI / 2.0);
        let p = Point3::new(1.0, 0.0, 0.0);
        let result = t.apply_point(&p);
        assert!(result.x.abs() < 1e-12);
        assert!((result.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale() {
        let t = Transform::scale(2.0, 3.0, 4.0);
        let p = Point3::new(1.0, 1.0, 1.0);
        let result = t.apply_point(&p);
        assert!((result.x - 2.0).abs() < 1e-12);
        assert!((result.y - 3.0).abs() < 1e-12);
        assert!((result.z - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform::translation(1.0, 2.0, 3.0).then(&Transform::rotation_z(0.3));
        let inv = t.inverse().unwrap();
        let composed = t.then(&inv);
        let p = Point3::new(5.0, 6.0, 7.0);
        let result = composed.apply_point(&p);
        assert!((result - p).norm() < 1e-12);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let t = Transform::scale(1.0, 1.0, 0.0);
        assert!(t.inverse().is_none());
    }
}
