//! Model intersection walk: does a world-space segment hit any
//! triangle of an obstacle model?

use sightline_math::{Point3, Transform};

use crate::mesh::ObstacleModel;
use crate::triangle::segment_hits_triangle;
use crate::volume::SegmentVolume;

/// Test whether the world-space segment `[world_a, world_b]` intersects
/// any triangle of `model`.
///
/// Both endpoints are transformed into model space via `inverse` (the
/// cached inverse of the model's transform). Each mesh with geometry
/// and a spatial structure is walked through its BVH, and the walk
/// short-circuits on the first confirmed hit. Meshes without geometry
/// or without a BVH are skipped, not errors.
pub fn model_blocks_segment(
    model: &ObstacleModel,
    inverse: &Transform,
    world_a: &Point3,
    world_b: &Point3,
) -> bool {
    let a = inverse.apply_point(world_a);
    let b = inverse.apply_point(world_b);
    let probe = SegmentVolume::new(a, b);

    for part in model.meshes() {
        if part.mesh.is_empty() {
            continue;
        }
        let Some(bvh) = part.bvh() else {
            continue;
        };
        let mesh = &part.mesh;
        let hit = bvh.visit_crossed(&probe, &mut |tri| {
            let [ta, tb, tc] = mesh.triangle(tri as usize);
            segment_hits_triangle(&a, &b, &ta, &tb, &tc)
        });
        if hit {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{ModelMesh, TriangleMesh};

    /// A single upright triangle in the YZ plane at x = 0, facing +X.
    fn wall_mesh() -> TriangleMesh {
        TriangleMesh::from_triangles(
            &[
                Point3::new(0.0, -5.0, -5.0),
                Point3::new(0.0, 5.0, -5.0),
                Point3::new(0.0, 0.0, 5.0),
            ],
            &[0, 1, 2],
        )
    }

    #[test]
    fn test_no_geometry_never_hits() {
        let model = ObstacleModel::new(
            "empty",
            vec![ModelMesh::new(TriangleMesh::new())],
            Transform::identity(),
        );
        let inv = Transform::identity();
        assert!(!model_blocks_segment(
            &model,
            &inv,
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
        ));
    }

    #[test]
    fn test_unindexed_mesh_is_skipped() {
        let model = ObstacleModel::new(
            "raw",
            vec![ModelMesh::unindexed(wall_mesh())],
            Transform::identity(),
        );
        let inv = Transform::identity();
        // The segment crosses the triangle, but without a spatial
        // structure the mesh is not walked.
        assert!(!model_blocks_segment(
            &model,
            &inv,
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
        ));
    }

    #[test]
    fn test_single_triangle_hit() {
        let model = ObstacleModel::new(
            "wall",
            vec![ModelMesh::new(wall_mesh())],
            Transform::identity(),
        );
        let inv = Transform::identity();
        // Crossing point (0, 0, 0): verified inside the triangle by
        // hand (midway along the bottom-to-apex median).
        assert!(model_blocks_segment(
            &model,
            &inv,
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
        ));
        // Same direction, passing above the apex.
        assert!(!model_blocks_segment(
            &model,
            &inv,
            &Point3::new(-1.0, 0.0, 6.0),
            &Point3::new(1.0, 0.0, 6.0),
        ));
    }

    #[test]
    fn test_transformed_model() {
        let model = ObstacleModel::new(
            "wall",
            vec![ModelMesh::new(wall_mesh())],
            Transform::translation(100.0, 0.0, 0.0),
        );
        let inv = model.transform().inverse().unwrap();
        assert!(model_blocks_segment(
            &model,
            &inv,
            &Point3::new(99.0, 0.0, 0.0),
            &Point3::new(101.0, 0.0, 0.0),
        ));
        assert!(!model_blocks_segment(
            &model,
            &inv,
            &Point3::new(-1.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
        ));
    }

    #[test]
    fn test_mesh_order_does_not_change_outcome() {
        let empty = ModelMesh::new(TriangleMesh::new());
        let wall = ModelMesh::new(wall_mesh());
        let a = ObstacleModel::new("a", vec![empty.clone(), wall.clone()], Transform::identity());
        let b = ObstacleModel::new("b", vec![wall, empty], Transform::identity());
        let inv = Transform::identity();
        let start = Point3::new(-1.0, 0.0, 0.0);
        let end = Point3::new(1.0, 0.0, 0.0);
        assert_eq!(
            model_blocks_segment(&a, &inv, &start, &end),
            model_blocks_segment(&b, &inv, &start, &end),
        );
    }
}
