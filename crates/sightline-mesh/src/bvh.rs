//! Bounding volume hierarchy over mesh triangles.
//!
//! The per-mesh spatial structure used by the model intersection walk:
//! only triangles in nodes the sight segment passes through are handed
//! to the exact intersector.

use sightline_math::GEOM_EPS;

use crate::bbox::Aabb3;
use crate::mesh::TriangleMesh;
use crate::volume::SegmentVolume;

/// Leaf threshold: nodes with at most this many triangles stop splitting.
const LEAF_SIZE: usize = 8;

/// A BVH node - either a leaf holding triangle indices or an internal
/// node with two children.
#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        aabb: Aabb3,
        triangles: Vec<u32>,
    },
    Internal {
        aabb: Aabb3,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn aabb(&self) -> &Aabb3 {
        match self {
            BvhNode::Leaf { aabb, .. } => aabb,
            BvhNode::Internal { aabb, .. } => aabb,
        }
    }
}

/// Spatial structure over one mesh's triangles.
#[derive(Debug, Clone)]
pub struct MeshBvh {
    root: Option<BvhNode>,
}

impl MeshBvh {
    /// Build a BVH for `mesh` by recursive centroid splitting along the
    /// longest axis.
    pub fn build(mesh: &TriangleMesh) -> Self {
        let mut tri_data: Vec<(u32, Aabb3)> = (0..mesh.triangle_count())
            .map(|i| {
                let [a, b, c] = mesh.triangle(i);
                let mut aabb = Aabb3::empty();
                aabb.include_point(&a);
                aabb.include_point(&b);
                aabb.include_point(&c);
                // Pad so the slab test tolerates flat triangles.
                aabb.expand(GEOM_EPS);
                (i as u32, aabb)
            })
            .collect();

        let root = if tri_data.is_empty() {
            None
        } else {
            Some(build_node(&mut tri_data))
        };

        Self { root }
    }

    /// Walk the triangles in nodes crossed by `volume`, calling `visit`
    /// with each candidate triangle index.
    ///
    /// `visit` returns `true` to confirm a hit; the walk short-circuits
    /// and returns `true` at the first confirmation. Returns `false`
    /// when no candidate confirms.
    pub fn visit_crossed(
        &self,
        volume: &SegmentVolume,
        visit: &mut dyn FnMut(u32) -> bool,
    ) -> bool {
        match &self.root {
            Some(root) => visit_node(root, volume, visit),
            None => false,
        }
    }
}

fn visit_node(
    node: &BvhNode,
    volume: &SegmentVolume,
    visit: &mut dyn FnMut(u32) -> bool,
) -> bool {
    if !volume.intersects_box(node.aabb()) {
        return false;
    }
    match node {
        BvhNode::Leaf { triangles, .. } => {
            for &tri in triangles {
                if visit(tri) {
                    return true;
                }
            }
            false
        }
        BvhNode::Internal { left, right, .. } => {
            visit_node(left, volume, visit) || visit_node(right, volume, visit)
        }
    }
}

fn build_node(tri_data: &mut [(u32, Aabb3)]) -> BvhNode {
    let mut bounds = Aabb3::empty();
    for (_, aabb) in tri_data.iter() {
        bounds.include(aabb);
    }

    if tri_data.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            aabb: bounds,
            triangles: tri_data.iter().map(|(i, _)| *i).collect(),
        };
    }

    // Split at the centroid midpoint of the longest axis.
    let extent = bounds.max - bounds.min;
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };
    let split = (bounds.min[axis] + bounds.max[axis]) / 2.0;

    let mut mid = partition(tri_data, axis, split);

    // Degenerate split (all centroids on one side): halve instead.
    if mid == 0 || mid == tri_data.len() {
        mid = tri_data.len() / 2;
    }

    let (left_data, right_data) = tri_data.split_at_mut(mid);
    BvhNode::Internal {
        aabb: bounds,
        left: Box::new(build_node(left_data)),
        right: Box::new(build_node(right_data)),
    }
}

/// Partition triangles by AABB center along an axis.
fn partition(tri_data: &mut [(u32, Aabb3)], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = tri_data.len();
    while left < right {
        if tri_data[left].1.center()[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            tri_data.swap(left, right);
        }
    }
    left
}
