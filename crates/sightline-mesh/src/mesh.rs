//! Triangle mesh and obstacle model types.

use sightline_math::{Point3, Transform, DEGENERATE_EPS};

use crate::bbox::Aabb3;
use crate::bvh::MeshBvh;

/// A triangle mesh with flat vertex and index buffers.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub positions: Vec<f64>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from vertex points and index triplets.
    pub fn from_triangles(vertices: &[Point3], indices: &[u32]) -> Self {
        let mut positions = Vec::with_capacity(vertices.len() * 3);
        for v in vertices {
            positions.extend_from_slice(&[v.x, v.y, v.z]);
        }
        Self {
            positions,
            indices: indices.to_vec(),
        }
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// True if the mesh holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex `i` reconstructed from the flat position buffer.
    pub fn vertex(&self, i: usize) -> Point3 {
        let base = i * 3;
        Point3::new(
            self.positions[base],
            self.positions[base + 1],
            self.positions[base + 2],
        )
    }

    /// The three corner points of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let base = i * 3;
        [
            self.vertex(self.indices[base] as usize),
            self.vertex(self.indices[base + 1] as usize),
            self.vertex(self.indices[base + 2] as usize),
        ]
    }

    /// Bounding box of all vertices (model space).
    pub fn bounds(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for i in 0..self.vertex_count() {
            aabb.include_point(&self.vertex(i));
        }
        aabb
    }
}

/// One mesh of an obstacle model, with its triangle spatial structure.
#[derive(Debug, Clone)]
pub struct ModelMesh {
    /// Triangle geometry in model space.
    pub mesh: TriangleMesh,
    bvh: Option<MeshBvh>,
}

impl ModelMesh {
    /// Wrap a mesh and build its triangle BVH (skipped for empty meshes).
    pub fn new(mesh: TriangleMesh) -> Self {
        let bvh = if mesh.is_empty() {
            None
        } else {
            Some(MeshBvh::build(&mesh))
        };
        Self { mesh, bvh }
    }

    /// Wrap a mesh without a spatial structure. The intersection walk
    /// skips such meshes.
    pub fn unindexed(mesh: TriangleMesh) -> Self {
        Self { mesh, bvh: None }
    }

    /// The triangle BVH, if one was built.
    pub fn bvh(&self) -> Option<&MeshBvh> {
        self.bvh.as_ref()
    }
}

/// A 3D model whose geometry can block a line of sight.
#[derive(Debug, Clone)]
pub struct ObstacleModel {
    /// Display name, used in diagnostic records.
    pub name: String,
    meshes: Vec<ModelMesh>,
    transform: Transform,
}

impl ObstacleModel {
    /// Create a model from meshes and a model-to-world transform.
    pub fn new(name: impl Into<String>, meshes: Vec<ModelMesh>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            meshes,
            transform,
        }
    }

    /// The model's meshes.
    pub fn meshes(&self) -> &[ModelMesh] {
        &self.meshes
    }

    /// Model-to-world transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// True if any mesh holds triangles.
    pub fn has_geometry(&self) -> bool {
        self.meshes.iter().any(|m| !m.mesh.is_empty())
    }

    /// World-space centroid: the area-weighted mean of triangle
    /// centroids across all meshes.
    ///
    /// Falls back to the unweighted vertex mean when the total triangle
    /// area is degenerate. Returns `None` for a model with no geometry,
    /// which cannot be sighted at.
    pub fn world_centroid(&self) -> Option<Point3> {
        let mut weighted = Point3::origin().coords;
        let mut total_area = 0.0;
        let mut vertex_sum = Point3::origin().coords;
        let mut vertex_count = 0usize;

        for part in &self.meshes {
            let mesh = &part.mesh;
            for i in 0..mesh.triangle_count() {
                let [a, b, c] = mesh.triangle(i);
                let wa = self.transform.apply_point(&a);
                let wb = self.transform.apply_point(&b);
                let wc = self.transform.apply_point(&c);
                let area = 0.5 * (wb - wa).cross(&(wc - wa)).norm();
                let centroid = (wa.coords + wb.coords + wc.coords) / 3.0;
                weighted += centroid * area;
                total_area += area;
                vertex_sum += wa.coords + wb.coords + wc.coords;
                vertex_count += 3;
            }
        }

        if vertex_count == 0 {
            return None;
        }
        if total_area > DEGENERATE_EPS {
            Some(Point3::from(weighted / total_area))
        } else {
            Some(Point3::from(vertex_sum / vertex_count as f64))
        }
    }

    /// World-space bounding box of all mesh vertices.
    pub fn bounds_world(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for part in &self.meshes {
            let mesh = &part.mesh;
            for i in 0..mesh.vertex_count() {
                aabb.include_point(&self.transform.apply_point(&mesh.vertex(i)));
            }
        }
        aabb
    }
}
