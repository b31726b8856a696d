#![warn(missing_docs)]

//! Obstacle geometry for the sightline visibility engine.
//!
//! This crate holds everything between a sight segment and a 3D
//! obstacle: the segment-shaped query volume used for spatial culling,
//! the exact segment-triangle intersector, flat-buffer triangle meshes
//! with a per-mesh BVH, and the model intersection walk that ties them
//! together.
//!
//! # Architecture
//!
//! - [`SegmentVolume`] - query shape between observer and target
//! - [`segment_hits_triangle`] - exact one-sided triangle test
//! - [`TriangleMesh`] / [`ObstacleModel`] - obstacle geometry
//! - [`MeshBvh`] - per-mesh triangle spatial structure
//! - [`model_blocks_segment`] - first-hit walk across a model's meshes

pub mod bbox;
pub mod bvh;
pub mod mesh;
pub mod triangle;
pub mod volume;
pub mod walk;

pub use bbox::Aabb3;
pub use bvh::MeshBvh;
pub use mesh::{ModelMesh, ObstacleModel, TriangleMesh};
pub use triangle::segment_hits_triangle;
pub use volume::SegmentVolume;
pub use walk::model_blocks_segment;
