//! Scene data: geometry, transforms, textures, materials and the scene graph.
//!
//! - `geometry` builds vertex and index lists on the CPU
//! - `mesh` uploads a geometry to the GPU
//! - `material` describes how a mesh is shaded
//! - `texture` wraps GPU images and offscreen render targets
//! - `transform` holds position, rotation and scale
//! - `scene` arranges objects in a parent/child hierarchy with lights

pub mod geometry;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture;
pub mod transform;
