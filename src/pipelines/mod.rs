//! Render pipelines and their WGSL shaders.
//!
//! - `basic` holds the shared pipeline constructor
//! - `scene` draws meshes with a material
//! - `cache` keeps one scene pipeline per material/target combination
//! - `effect` draws full screen postprocessing passes

pub mod basic;
pub mod cache;
pub mod effect;
pub mod scene;
