//! scene-journey
//!
//! A collection of small interactive 3D lessons rendered with wgpu, on native
//! and on the web. Lessons are registered as routes of an [`architecture::Application`]
//! and run one at a time by the [`shell`], which owns the window, the GPU and
//! the menu.
//!
//! High-level modules
//! - `animation`: tweens, timelines, easing and frame driven playback
//! - `app`: the lesson lifecycle and the async constructors that build lessons
//! - `architecture`: modules, routes and menus
//! - `camera`: perspective camera plus orbit, fly and pointer controls
//! - `data_structures`: geometry, meshes, materials, textures and scenes
//! - `lessons`: every lesson, and the [`lessons::application`] tying them together
//! - `math`: colours and curves
//! - `params`: the tweakable values each lesson exposes
//! - `postprocessing`: effect composers, passes and render layers
//! - `render`: drawing a scene through the cached pipelines
//! - `shell`: window, event loop and navigation
//!

pub mod animation;
pub mod app;
pub mod architecture;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod lessons;
pub mod math;
pub mod params;
pub mod pipelines;
pub mod postprocessing;
pub mod render;
pub mod resources;
pub mod shell;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Web entry point: run the lesson named by the page location.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    let config = config::ShellConfig::default();
    let application =
        lessons::application(&config.default_route).map_err(|e| JsValue::from_str(&e.to_string()))?;
    shell::run(application, config, shell::location_route()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
