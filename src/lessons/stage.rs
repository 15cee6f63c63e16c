//! Scene, camera and renderer bundled the way most lessons use them.

use std::sync::Arc;

use cgmath::Vector3;
use winit::event::WindowEvent;

use crate::{
    app::Frame,
    camera::{OrbitControls, PerspectiveCamera},
    context::InitContext,
    data_structures::{geometry::Geometry, mesh::Mesh, scene::Scene},
    render::SceneRenderer,
};

pub fn mesh(ctx: &InitContext, geometry: &Geometry, name: &str) -> Arc<Mesh> {
    Arc::new(Mesh::new(&ctx.device, geometry, name))
}

pub struct Stage {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub renderer: SceneRenderer,
    pub controls: Option<OrbitControls>,
}

impl Stage {
    /// The camera looks at the origin and takes the aspect of `ctx`.
    pub fn new(ctx: &InitContext, scene: Scene, mut camera: PerspectiveCamera) -> Self {
        camera.set_aspect(ctx.size.0, ctx.size.1);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        Self {
            scene,
            camera,
            renderer: SceneRenderer::new(ctx),
            controls: None,
        }
    }

    /// Orbit around the origin with damping and half zoom speed.
    pub fn with_orbit(mut self, ctx: &InitContext) -> Self {
        self.controls = Some(
            OrbitControls::new(self.camera.target, ctx.size)
                .with_zoom_speed(0.5)
                .with_damping(),
        );
        self
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        if let Some(controls) = &mut self.controls {
            controls.set_viewport(width, height);
        }
    }

    pub fn window_event(&mut self, event: &WindowEvent) -> bool {
        match &mut self.controls {
            Some(controls) => controls.handle_window_event(&self.camera, event),
            None => false,
        }
    }

    /// Disabled controls leave the camera alone.
    pub fn update_controls(&mut self) {
        if let Some(controls) = &mut self.controls {
            if controls.enabled {
                controls.update(&mut self.camera);
            }
        }
    }

    /// Update the controls and draw straight into the frame.
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        self.update_controls();
        self.renderer
            .render(frame.encoder, &self.scene, &self.camera, frame.view, frame.size, true);
    }
}
