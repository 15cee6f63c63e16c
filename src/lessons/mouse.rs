//! The camera follows the pointer around a cube.

use cgmath::Vector3;
use winit::event::WindowEvent;

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::{PerspectiveCamera, pointer_orbit_position},
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene::{Object, Scene},
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::Color,
};

const RADIUS: f32 = 3.0;

/// Cursor position as a fraction of the window, centred when unknown.
pub fn pointer_ratio(cursor: Option<(f64, f64)>, size: (u32, u32)) -> (f32, f32) {
    match cursor {
        Some((x, y)) => (
            (x / size.0.max(1) as f64) as f32,
            (y / size.1.max(1) as f64) as f32,
        ),
        None => (0.5, 0.5),
    }
}

pub struct MouseControl {
    stage: Stage,
    cursor: Option<(f64, f64)>,
    size: (u32, u32),
}

impl MouseControl {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(0.0, 0.0, RADIUS);
        let mut stage = Stage::new(ctx, Scene::new(Color::BLACK), camera);
        stage.scene.add(Object::new(
            "axes",
            mesh(ctx, &Geometry::axes(1.0), "axes"),
            Material::basic(Color::WHITE),
        ));
        stage.scene.add(Object::new(
            "cube",
            mesh(ctx, &Geometry::cuboid(1.0, 1.0, 1.0), "cube"),
            Material::basic(Color::from_hex(0x336699)),
        ));
        Self {
            stage,
            cursor: None,
            size: ctx.size,
        }
    }
}

impl InteractiveApp for MouseControl {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let (rx, ry) = pointer_ratio(self.cursor, self.size);
        let camera = &mut self.stage.camera;
        camera.position = pointer_orbit_position(rx, ry, RADIUS);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        self.stage.draw(frame);
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.size = (width, height);
        self.stage.resize(width, height);
    }

    fn on_window_event(&mut self, _ctx: &InitContext, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x, position.y));
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                true
            }
            _ => false,
        }
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/mouse-control",
        "THREE.js | Mouse Control",
        "Mouse Control",
        AppConstructor::new(|ctx| async move { anyhow::Ok(MouseControl::new(&ctx)) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_centred_without_a_cursor() {
        assert_eq!(pointer_ratio(None, (800, 600)), (0.5, 0.5));
        assert_eq!(pointer_ratio(Some((200.0, 600.0)), (800, 600)), (0.25, 1.0));
    }
}
