//! Two boxes fading between flag colours while the camera circles them.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene::{Object, ObjectId, Scene},
        transform::Transform,
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::Color,
};

const BLUE: u32 = 0x0056b9;
const YELLOW: u32 = 0xffd800;
const RED: u32 = 0xcc0000;
const CAMERA_RADIUS: f32 = 5.0;

/// Angle driving both the colours and the camera, for `time` in ms.
pub fn flag_angle(time: f64) -> f32 {
    (time / 4096.0) as f32 * PI
}

/// Upper and lower colour at `angle`: the flag at rest, red over black at
/// the other end of the swing.
pub fn flag_colors(angle: f32) -> (Color, Color) {
    let t = (angle.cos() + 1.0) / 2.0;
    (
        Color::from_hex(RED).lerp(Color::from_hex(BLUE), t),
        Color::BLACK.lerp(Color::from_hex(YELLOW), t),
    )
}

pub struct Flag {
    stage: Stage,
    upper: ObjectId,
    lower: ObjectId,
}

impl Flag {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(0.0, 0.5, CAMERA_RADIUS);
        let mut stage = Stage::new(ctx, Scene::new(Color::WHITE), camera);
        let block = mesh(ctx, &Geometry::cuboid(3.0, 1.0, 1.0), "flag block");
        let upper = stage.scene.add(
            Object::new("blue", block.clone(), Material::basic(Color::from_hex(BLUE)))
                .with_transform(Transform::from_position(0.0, 1.0, 0.0)),
        );
        let lower = stage
            .scene
            .add(Object::new("yellow", block, Material::basic(Color::from_hex(YELLOW))));
        Self { stage, upper, lower }
    }
}

impl InteractiveApp for Flag {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let angle = flag_angle(frame.time);
        let (upper, lower) = flag_colors(angle);
        for (id, color) in [(self.upper, upper), (self.lower, lower)] {
            if let Some(object) = self.stage.scene.get_mut(id) {
                object.material.color = color;
            }
        }
        let camera = &mut self.stage.camera;
        camera.position = Vector3::new(angle.sin() * CAMERA_RADIUS, 0.5, angle.cos() * CAMERA_RADIUS);
        camera.look_at(Vector3::new(0.0, 1.0, 0.0));
        self.stage.draw(frame);
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/ukrainian-flag",
        "THREE.js | Ukrainian Flag",
        "Ukrainian Flag",
        AppConstructor::new(|ctx| async move { anyhow::Ok(Flag::new(&ctx)) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_starts_in_its_own_colours() {
        let (upper, lower) = flag_colors(flag_angle(0.0));
        assert_eq!(upper.to_hex(), BLUE);
        assert_eq!(lower.to_hex(), YELLOW);
    }

    #[test]
    fn half_a_swing_turns_red_and_black() {
        let (upper, lower) = flag_colors(flag_angle(4096.0));
        assert_eq!(upper.to_hex(), RED);
        assert_eq!(lower.to_hex(), 0x000000);
    }
}
