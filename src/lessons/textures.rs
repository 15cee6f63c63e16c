//! The door plane with its full texture set, lit from a movable light.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Vector3};

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene::{Object, ObjectId, Scene},
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::Color,
    params::{ParamChange, ParamValue, Params},
    resources::texture::{DoorTextures, load_door_textures},
};

const SEGMENTS: u32 = 512;
const DISPLACEMENT: f32 = 0.03;
pub const LIGHT_PHI: f32 = 1.64;
pub const LIGHT_THETA: f32 = 6.28;

/// Unit vector for the polar angle `phi` from +y and azimuth `theta` around it.
pub fn spherical(phi: f32, theta: f32) -> Vector3<f32> {
    Vector3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos())
}

/// The door stage: axes, the displaced plane and both lights. Returns the
/// id of the door.
pub fn door_stage(ctx: &InitContext, doors: &DoorTextures) -> (Stage, ObjectId) {
    let position = Vector3::new(-1.0, -1.0, 1.0).normalize();
    let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(position.x, position.y, position.z);
    let mut stage = Stage::new(ctx, Scene::new(Color::BLACK), camera).with_orbit(ctx);

    stage.scene.add(Object::new(
        "axes",
        mesh(ctx, &Geometry::axes(1.0), "axes"),
        Material::basic(Color::WHITE),
    ));
    let mut geometry = Geometry::plane(1.0, 1.0, SEGMENTS, SEGMENTS).displaced(&doors.height, DISPLACEMENT);
    geometry.compute_tangents();
    let mut material = Material::standard(stage.renderer.material_textures(&doors.set));
    material.transparent = true;
    let door = stage
        .scene
        .add(Object::new("door", mesh(ctx, &geometry, "door"), material));

    stage
        .scene
        .directional_light(Color::WHITE, 1.0, spherical(LIGHT_PHI, LIGHT_THETA));
    stage.scene.ambient_light(Color::WHITE, 1.0);
    (stage, door)
}

pub struct Textures {
    stage: Stage,
    door: ObjectId,
    params: Params,
}

impl Textures {
    pub fn new(ctx: &InitContext, doors: DoorTextures) -> Self {
        let (stage, door) = door_stage(ctx, &doors);
        let mut params = Params::new();
        params
            .add_float("ao_intensity", 1.0, -1.0, 5.0, 0.001)
            .add_float("light_phi", LIGHT_PHI, 0.0, PI, 0.01)
            .add_float("light_theta", LIGHT_THETA, 0.0, TAU, 0.01);
        Self { stage, door, params }
    }

    fn move_light(&mut self) {
        let phi = self.params.get_f32("light_phi").unwrap_or(LIGHT_PHI);
        let theta = self.params.get_f32("light_theta").unwrap_or(LIGHT_THETA);
        self.stage
            .scene
            .directional_light(Color::WHITE, 1.0, spherical(phi, theta));
    }
}

impl InteractiveApp for Textures {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        self.stage.draw(frame);
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
    }

    fn on_window_event(&mut self, _ctx: &InitContext, event: &winit::event::WindowEvent) -> bool {
        self.stage.window_event(event)
    }

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, change: &ParamChange) {
        match (change.name.as_str(), &change.value) {
            ("ao_intensity", ParamValue::Float(intensity)) => {
                if let Some(door) = self.stage.scene.get_mut(self.door) {
                    door.material.params[0] = *intensity;
                }
            }
            ("light_phi" | "light_theta", ParamValue::Float(_)) => self.move_light(),
            _ => {}
        }
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/lesson-11-textures",
        "THREE.js | Textures",
        "Textures",
        AppConstructor::new(|ctx| async move {
            let doors = load_door_textures(&ctx.device, &ctx.queue).await;
            anyhow::Ok(Textures::new(&ctx, doors))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poles_and_equator() {
        let up = spherical(0.0, 1.0);
        assert!((up - Vector3::unit_y()).magnitude() < 1e-6);

        let front = spherical(PI / 2.0, 0.0);
        assert!((front - Vector3::unit_z()).magnitude() < 1e-6);

        let side = spherical(PI / 2.0, PI / 2.0);
        assert!((side - Vector3::unit_x()).magnitude() < 1e-6);
    }

    #[test]
    fn default_light_is_a_unit_vector() {
        assert!((spherical(LIGHT_PHI, LIGHT_THETA).magnitude() - 1.0).abs() < 1e-6);
    }
}
