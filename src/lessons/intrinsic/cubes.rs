//! Edge-drawn cubes riding a closed spline.

use std::sync::Arc;

use cgmath::Vector3;
use instant::Duration;

use crate::{
    animation::{Easing, Playback, Tween},
    app::{Frame, InteractiveApp},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        mesh::Mesh,
        scene::{Object, ObjectId, Scene},
        transform::Transform,
    },
    lessons::stage::{Stage, mesh},
    math::{CatmullRomCurve3, Color, Curve},
    params::{ParamChange, ParamValue, Params},
};

const BACKGROUND: u32 = 0xd9d9d9;
const CUBE_SIZE: f32 = 0.2;
const DEFAULT_CUBES: usize = 20;
const MAX_CUBES: usize = 50;
const PLAY_DURATION: Duration = Duration::from_secs(10);

/// Curve parameter of cube `index` out of `count`, shifted by `time` and
/// wrapped back into `[0, 1]`.
pub fn curve_ratio(count: usize, index: usize, time: f32) -> f32 {
    let mut actual = index as f32 / count.max(1) as f32 + time;
    while actual > 1.0 {
        actual -= 1.0;
    }
    actual
}

fn path() -> CatmullRomCurve3 {
    CatmullRomCurve3::new(
        vec![
            Vector3::new(-0.5, 0.0, 0.0),
            Vector3::new(-0.5, 0.5, -0.5),
            Vector3::new(0.5, -0.5, 0.5),
            Vector3::new(0.5, 0.0, 1.0),
        ],
        true,
    )
}

pub struct Cubes {
    stage: Stage,
    curve: CatmullRomCurve3,
    edges: Arc<Mesh>,
    fill: Arc<Mesh>,
    cubes: Vec<ObjectId>,
    params: Params,
    playback: Playback,
}

impl Cubes {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(0.0, 0.0, 2.0);
        let stage = Stage::new(ctx, Scene::new(Color::from_hex(BACKGROUND)), camera).with_orbit(ctx);

        let mut params = Params::new();
        params
            .add_float("cubes_number", DEFAULT_CUBES as f32, 1.0, MAX_CUBES as f32, 1.0)
            .add_float("animation_time", 0.0, 0.0, 1.0, 0.001)
            .add_action("play");

        let mut cubes = Self {
            stage,
            curve: path(),
            edges: mesh(ctx, &Geometry::cuboid_edges(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE), "cube edges"),
            // slightly inset so the edges win the depth test
            fill: mesh(ctx, &Geometry::cuboid(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE).scaled(0.99), "cube fill"),
            cubes: Vec::new(),
            params,
            playback: Playback::new(Tween::new(0.0, 1.0, PLAY_DURATION).ease(Easing::Power2InOut)),
        };
        cubes.rebuild(DEFAULT_CUBES);
        cubes
    }

    fn time(&self) -> f32 {
        self.params.get_f32("animation_time").unwrap_or(0.0)
    }

    fn rebuild(&mut self, count: usize) {
        for id in self.cubes.drain(..) {
            self.stage.scene.remove(id);
        }
        let fill = Material::basic(Color::from_hex(BACKGROUND));
        for i in 0..count {
            let cube = self.stage.scene.add(Object::new(
                &format!("cube {}", i),
                self.edges.clone(),
                Material::basic(Color::BLACK),
            ));
            self.stage
                .scene
                .add_child(cube, Object::new("cube fill", self.fill.clone(), fill.clone()));
            self.cubes.push(cube);
        }
        log::debug!("placed {} cubes", count);
        self.place(self.time());
    }

    fn place(&mut self, time: f32) {
        let count = self.cubes.len();
        for (i, id) in self.cubes.iter().enumerate() {
            let Some(cube) = self.stage.scene.get_mut(*id) else {
                continue;
            };
            let t = curve_ratio(count, i, time);
            let mut transform = Transform::new();
            transform.position = self.curve.point(t);
            transform.look_at(self.curve.tangent(t), Vector3::unit_y());
            cube.transform = transform;
        }
    }
}

impl InteractiveApp for Cubes {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        log::info!("{} cubes along a closed spline", self.cubes.len());
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        if let Some(time) = self.playback.advance(frame.dt) {
            self.params.set_f32("animation_time", time);
            self.place(time);
        }
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
            ("cubes_number", ParamValue::Float(count)) => self.rebuild(*count as usize),
            ("animation_time", ParamValue::Float(time)) => {
                self.playback.pause();
                self.place(*time);
            }
            ("play", ParamValue::Action) => self.playback.restart(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn ratios_wrap_past_the_end() {
        assert_eq!(curve_ratio(4, 0, 0.0), 0.0);
        assert_eq!(curve_ratio(4, 2, 0.0), 0.5);
        assert!((curve_ratio(4, 3, 0.5) - 0.25).abs() < 1e-6);
        assert_eq!(curve_ratio(4, 0, 1.0), 1.0);
    }

    #[test]
    fn the_path_is_closed() {
        let curve = path();
        let start = curve.point(0.0);
        let end = curve.point(1.0);
        assert!((start - end).magnitude2() < 1e-6);
    }
}
