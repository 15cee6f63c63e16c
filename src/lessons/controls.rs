//! A cube shaped and spun from the parameter panel.

use std::{f32::consts::TAU, sync::Arc};

use instant::Duration;

use crate::{
    animation::{Easing, Playback, Tween},
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        mesh::Mesh,
        scene::{Object, ObjectId, Scene},
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::Color,
    params::{ParamChange, ParamValue, Params},
};

const CUBE_COLOR: u32 = 0x336699;
const SPIN: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Spins go round x, y, z, x, ...
    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::Z,
            Axis::Z => Axis::X,
        }
    }

    fn euler(self, angle: f32) -> (f32, f32, f32) {
        match self {
            Axis::X => (angle, 0.0, 0.0),
            Axis::Y => (0.0, angle, 0.0),
            Axis::Z => (0.0, 0.0, angle),
        }
    }
}

pub struct Controls {
    stage: Stage,
    device: wgpu::Device,
    cubes: [ObjectId; 2],
    params: Params,
    next_axis: Axis,
    spinning: Option<Axis>,
    spin: Playback,
}

impl Controls {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(3.0, 3.0, 3.0);
        let mut stage = Stage::new(ctx, Scene::new(Color::BLACK), camera).with_orbit(ctx);
        stage.scene.add(Object::new(
            "axes",
            mesh(ctx, &Geometry::axes(1.0), "axes"),
            Material::basic(Color::WHITE),
        ));
        let cube = mesh(ctx, &Geometry::cuboid(1.0, 1.0, 1.0), "cube");
        let colored = stage.scene.add(Object::new(
            "cube",
            cube.clone(),
            Material::basic(Color::from_hex(CUBE_COLOR)),
        ));
        let wireframe = stage.scene.add(Object::new(
            "cube wireframe",
            cube,
            Material::basic(Color::WHITE).with_wireframe(true),
        ));

        let mut params = Params::new();
        params
            .add_action("spin")
            .folder("Cube")
            .add_color("color", CUBE_COLOR)
            .add_float("width", 1.0, 0.0, 10.0, 0.1)
            .add_float("height", 1.0, 0.0, 10.0, 0.1)
            .add_float("depth", 1.0, 0.0, 10.0, 0.1)
            .folder("Scene")
            .add_bool("show_wireframe", true)
            .end_folder();

        Self {
            stage,
            device: ctx.device.clone(),
            cubes: [colored, wireframe],
            params,
            next_axis: Axis::X,
            spinning: None,
            spin: Playback::new(Tween::new(0.0, TAU, SPIN).ease(Easing::Power2InOut)),
        }
    }

    fn reshape(&mut self) {
        let size = |name: &str| self.params.get_f32(name).unwrap_or(1.0);
        let geometry = Geometry::cuboid(size("width"), size("height"), size("depth"));
        let cube = Arc::new(Mesh::new(&self.device, &geometry, "cube"));
        for id in self.cubes {
            if let Some(object) = self.stage.scene.get_mut(id) {
                object.mesh = Some(cube.clone());
            }
        }
    }

    fn rotate(&mut self, axis: Axis, angle: f32) {
        let (x, y, z) = axis.euler(angle);
        for id in self.cubes {
            if let Some(object) = self.stage.scene.get_mut(id) {
                object.transform.set_euler(x, y, z);
            }
        }
    }

    fn spin(&mut self) {
        if let Some(axis) = self.spinning {
            self.rotate(axis, 0.0);
        }
        self.spinning = Some(self.next_axis);
        self.next_axis = self.next_axis.next();
        self.spin.restart();
    }
}

impl InteractiveApp for Controls {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        if let Some(axis) = self.spinning {
            match self.spin.advance(frame.dt) {
                Some(angle) => self.rotate(axis, angle),
                None => {
                    self.rotate(axis, 0.0);
                    self.spinning = None;
                }
            }
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
            ("spin", ParamValue::Action) => self.spin(),
            ("color", ParamValue::Color(hex)) => {
                if let Some(cube) = self.stage.scene.get_mut(self.cubes[0]) {
                    cube.material.color = Color::from_hex(*hex);
                }
            }
            ("width" | "height" | "depth", ParamValue::Float(_)) => self.reshape(),
            ("show_wireframe", ParamValue::Bool(show)) => {
                if let Some(wireframe) = self.stage.scene.get_mut(self.cubes[1]) {
                    wireframe.visible = *show;
                }
            }
            _ => {}
        }
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/lil-gui-controls",
        "THREE.js | Controls via lil-gui",
        "Controls via lil-gui",
        AppConstructor::new(|ctx| async move { anyhow::Ok(Controls::new(&ctx)) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_cycle_through_the_axes() {
        let mut axis = Axis::X;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(axis);
            axis = axis.next();
        }
        assert_eq!(seen, vec![Axis::X, Axis::Y, Axis::Z, Axis::X]);
        assert_eq!(Axis::Y.euler(1.0), (0.0, 1.0, 0.0));
    }
}
