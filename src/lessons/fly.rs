//! Free flight around a cube, with orbiting as an alternative.

use winit::event::WindowEvent;

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::{FlyControls, PerspectiveCamera},
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
    params::{ParamChange, ParamValue, Params},
};

pub struct FlyControl {
    stage: Stage,
    fly: FlyControls,
    params: Params,
}

impl FlyControl {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(2.0, 2.0, 2.0);
        let mut stage = Stage::new(ctx, Scene::new(Color::BLACK), camera).with_orbit(ctx);
        if let Some(orbit) = &mut stage.controls {
            orbit.enabled = false;
        }
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
        let mut params = Params::new();
        params.add_bool("orbit", false);
        Self {
            stage,
            fly: FlyControls::new(1.0, 0.5),
            params,
        }
    }

    fn orbiting(&self) -> bool {
        self.stage.controls.as_ref().is_some_and(|orbit| orbit.enabled)
    }
}

impl InteractiveApp for FlyControl {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        log::info!("WASD to move, R/F up and down, Q/E to roll, drag to look");
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        if !self.orbiting() {
            self.fly.update(&mut self.stage.camera, frame.dt);
        }
        self.stage.draw(frame);
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
    }

    fn on_window_event(&mut self, _ctx: &InitContext, event: &WindowEvent) -> bool {
        if self.orbiting() {
            self.stage.window_event(event)
        } else {
            self.fly.handle_window_event(event)
        }
    }

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, change: &ParamChange) {
        if let ("orbit", ParamValue::Bool(on)) = (change.name.as_str(), &change.value) {
            if let Some(orbit) = &mut self.stage.controls {
                orbit.target = self.stage.camera.target;
                orbit.enabled = *on;
            }
        }
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/fly-control",
        "THREE.js | Fly Control",
        "Fly Control",
        AppConstructor::new(|ctx| async move { anyhow::Ok(FlyControl::new(&ctx)) }),
    )
}
