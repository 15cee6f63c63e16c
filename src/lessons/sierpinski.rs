//! A Sierpinski triangle breathing between subdivision levels.

use std::sync::Arc;

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::{Geometry, sierpinski_level},
        material::{Material, Side},
        mesh::Mesh,
        scene::{Object, ObjectId, Scene},
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::Color,
};

pub struct Sierpinski {
    stage: Stage,
    device: wgpu::Device,
    level: u32,
    wireframe: ObjectId,
    fill: ObjectId,
}

impl Sierpinski {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(0.0, 0.0, 3.0);
        let mut stage = Stage::new(ctx, Scene::new(Color::BLACK), camera).with_orbit(ctx);
        stage.scene.add(Object::new(
            "axes",
            mesh(ctx, &Geometry::axes(1.0), "axes"),
            Material::basic(Color::WHITE),
        ));
        let level = sierpinski_level(0.0);
        let triangle = mesh(ctx, &Geometry::sierpinski(level), "sierpinski");
        let wireframe = stage.scene.add(Object::new(
            "sierpinski wireframe",
            triangle.clone(),
            Material::basic(Color::WHITE).with_wireframe(true),
        ));
        let fill = stage.scene.add(Object::new(
            "sierpinski",
            triangle,
            Material::basic(Color::from_hex(0x336699)).with_side(Side::Double),
        ));
        Self {
            stage,
            device: ctx.device.clone(),
            level,
            wireframe,
            fill,
        }
    }

    fn set_level(&mut self, level: u32) {
        let triangle = Arc::new(Mesh::new(&self.device, &Geometry::sierpinski(level), "sierpinski"));
        for id in [self.wireframe, self.fill] {
            if let Some(object) = self.stage.scene.get_mut(id) {
                object.mesh = Some(triangle.clone());
            }
        }
        log::debug!("sierpinski level {}", level);
        self.level = level;
    }
}

impl InteractiveApp for Sierpinski {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let level = sierpinski_level(frame.time);
        if level != self.level {
            self.set_level(level);
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
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/geometry",
        "THREE.js | Serpinski Triangle",
        "Serpinski Triangle",
        AppConstructor::new(|ctx| async move { anyhow::Ok(Sierpinski::new(&ctx)) }),
    )
}
