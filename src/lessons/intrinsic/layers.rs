//! Two offscreen layers composed over a flat background.

use crate::{
    app::{Frame, InteractiveApp},
    camera::{OrbitControls, PerspectiveCamera},
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene::{Object, Scene},
    },
    lessons::{intrinsic::layer::SceneLayer, stage::mesh},
    math::Color,
    postprocessing::{
        EffectComposer, PassContext,
        effects::{self, NoisePass},
        layer::Layer,
    },
};

const MAIN: &str = "main";
const SECONDARY: &str = "secondary";

pub struct Layers {
    camera: PerspectiveCamera,
    controls: OrbitControls,
    main: SceneLayer,
    second: SceneLayer,
    composer: EffectComposer,
}

impl Layers {
    pub fn new(ctx: &InitContext) -> Self {
        let mut camera = PerspectiveCamera::new(75.0, ctx.aspect())
            .with_clip(0.1, 100.0)
            .at(3.0, 3.0, 3.0);
        camera.look_at(cgmath::Vector3::new(0.0, 0.0, 0.0));

        let mut main_scene = Scene::new(Color::BLACK);
        main_scene.add(Object::new(
            "box",
            mesh(ctx, &Geometry::cuboid(1.0, 1.0, 1.0), "box"),
            Material::basic(Color::from_hex(0xff0000)),
        ));
        let main = SceneLayer::new(ctx, main_scene, camera);

        let mut second_scene = Scene::new(Color::BLACK);
        second_scene.add(Object::new(
            "box edges",
            mesh(ctx, &Geometry::cuboid_edges(1.5, 1.5, 1.5), "box edges"),
            Material::basic(Color::from_hex(0x336699)),
        ));
        let mut second = SceneLayer::new(ctx, second_scene, camera);
        second.add_pass(NoisePass::new(&ctx.device, &ctx.queue, ctx.format));

        let mut composer = EffectComposer::new(&ctx.device, ctx.format, ctx.size);
        composer.add_pass(effects::compose(
            &ctx.device,
            &ctx.queue,
            ctx.format,
            MAIN,
            SECONDARY,
            Color::WHITE,
        ));

        Self {
            controls: OrbitControls::new(camera.target, ctx.size)
                .with_zoom_speed(0.5)
                .with_damping(),
            camera,
            main,
            second,
            composer,
        }
    }
}

impl InteractiveApp for Layers {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        self.controls.update(&mut self.camera);
        self.main.camera = self.camera;
        self.second.camera = self.camera;
        self.main.update(frame.encoder, frame.time)?;
        self.second.update(frame.encoder, frame.time)?;

        let targets = [(MAIN, self.main.output()), (SECONDARY, self.second.output())];
        let mut pass_ctx = PassContext::new(&ctx.device, &ctx.queue, frame.time).with_targets(&targets);
        self.composer
            .render(&mut pass_ctx, frame.encoder, Some((frame.view, frame.size)))
    }

    fn on_resize(&mut self, ctx: &InitContext, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.controls.set_viewport(width, height);
        self.main.resize(width, height);
        self.second.resize(width, height);
        self.composer.resize(&ctx.device, width, height);
    }

    fn on_window_event(&mut self, _ctx: &InitContext, event: &winit::event::WindowEvent) -> bool {
        self.controls.handle_window_event(&self.camera, event)
    }
}
