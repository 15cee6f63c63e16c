//! The door scene drawn through a postprocessing chain with an edge filter.

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    context::InitContext,
    lessons::{lesson, stage::Stage, textures::door_stage},
    params::{ParamChange, ParamValue, Params},
    postprocessing::{EffectComposer, PassContext, PassId, effects, passes::ScenePass},
    resources::texture::{DoorTextures, load_door_textures},
};

pub struct Effects {
    stage: Stage,
    composer: EffectComposer,
    sobel: PassId,
    params: Params,
}

impl Effects {
    pub fn new(ctx: &InitContext, doors: DoorTextures) -> Self {
        let (stage, _) = door_stage(ctx, &doors);
        let mut composer = EffectComposer::new(&ctx.device, ctx.format, ctx.size);
        composer.add_pass(ScenePass::new());
        let sobel = composer.add_pass(effects::sobel(&ctx.device, &ctx.queue, ctx.format));

        let mut params = Params::new();
        params.folder("Sobel").add_bool("sobel", true).end_folder();

        Self {
            stage,
            composer,
            sobel,
            params,
        }
    }
}

impl InteractiveApp for Effects {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        self.stage.update_controls();
        let mut pass_ctx = PassContext::new(&ctx.device, &ctx.queue, frame.time).with_scene(
            &mut self.stage.renderer,
            &self.stage.scene,
            &self.stage.camera,
        );
        self.composer
            .render(&mut pass_ctx, frame.encoder, Some((frame.view, frame.size)))
    }

    fn on_resize(&mut self, ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
        self.composer.resize(&ctx.device, width, height);
    }

    fn on_window_event(&mut self, _ctx: &InitContext, event: &winit::event::WindowEvent) -> bool {
        self.stage.window_event(event)
    }

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, change: &ParamChange) {
        if let ("sobel", ParamValue::Bool(on)) = (change.name.as_str(), &change.value) {
            self.composer.set_enabled(self.sobel, *on);
        }
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/lesson-32-effects",
        "THREE.js | Effects",
        "Effects",
        AppConstructor::new(|ctx| async move {
            let doors = load_door_textures(&ctx.device, &ctx.queue).await;
            anyhow::Ok(Effects::new(&ctx, doors))
        }),
    )
}
