//! A scene with its own renderer and pass chain, rendered offscreen.

use crate::{
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{scene::Scene, texture::RenderTarget},
    postprocessing::{
        EffectComposer, Pass, PassContext, PassId,
        layer::Layer,
        passes::{SavePass, ScenePass},
    },
    render::SceneRenderer,
};

pub struct SceneLayer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub scene: Scene,
    /// Copied from the app camera before every update.
    pub camera: PerspectiveCamera,
    renderer: SceneRenderer,
    composer: EffectComposer,
    save: Option<PassId>,
}

impl SceneLayer {
    /// The scene is cleared to a transparent background so a later compose
    /// pass can see through it.
    pub fn new(ctx: &InitContext, mut scene: Scene, camera: PerspectiveCamera) -> Self {
        scene.background_alpha = 0.0;
        let mut composer = EffectComposer::new(&ctx.device, ctx.format, ctx.size);
        composer.render_to_screen = false;
        composer.add_pass(ScenePass::new());
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            scene,
            camera,
            renderer: SceneRenderer::new(ctx),
            composer,
            save: None,
        }
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) -> PassId {
        self.composer.add_pass(pass)
    }

    /// Keep the result in a target of its own instead of the ping-pong
    /// buffers.
    pub fn with_save(mut self, name: &str) -> Self {
        let size = self.composer.read_target().size();
        let pass = SavePass::new(&self.device, self.renderer.format(), size, name);
        self.save = Some(self.composer.add_pass(pass));
        self
    }

    pub fn composer_mut(&mut self) -> &mut EffectComposer {
        &mut self.composer
    }
}

impl Layer for SceneLayer {
    fn update(&mut self, encoder: &mut wgpu::CommandEncoder, time: f64) -> anyhow::Result<()> {
        let mut ctx =
            PassContext::new(&self.device, &self.queue, time).with_scene(&mut self.renderer, &self.scene, &self.camera);
        self.composer.render(&mut ctx, encoder, None)
    }

    fn output(&self) -> &RenderTarget {
        self.save
            .and_then(|id| self.composer.pass::<SavePass>(id))
            .map(SavePass::target)
            .unwrap_or_else(|| self.composer.read_target())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.composer.resize(&self.device, width, height);
    }
}
