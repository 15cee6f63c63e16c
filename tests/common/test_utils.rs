#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use scene_journey::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{Application, Layout, Module, ModuleHost, RouteError},
    context::InitContext,
    params::{ParamChange, Params},
};

/// How often each hook of a [`Recorder`] ran.
#[derive(Debug, Default)]
pub(crate) struct State {
    run_invocations: u32,
    frame_invocations: u32,
    destroy_invocations: u32,
    param_invocations: u32,
    still_invocations: u32,
    pub last_time: f64,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_invocations(&self) -> u32 {
        self.run_invocations
    }

    pub fn frame_invocations(&self) -> u32 {
        self.frame_invocations
    }

    pub fn destroy_invocations(&self) -> u32 {
        self.destroy_invocations
    }

    pub fn param_invocations(&self) -> u32 {
        self.param_invocations
    }

    pub fn still_invocations(&self) -> u32 {
        self.still_invocations
    }
}

/// An app that only counts its lifecycle calls.
pub(crate) struct Recorder {
    pub state: Arc<Mutex<State>>,
    pub fail_run: bool,
    pub animates: bool,
    params: Params,
}

impl Recorder {
    pub fn new(state: Arc<Mutex<State>>) -> Self {
        let mut params = Params::new();
        params.add_bool("flag", false);
        Self {
            state,
            fail_run: false,
            animates: true,
            params,
        }
    }

    /// Renders one still image instead of animating.
    pub fn still(state: Arc<Mutex<State>>) -> Self {
        Self {
            animates: false,
            ..Self::new(state)
        }
    }

    pub fn failing(state: Arc<Mutex<State>>) -> Self {
        Self {
            fail_run: true,
            ..Self::new(state)
        }
    }
}

impl InteractiveApp for Recorder {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        self.state.lock().unwrap().run_invocations += 1;
        if self.fail_run {
            anyhow::bail!("refusing to run");
        }
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.frame_invocations += 1;
        state.last_time = frame.time;
        Ok(())
    }

    fn destroy(&mut self) {
        self.state.lock().unwrap().destroy_invocations += 1;
    }

    fn animates(&self) -> bool {
        self.animates
    }

    fn render_still(&mut self, _ctx: &InitContext, _frame: &mut Frame<'_>) -> anyhow::Result<()> {
        self.state.lock().unwrap().still_invocations += 1;
        Ok(())
    }

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, _change: &ParamChange) {
        self.state.lock().unwrap().param_invocations += 1;
    }
}

/// Register a [`Recorder`] lesson at `path` that shares `state`.
pub(crate) fn recorder_lesson(
    host: &mut dyn ModuleHost,
    path: &str,
    label: &str,
    state: Arc<Mutex<State>>,
) -> Result<(), RouteError> {
    let module: &mut Module = host.child();
    module
        .set_path(path)?
        .set_title(label)?
        .set_element(AppConstructor::new(move |_ctx| {
            let state = state.clone();
            async move { anyhow::Ok(Recorder::new(state)) }
        }))?
        .show_in_menu("main", label, 0)?;
    Ok(())
}

/// A home layout at `/` redirecting to `default_path`; lessons go below it.
pub(crate) fn home<'a>(application: &'a mut Application, default_path: &str) -> Result<&'a mut Module, RouteError> {
    application
        .child()
        .set_path("/")?
        .set_element(Layout::new("Test Journey").with_default_path(default_path))
}

#[cfg(feature = "integration-tests")]
pub(crate) mod gpu {
    use scene_journey::{app::RunningApp, context::InitContext, data_structures::texture::RenderTarget};

    pub const WIDTH: u32 = 64;
    pub const HEIGHT: u32 = 48;

    pub fn context() -> InitContext {
        futures::executor::block_on(InitContext::headless(WIDTH, HEIGHT)).expect("headless GPU context")
    }

    pub fn target(ctx: &InitContext) -> RenderTarget {
        RenderTarget::new(&ctx.device, WIDTH, HEIGHT, ctx.format, "test target")
    }

    /// Draw `frames` frames of `app` into `target` and read the last one back.
    pub fn render(ctx: &InitContext, app: &mut RunningApp, target: &RenderTarget, frames: u32) -> image::RgbaImage {
        for _ in 0..frames {
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("test frame") });
            app.frame(ctx, &mut encoder, target.view()).expect("frame");
            ctx.queue.submit(std::iter::once(encoder.finish()));
        }
        futures::executor::block_on(target.read_rgba(&ctx.device, &ctx.queue)).expect("readback")
    }
}
