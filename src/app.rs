//! The interactive app lifecycle.
//!
//! Every lesson is an [`InteractiveApp`]. The shell builds one through its
//! [`AppConstructor`], starts it, feeds it animation frames and stops it when
//! the user navigates away:
//!
//! 1. `run()` is called once with the GPU handles; build scene, camera and passes here
//! 2. `on_frame()` is called for every redraw while the app is running and animates
//!    (apps that do not animate get `render_still()` instead, only when their image is stale)
//! 3. `destroy()` is called exactly once when the app is stopped or dropped
//!
//! [`RunningApp`] enforces that order through [`LifecycleState`], which knows
//! nothing about the GPU and can be tested on its own.

use std::{fmt::Debug, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::event::{DeviceEvent, WindowEvent};

use crate::{context::InitContext, params::{ParamChange, Params}};

/// Everything `on_frame` needs to draw one frame.
pub struct Frame<'a> {
    /// The surface texture (or test target) to draw into.
    pub view: &'a wgpu::TextureView,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Milliseconds since the app started running.
    pub time: f64,
    /// Time since the previous frame.
    pub dt: Duration,
    pub size: (u32, u32),
    pub format: wgpu::TextureFormat,
}

/// A self-contained demo driven by the shell.
pub trait InteractiveApp {
    /// Build GPU resources. Called once before the first frame.
    fn run(&mut self, ctx: &InitContext) -> anyhow::Result<()>;

    /// Draw one frame.
    fn on_frame(&mut self, ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()>;

    /// Release resources and listeners. Called at most once.
    fn destroy(&mut self) {}

    /// Apps that render a single still image can opt out of frame callbacks.
    /// They are drawn through [`render_still`](Self::render_still) instead.
    fn animates(&self) -> bool {
        true
    }

    /// Draw the still image of an app that does not animate. Called after
    /// `run` and again after every resize or parameter change.
    fn render_still(&mut self, _ctx: &InitContext, _frame: &mut Frame<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, _width: u32, _height: u32) {}

    /// Returns `true` when the event was consumed and should not reach the shell.
    fn on_window_event(&mut self, _ctx: &InitContext, _event: &WindowEvent) -> bool {
        false
    }

    fn on_device_event(&mut self, _ctx: &InitContext, _event: &DeviceEvent) {}

    /// The keyboard-driven parameter panel of this app, if it has one.
    fn params(&mut self) -> Option<&mut Params> {
        None
    }

    fn on_param_change(&mut self, _ctx: &InitContext, _change: &ParamChange) {}
}

// Dummy impl to make wasm work
impl Debug for dyn InteractiveApp + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("InteractiveApp")
    }
}

pub type AppFuture = Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn InteractiveApp>>>>>;

/// Shared factory for an app.
///
/// A constructor receives an [`InitContext`] and asynchronously returns a boxed
/// [`InteractiveApp`]. This allows lazy initialization and resource loading.
#[derive(Clone)]
pub struct AppConstructor(Arc<dyn Fn(InitContext) -> AppFuture>);

impl AppConstructor {
    pub fn new<A, F, Fut>(f: F) -> Self
    where
        A: InteractiveApp + 'static,
        F: Fn(InitContext) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<A>> + 'static,
    {
        Self(Arc::new(move |ctx| {
            let fut = f(ctx);
            Box::pin(async move {
                let app: Box<dyn InteractiveApp> = Box::new(fut.await?);
                Ok(app)
            })
        }))
    }

    pub fn construct(&self, ctx: InitContext) -> AppFuture {
        (self.0)(ctx)
    }
}

impl Debug for AppConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AppConstructor")
    }
}

/// `Created → Running → Destroyed`, with no way back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Created,
    Running,
    Destroyed,
}

impl LifecycleState {
    /// Move to `Running`. Only allowed once, straight from `Created`.
    pub fn begin_run(&mut self) -> bool {
        if *self == Self::Created {
            *self = Self::Running;
            true
        } else {
            false
        }
    }

    pub fn can_frame(&self) -> bool {
        *self == Self::Running
    }

    /// Move to `Destroyed`. Returns `false` when the app was already destroyed,
    /// so the destroy hook runs at most once.
    pub fn begin_destroy(&mut self) -> bool {
        if *self == Self::Destroyed {
            false
        } else {
            *self = Self::Destroyed;
            true
        }
    }
}

/// Converts wall clock instants into the `(time, dt)` pair handed to frames.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    started: Option<Instant>,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns milliseconds since the first tick and the time since the last one.
    pub fn tick(&mut self, now: Instant) -> (f64, Duration) {
        let started = *self.started.get_or_insert(now);
        let dt = match self.last {
            Some(last) => now.duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        let time = now.duration_since(started).as_secs_f64() * 1000.0;
        (time, dt)
    }

    pub fn reset(&mut self) {
        self.started = None;
        self.last = None;
    }
}

/// An app plus the bookkeeping that keeps its hooks in order.
///
/// Dropping a `RunningApp` stops it.
pub struct RunningApp {
    app: Box<dyn InteractiveApp>,
    state: LifecycleState,
    clock: FrameClock,
    still_drawn: bool,
}

impl RunningApp {
    /// Adopt a constructed app. Nothing runs until [`start_with`](Self::start_with).
    pub fn new(app: Box<dyn InteractiveApp>) -> Self {
        Self {
            app,
            state: LifecycleState::default(),
            clock: FrameClock::new(),
            still_drawn: false,
        }
    }

    /// Call `run` and start the frame clock. A failing `run` destroys the app.
    pub fn start(app: Box<dyn InteractiveApp>, ctx: &InitContext) -> anyhow::Result<Self> {
        let mut running = Self::new(app);
        running.start_with(|app| app.run(ctx))?;
        Ok(running)
    }

    /// Move to `Running` through `run`, which receives the app. When `run`
    /// fails the app is destroyed and no frames follow.
    pub fn start_with(
        &mut self,
        run: impl FnOnce(&mut dyn InteractiveApp) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        if !self.state.begin_run() {
            anyhow::bail!("app was already started or destroyed");
        }
        if let Err(e) = run(self.app.as_mut()) {
            self.stop();
            return Err(e);
        }
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the next redraw would draw anything: always for animating
    /// apps, and for still apps only until their image is up to date.
    pub fn needs_redraw(&self) -> bool {
        self.state.can_frame() && (self.app.animates() || !self.still_drawn)
    }

    /// Draw a frame into `view`. Returns whether the app produced one.
    pub fn frame(
        &mut self,
        ctx: &InitContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> anyhow::Result<bool> {
        if !self.needs_redraw() {
            return Ok(false);
        }
        let (time, dt) = self.clock.tick(Instant::now());
        let mut frame = Frame {
            view,
            encoder,
            time,
            dt,
            size: ctx.size,
            format: ctx.format,
        };
        if self.app.animates() {
            self.app.on_frame(ctx, &mut frame)?;
        } else {
            self.app.render_still(ctx, &mut frame)?;
            self.still_drawn = true;
        }
        Ok(true)
    }

    /// Cancel further frames and destroy the app. Repeated calls do nothing.
    pub fn stop(&mut self) {
        if self.state.begin_destroy() {
            self.app.destroy();
        }
    }

    pub fn resize(&mut self, ctx: &InitContext, width: u32, height: u32) {
        if self.state.can_frame() {
            self.app.on_resize(ctx, width, height);
            self.still_drawn = false;
        }
    }

    pub fn window_event(&mut self, ctx: &InitContext, event: &WindowEvent) -> bool {
        self.state.can_frame() && self.app.on_window_event(ctx, event)
    }

    pub fn device_event(&mut self, ctx: &InitContext, event: &DeviceEvent) {
        if self.state.can_frame() {
            self.app.on_device_event(ctx, event);
        }
    }

    pub fn params(&mut self) -> Option<&mut Params> {
        if self.state.can_frame() {
            self.app.params()
        } else {
            None
        }
    }

    pub fn param_changed(&mut self, ctx: &InitContext, change: &ParamChange) {
        if self.state.can_frame() {
            self.app.on_param_change(ctx, change);
            self.still_drawn = false;
        }
    }
}

impl Drop for RunningApp {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Debug for RunningApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunningApp")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_runs_once_and_destroys_once() {
        let mut state = LifecycleState::default();
        assert!(!state.can_frame());
        assert!(state.begin_run());
        assert!(!state.begin_run());
        assert!(state.can_frame());
        assert!(state.begin_destroy());
        assert!(!state.can_frame());
        assert!(!state.begin_destroy());
        assert!(!state.begin_run());
    }

    #[test]
    fn destroy_before_run_is_allowed() {
        let mut state = LifecycleState::Created;
        assert!(state.begin_destroy());
        assert_eq!(state, LifecycleState::Destroyed);
        assert!(!state.begin_run());
    }

    #[test]
    fn clock_starts_at_zero() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        let (time, dt) = clock.tick(t0);
        assert_eq!(time, 0.0);
        assert_eq!(dt, Duration::ZERO);

        let (time, dt) = clock.tick(t0 + Duration::from_millis(16));
        assert!((time - 16.0).abs() < 1e-6);
        assert_eq!(dt, Duration::from_millis(16));

        let (time, dt) = clock.tick(t0 + Duration::from_millis(50));
        assert!((time - 50.0).abs() < 1e-6);
        assert_eq!(dt, Duration::from_millis(34));

        clock.reset();
        assert_eq!(clock.tick(t0 + Duration::from_secs(3)).0, 0.0);
    }
}
