//! The window around the lessons.
//!
//! The shell owns the winit event loop, the GPU [`Context`] and at most one
//! [`RunningApp`]. Navigating resolves a path against the route tree, stops
//! the current lesson and builds the next one. Lesson constructors are async:
//! natively they are driven to completion on a tokio runtime, on the web they
//! are spawned and report back through an event loop proxy. Every navigation
//! bumps a generation counter so a lesson that finishes loading after the user
//! already moved on is dropped instead of started.
//!
//! Keys the shell handles before the lesson sees them:
//!
//! - `Tab` / `Shift+Tab` select the next or previous parameter
//! - `←` / `→` adjust the selected parameter
//! - `Enter` toggles or triggers it
//! - `PageDown` / `PageUp` open the next or previous lesson of the menu
//! - `Escape` quits (natively)

use std::{iter, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    keyboard::{Key, ModifiersState, NamedKey},
    window::{Window, WindowId},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use crate::{
    app::{AppConstructor, InteractiveApp, RunningApp},
    architecture::{
        Application, MenuState, ModuleHost, RouteMatch, RouteTree,
        route::normalize,
    },
    config::ShellConfig,
    context::{Context, InitContext},
};

const MAX_REDIRECTS: usize = 8;

/// The outcome of resolving a location.
#[derive(Debug)]
pub enum Navigation {
    Start {
        path: String,
        title: Option<String>,
        heading: Option<String>,
        constructor: AppConstructor,
        generation: u64,
    },
    Layout {
        path: String,
        heading: String,
    },
    NotFound(String),
}

/// Route resolution and menu selection, without any window.
#[derive(Debug)]
pub struct Navigator {
    routes: RouteTree,
    menu: MenuState,
    default_route: String,
    generation: u64,
    current: Option<String>,
}

impl Navigator {
    pub fn new(application: &Application, config: &ShellConfig) -> Self {
        Self {
            routes: application.routes(),
            menu: MenuState::new(application.menu_items(&config.menu)),
            default_route: normalize(&config.default_route),
            generation: 0,
            current: None,
        }
    }

    pub fn menu(&self) -> &MenuState {
        &self.menu
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a lesson built for `generation` is still the one to show.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Resolve `location`, following redirects. Unknown locations fall back
    /// to the default route once.
    pub fn navigate(&mut self, location: &str) -> Navigation {
        self.generation += 1;
        let mut location = normalize(location);
        for _ in 0..MAX_REDIRECTS {
            match self.routes.resolve(&location) {
                Ok(RouteMatch::Redirect { from, to }) => {
                    log::info!("redirecting {} to {}", from, to);
                    location = to;
                }
                Ok(RouteMatch::App {
                    path,
                    title,
                    heading,
                    constructor,
                }) => {
                    self.select(&path);
                    return Navigation::Start {
                        path,
                        title,
                        heading,
                        constructor,
                        generation: self.generation,
                    };
                }
                Ok(RouteMatch::Layout { path, layout }) => {
                    self.select(&path);
                    return Navigation::Layout {
                        path,
                        heading: layout.heading,
                    };
                }
                Err(e) if location != self.default_route => {
                    log::warn!("{}, showing {} instead", e, self.default_route);
                    location = self.default_route.clone();
                }
                Err(e) => {
                    log::warn!("{}", e);
                    self.current = None;
                    return Navigation::NotFound(location);
                }
            }
        }
        log::warn!("too many redirects at {}", location);
        Navigation::NotFound(location)
    }

    fn select(&mut self, path: &str) {
        self.current = Some(path.to_string());
        self.menu.select_path(path);
    }

    /// Path of the menu entry after the current one.
    pub fn next_path(&mut self) -> Option<String> {
        self.menu.next().map(|item| item.path.clone())
    }

    pub fn prev_path(&mut self) -> Option<String> {
        self.menu.prev().map(|item| item.path.clone())
    }
}

/// What a key press asks the shell to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    NextParam,
    PrevParam,
    Adjust(i32),
    Activate,
    NextLesson,
    PrevLesson,
    Quit,
}

pub fn command_for(key: &Key, shift: bool) -> Option<ShellCommand> {
    match key {
        Key::Named(NamedKey::Tab) if shift => Some(ShellCommand::PrevParam),
        Key::Named(NamedKey::Tab) => Some(ShellCommand::NextParam),
        Key::Named(NamedKey::ArrowLeft) => Some(ShellCommand::Adjust(-1)),
        Key::Named(NamedKey::ArrowRight) => Some(ShellCommand::Adjust(1)),
        Key::Named(NamedKey::Enter) => Some(ShellCommand::Activate),
        Key::Named(NamedKey::PageDown) => Some(ShellCommand::NextLesson),
        Key::Named(NamedKey::PageUp) => Some(ShellCommand::PrevLesson),
        Key::Named(NamedKey::Escape) => Some(ShellCommand::Quit),
        _ => None,
    }
}

pub fn window_title(base: &str, lesson: Option<&str>, params: Option<&str>) -> String {
    [Some(base), lesson, params]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" | ")
}

pub enum ShellEvent {
    /// The GPU context finished setting up (web only).
    #[allow(dead_code)]
    Ready(Context),
    /// A lesson constructor resolved.
    #[allow(dead_code)]
    Built {
        generation: u64,
        result: anyhow::Result<Box<dyn InteractiveApp>>,
    },
}

impl std::fmt::Debug for ShellEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("Ready"),
            Self::Built { generation, .. } => f.debug_struct("Built").field("generation", generation).finish(),
        }
    }
}

pub struct Shell {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: EventLoopProxy<ShellEvent>,
    config: ShellConfig,
    navigator: Navigator,
    ctx: Option<Context>,
    app: Option<RunningApp>,
    window_requested: bool,
    /// Where to go once the context is ready.
    pending: Option<String>,
    lesson_title: Option<String>,
    modifiers: ModifiersState,
}

impl Shell {
    fn new(
        event_loop: &EventLoop<ShellEvent>,
        application: &Application,
        config: ShellConfig,
        route: String,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            navigator: Navigator::new(application, &config),
            config,
            ctx: None,
            app: None,
            window_requested: false,
            pending: Some(route),
            lesson_title: None,
            modifiers: ModifiersState::default(),
        })
    }

    fn on_ready(&mut self, ctx: Context) {
        ctx.configure();
        ctx.window().request_redraw();
        self.ctx = Some(ctx);
        let route = self.pending.take().unwrap_or_else(|| self.config.default_route.clone());
        self.navigate(&route);
    }

    fn navigate(&mut self, location: &str) {
        if let Some(mut app) = self.app.take() {
            app.stop();
        }
        let Some(ctx) = &self.ctx else {
            self.pending = Some(location.to_string());
            return;
        };
        match self.navigator.navigate(location) {
            Navigation::Start {
                path,
                title,
                heading,
                constructor,
                generation,
            } => {
                log::info!("opening {} ({})", path, title.as_deref().unwrap_or("untitled"));
                self.lesson_title = title.or(heading);
                #[cfg(target_arch = "wasm32")]
                set_location_hash(&path);

                let future = constructor.construct(ctx.into());
                #[cfg(not(target_arch = "wasm32"))]
                {
                    let result = self.async_runtime.block_on(future);
                    self.start_app(generation, result);
                }
                #[cfg(target_arch = "wasm32")]
                {
                    let proxy = self.proxy.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = future.await;
                        if proxy.send_event(ShellEvent::Built { generation, result }).is_err() {
                            log::warn!("event loop closed before a lesson finished loading");
                        }
                    });
                }
            }
            Navigation::Layout { path, heading } => {
                log::info!("showing layout {}", path);
                self.lesson_title = Some(heading);
            }
            Navigation::NotFound(path) => {
                log::warn!("nothing to show at {}", path);
                self.lesson_title = None;
            }
        }
        self.update_title();
    }

    fn start_app(&mut self, generation: u64, result: anyhow::Result<Box<dyn InteractiveApp>>) {
        if !self.navigator.is_current(generation) {
            log::info!("discarding a lesson that finished loading after navigation");
            return;
        }
        let Some(ctx) = &self.ctx else {
            return;
        };
        let init = InitContext::from(ctx);
        match result.and_then(|app| RunningApp::start(app, &init)) {
            Ok(app) => self.app = Some(app),
            Err(e) => log::error!("lesson failed to start: {:#}", e),
        }
        self.request_redraw();
        self.update_title();
    }

    fn update_title(&mut self) {
        let summary = self
            .app
            .as_mut()
            .and_then(|app| app.params())
            .and_then(|params| params.summary());
        let title = window_title(&self.config.title, self.lesson_title.as_deref(), summary.as_deref());
        if let Some(ctx) = &self.ctx {
            ctx.window().set_title(&title);
        }
    }

    fn command(&mut self, event_loop: &ActiveEventLoop, command: ShellCommand) {
        match command {
            ShellCommand::NextLesson => {
                if let Some(path) = self.navigator.next_path() {
                    self.navigate(&path);
                }
            }
            ShellCommand::PrevLesson => {
                if let Some(path) = self.navigator.prev_path() {
                    self.navigate(&path);
                }
            }
            ShellCommand::Quit => {
                if cfg!(not(target_arch = "wasm32")) {
                    event_loop.exit();
                }
            }
            _ => self.param_command(command),
        }
    }

    fn param_command(&mut self, command: ShellCommand) {
        let (Some(ctx), Some(app)) = (&self.ctx, self.app.as_mut()) else {
            return;
        };
        let Some(params) = app.params() else {
            return;
        };
        let change = match command {
            ShellCommand::NextParam => {
                params.select_next();
                None
            }
            ShellCommand::PrevParam => {
                params.select_prev();
                None
            }
            ShellCommand::Adjust(direction) => params.adjust(direction),
            ShellCommand::Activate => params.activate(),
            _ => None,
        };
        if let Some(change) = change {
            log::debug!("{:?}", change);
            app.param_changed(&ctx.into(), &change);
        }
        self.request_redraw();
        self.update_title();
    }

    /// Whether another redraw should be scheduled. A still app that is up to
    /// date keeps its last presented image.
    fn wants_redraw(&self) -> bool {
        self.app.as_ref().is_none_or(RunningApp::needs_redraw)
    }

    fn redraw(&mut self) {
        if !self.wants_redraw() {
            return;
        }
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        let output = match ctx.surface.get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = ctx.window().inner_size();
                if !ctx.resize(size.width, size.height) {
                    ctx.configure();
                }
                return;
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        let init = InitContext::from(&*ctx);
        let drawn = match self.app.as_mut().map(|app| app.frame(&init, &mut encoder, &view)) {
            Some(Ok(drawn)) => drawn,
            Some(Err(e)) => {
                log::error!("frame failed: {:#}", e);
                false
            }
            None => false,
        };
        if !drawn {
            clear(&mut encoder, &view, ctx.clear_colour);
        }
        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        self.request_redraw();
    }

    fn request_redraw(&self) {
        if let Some(ctx) = &self.ctx {
            if self.wants_redraw() {
                ctx.window().request_redraw();
            }
        }
    }
}

fn clear(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, colour: wgpu::Color) {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Clear Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(colour),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
}

#[cfg(target_arch = "wasm32")]
fn set_location_hash(path: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Ok(history) = window.history() {
        let url = format!("#{}", path);
        if history.replace_state_with_url(&JsValue::NULL, "", Some(&url)).is_err() {
            log::warn!("could not update the location hash");
        }
    }
}

/// The route in the location hash, e.g. `#/geometry`.
#[cfg(target_arch = "wasm32")]
pub fn location_route() -> Option<String> {
    let hash = web_sys::window()?.location().hash().ok()?;
    let route = hash.trim_start_matches('#');
    (!route.is_empty()).then(|| route.to_string())
}

impl ApplicationHandler<ShellEvent> for Shell {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_requested {
            return;
        }
        self.window_requested = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(self.config.width, self.config.height));

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };
        let init_future = Context::new(window, self.config.vsync);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(ctx) => self.on_ready(ctx),
                Err(e) => {
                    log::error!("could not set up the GPU: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok(ctx) => {
                        if proxy.send_event(ShellEvent::Ready(ctx)).is_err() {
                            log::error!("event loop closed during GPU setup");
                        }
                    }
                    Err(e) => log::error!("could not set up the GPU: {:#}", e),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ShellEvent) {
        match event {
            ShellEvent::Ready(ctx) => {
                // The canvas may have been resized while the GPU was set up
                let mut ctx = ctx;
                let size = ctx.window().inner_size();
                ctx.resize(size.width, size.height);
                self.on_ready(ctx);
            }
            ShellEvent::Built { generation, result } => self.start_app(generation, result),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let (Some(ctx), Some(app)) = (&self.ctx, self.app.as_mut()) {
            app.device_event(&ctx.into(), &event);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::ModifiersChanged(modifiers) = &event {
            self.modifiers = modifiers.state();
        }
        if let WindowEvent::KeyboardInput {
            event: KeyEvent {
                logical_key,
                state: ElementState::Pressed,
                ..
            },
            ..
        } = &event
        {
            if let Some(command) = command_for(logical_key, self.modifiers.shift_key()) {
                self.command(event_loop, command);
                return;
            }
        }

        if let (Some(ctx), Some(app)) = (&self.ctx, self.app.as_mut()) {
            if app.window_event(&ctx.into(), &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(mut app) = self.app.take() {
                    app.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ctx) = self.ctx.as_mut() {
                    if ctx.resize(size.width, size.height) {
                        let init = InitContext::from(&*ctx);
                        if let Some(app) = self.app.as_mut() {
                            app.resize(&init, size.width, size.height);
                        }
                    }
                }
                self.request_redraw();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Open the window on `route` (or the configured default) and run until it closes.
pub fn run(application: Application, config: ShellConfig, route: Option<String>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
        crate::resources::set_assets_dir(&config.assets_dir);
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<ShellEvent> = EventLoop::with_user_event().build()?;
    let route = route.unwrap_or_else(|| config.default_route.clone());
    let mut shell = Shell::new(&event_loop, &application, config, route)?;

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run_app(&mut shell)?;
    }

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(shell);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::{Layout, Module, RouteError};

    struct Idle;

    impl InteractiveApp for Idle {
        fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
            Ok(())
        }

        fn on_frame(&mut self, _ctx: &InitContext, _frame: &mut crate::app::Frame<'_>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn lesson(host: &mut dyn ModuleHost, path: &str, label: &str) -> Result<(), RouteError> {
        let module: &mut Module = host.child();
        module
            .set_path(path)?
            .set_title(label)?
            .set_element(AppConstructor::new(|_ctx| async { Ok(Idle) }))?
            .show_in_menu("main", label, 0)?;
        Ok(())
    }

    fn navigator() -> Navigator {
        let mut application = Application::new("/");
        let home = application.child();
        home.set_path("/")
            .unwrap()
            .set_element(Layout::new("Journey").with_default_path("/a"))
            .unwrap();
        lesson(home, "/a", "A").unwrap();
        lesson(home, "/b", "B").unwrap();
        let config = ShellConfig {
            default_route: "/a".into(),
            ..Default::default()
        };
        Navigator::new(&application, &config)
    }

    #[test]
    fn root_redirects_to_the_default_lesson() {
        let mut nav = navigator();
        match nav.navigate("/") {
            Navigation::Start { path, title, heading, .. } => {
                assert_eq!(path, "/a");
                assert_eq!(title.as_deref(), Some("A"));
                assert_eq!(heading.as_deref(), Some("Journey"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(nav.current(), Some("/a"));
        assert_eq!(nav.menu().selected_index(), Some(0));
    }

    #[test]
    fn unknown_routes_fall_back_to_the_default() {
        let mut nav = navigator();
        assert!(matches!(nav.navigate("/missing"), Navigation::Start { ref path, .. } if path == "/a"));
    }

    #[test]
    fn stale_generations_are_rejected() {
        let mut nav = navigator();
        let first = match nav.navigate("/a") {
            Navigation::Start { generation, .. } => generation,
            other => panic!("unexpected {:?}", other),
        };
        nav.navigate("/b");
        assert!(!nav.is_current(first));
        assert!(nav.is_current(nav.generation()));
    }

    #[test]
    fn menu_cycles_through_lessons() {
        let mut nav = navigator();
        nav.navigate("/a");
        assert_eq!(nav.next_path().as_deref(), Some("/b"));
        assert_eq!(nav.next_path().as_deref(), Some("/a"));
        assert_eq!(nav.prev_path().as_deref(), Some("/b"));
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(command_for(&Key::Named(NamedKey::Tab), false), Some(ShellCommand::NextParam));
        assert_eq!(command_for(&Key::Named(NamedKey::Tab), true), Some(ShellCommand::PrevParam));
        assert_eq!(command_for(&Key::Named(NamedKey::ArrowLeft), false), Some(ShellCommand::Adjust(-1)));
        assert_eq!(command_for(&Key::Named(NamedKey::PageDown), false), Some(ShellCommand::NextLesson));
        assert_eq!(command_for(&Key::Character("w".into()), false), None);
    }

    #[test]
    fn title_skips_missing_parts() {
        assert_eq!(window_title("Journey", None, None), "Journey");
        assert_eq!(
            window_title("Journey", Some("Intrinsic"), Some("[1/2] time: 0.000")),
            "Journey | Intrinsic | [1/2] time: 0.000"
        );
    }
}
