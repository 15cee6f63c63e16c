//! A wire figure travelling along a wavy loop, with a glowing trail of
//! copies drawn on a second layer.

use std::{f32::consts::TAU, sync::Arc};

use cgmath::{InnerSpace, Matrix3, Quaternion, Vector3};
use instant::Duration;

use crate::{
    animation::{Easing, Playback, Tween},
    app::{Frame, InteractiveApp},
    camera::{OrbitControls, PerspectiveCamera},
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::{Material, Side},
        mesh::Mesh,
        scene::{Object, ObjectId, Scene},
        transform::Transform,
    },
    lessons::{intrinsic::layer::SceneLayer, stage::mesh},
    math::{Color, Curve, EllipseCurve, item_ratio},
    params::{ParamChange, ParamValue, Params},
    postprocessing::{
        EffectComposer, PassContext, PassId,
        effects::{self, BloomPass},
        layer::Layer,
        passes::ShaderPass,
    },
};

const MAIN: &str = "main";
const SECONDARY: &str = "secondary";
const BACKGROUND: u32 = 0xeaeaea;
const START_COLOR: u32 = 0x00eeff;
const END_COLOR: u32 = 0x61ff4d;
const ELEMENTS: usize = 64;
const DEFAULT_DURATION: f32 = 10.0;
const DISAPPEAR: f32 = 0.01;

const EDGE1: f32 = 1.0;
const EDGE2: f32 = 1.2;
const EDGE3: f32 = 1.8;
const EDGE4: f32 = 3.7;
const CAPSULE_RADIUS: f32 = 0.03;

/// Fade in quadratically, then drop out over the last hundredth.
pub fn opacity(progress: f32) -> f32 {
    if progress <= 1.0 - DISAPPEAR {
        (progress / (1.0 - DISAPPEAR)).powi(2)
    } else {
        (1.0 - progress) / DISAPPEAR
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSettings {
    pub start: Color,
    pub end: Color,
    pub max_scale: f32,
    pub color_power: f32,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            start: Color::from_hex(START_COLOR),
            end: Color::from_hex(END_COLOR),
            max_scale: 1.5,
            color_power: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementState {
    pub scale: f32,
    pub opacity: f32,
    pub color: Color,
}

/// Look of the trail element sitting at `ratio` when the figure is at
/// `time`. Elements the figure already passed are hidden.
pub fn element_state(time: f32, ratio: f32, settings: &TrailSettings) -> Option<ElementState> {
    if time >= ratio {
        return None;
    }
    let progress = 1.0 - (ratio - time) / ratio;
    Some(ElementState {
        scale: 1.0 + (1.0 - progress) * settings.max_scale,
        opacity: opacity(progress),
        color: settings
            .start
            .lerp(settings.end, ratio)
            .lerp(Color::WHITE, progress.powf(settings.color_power)),
    })
}

/// Two boxes joined by a slanted roof, every edge a capsule.
pub fn figure() -> Geometry {
    let (e4z, e4y) = ((TAU / 8.0).cos() * EDGE4, -(TAU / 8.0).sin() * EDGE4);
    let p = Vector3::new;
    let a = p(0.0, EDGE2, 0.0);
    let b = p(EDGE1, EDGE2, 0.0);
    let c = p(EDGE1, 0.0, 0.0);
    let d = p(0.0, 0.0, 0.0);
    let e = p(0.0, EDGE2, EDGE3);
    let f = p(EDGE1, EDGE2, EDGE3);
    let g = p(EDGE1, 0.0, EDGE3);
    let h = p(0.0, 0.0, EDGE3);
    let i = p(0.0, EDGE2 + e4y, EDGE3 + e4z);
    let j = p(EDGE1, EDGE2 + e4y, EDGE3 + e4z);
    let k = p(EDGE1, e4y, EDGE3 + e4z);
    let l = p(0.0, e4y, EDGE3 + e4z);
    let edges = [
        (a, b),
        (b, c),
        (c, d),
        (d, a),
        (a, e),
        (e, f),
        (f, b),
        (c, g),
        (g, f),
        (g, h),
        (d, h),
        (h, e),
        (e, i),
        (i, j),
        (j, f),
        (g, k),
        (k, j),
        (i, l),
        (l, h),
        (l, k),
    ];
    let capsules = edges.into_iter().map(|(from, to)| {
        let along = to - from;
        let rotation = Quaternion::from_arc(Vector3::unit_y(), along.normalize(), None);
        Geometry::capsule(CAPSULE_RADIUS, along.magnitude(), 1, 5)
            .rotated(Matrix3::from(rotation))
            .translated((from + to) / 2.0)
    });
    Geometry::default().merge(capsules).centered()
}

fn path() -> EllipseCurve {
    EllipseCurve::new(1.0, 1.0, 1.0, 1.0, 0.0, TAU, true)
}

/// Position on the loop at `progress`, bobbing up and down once per lap,
/// and the point to face.
pub fn placement(path: &EllipseCurve, progress: f32) -> (Vector3<f32>, Vector3<f32>) {
    let point = path.point_at(progress) * 0.1;
    let tangent = path.tangent_at(progress);
    (
        Vector3::new(point.x, (progress * TAU).sin(), point.y),
        Vector3::new(tangent.x, 0.0, tangent.y),
    )
}

fn place(transform: &mut Transform, path: &EllipseCurve, progress: f32) {
    let (position, target) = placement(path, progress);
    transform.position = position;
    transform.look_at(target, Vector3::unit_y());
}

pub struct Shape {
    camera: PerspectiveCamera,
    controls: OrbitControls,
    path: EllipseCurve,
    figure: Arc<Mesh>,
    main: SceneLayer,
    main_figure: ObjectId,
    second: SceneLayer,
    elements: Vec<ObjectId>,
    bloom: PassId,
    composer: EffectComposer,
    compose: PassId,
    params: Params,
    playback: Playback,
}

impl Shape {
    pub fn new(ctx: &InitContext) -> Self {
        let mut camera = PerspectiveCamera::new(75.0, ctx.aspect())
            .with_clip(0.1, 100.0)
            .at(4.578737, -0.894058, -0.457180);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        let figure = mesh(ctx, &figure(), "figure");

        let mut main_scene = Scene::new(Color::WHITE);
        let main_figure = main_scene.add(
            Object::new("figure", figure.clone(), Material::basic(Color::WHITE))
                .with_transform(Transform::from_position(1.0, 0.0, 1.0)),
        );
        let main = SceneLayer::new(ctx, main_scene, camera).with_save(MAIN);

        let trail = TrailSettings::default();
        let mut second = SceneLayer::new(ctx, Scene::new(Color::BLACK), camera);
        let bloom = second.add_pass(BloomPass::new(&ctx.device, &ctx.queue, ctx.format, ctx.size, 1.0, 25, 4.0));

        let mut composer = EffectComposer::new(&ctx.device, ctx.format, ctx.size);
        let compose = composer.add_pass(effects::compose(
            &ctx.device,
            &ctx.queue,
            ctx.format,
            MAIN,
            SECONDARY,
            Color::from_hex(BACKGROUND),
        ));

        let mut params = Params::new();
        params
            .folder("Animation")
            .add_action("play")
            .add_action("stop")
            .add_bool("yoyo", false)
            .add_float("time", 0.0, 0.0, 1.0, 0.001)
            .add_float("duration", DEFAULT_DURATION, 0.1, 20.0, 0.1)
            .end_folder()
            .add_color("bg_color", BACKGROUND)
            .folder("Second Layer")
            .add_color("start_color", START_COLOR)
            .add_color("end_color", END_COLOR)
            .add_float("color_power", trail.color_power, 1.0, 10.0, 1.0)
            .add_float("max_scale", trail.max_scale, 1.0, 10.0, 0.01)
            .add_float("elements", ELEMENTS as f32, 0.0, 100.0, 1.0)
            .add_bool("blur_enabled", true)
            .add_float("blur_strength", 1.0, 0.0, 2.0, 0.01)
            .add_float("blur_kernel_size", 25.0, 1.0, 100.0, 1.0)
            .add_float("blur_sigma", 4.0, 0.05, 10.0, 0.05)
            .end_folder();

        let mut shape = Self {
            controls: OrbitControls::new(camera.target, ctx.size)
                .with_zoom_speed(0.5)
                .with_damping(),
            camera,
            path: path(),
            figure,
            main,
            main_figure,
            second,
            elements: Vec::new(),
            bloom,
            composer,
            compose,
            params,
            playback: Playback::new(Tween::new(0.0, 1.0, Duration::from_secs_f32(DEFAULT_DURATION))),
        };
        shape.refresh(0.0);
        shape
    }

    fn trail(&self) -> TrailSettings {
        let defaults = TrailSettings::default();
        let color = |name: &str, fallback: Color| self.params.get_color(name).map(Color::from_hex).unwrap_or(fallback);
        TrailSettings {
            start: color("start_color", defaults.start),
            end: color("end_color", defaults.end),
            max_scale: self.params.get_f32("max_scale").unwrap_or(defaults.max_scale),
            color_power: self.params.get_f32("color_power").unwrap_or(defaults.color_power),
        }
    }

    fn tween(&self) -> Tween {
        let duration = self.params.get_f32("duration").unwrap_or(DEFAULT_DURATION).max(0.1);
        Tween::new(0.0, 1.0, Duration::from_secs_f32(duration))
            .ease(Easing::Linear)
            .repeat(None)
            .yoyo(self.params.get_bool("yoyo").unwrap_or(false))
    }

    fn play(&mut self) {
        let tween = self.tween();
        self.playback.replace(tween);
    }

    /// Place the figure and bring the trail up to date with `time`.
    fn refresh(&mut self, time: f32) {
        if let Some(figure) = self.main.scene.get_mut(self.main_figure) {
            place(&mut figure.transform, &self.path, time);
        }

        let count = self.params.get_f32("elements").unwrap_or(ELEMENTS as f32) as usize;
        if count != self.elements.len() {
            for id in self.elements.drain(..) {
                self.second.scene.remove(id);
            }
            let material = Material::basic(Color::BLACK).with_side(Side::Double).with_opacity(0.0);
            for i in 0..count {
                let mut element = Object::new(&format!("trail {}", i), self.figure.clone(), material.clone());
                place(&mut element.transform, &self.path, item_ratio(count, i));
                self.elements.push(self.second.scene.add(element));
            }
            log::debug!("trail rebuilt with {} elements", count);
        }

        let trail = self.trail();
        for (i, id) in self.elements.iter().enumerate() {
            let Some(element) = self.second.scene.get_mut(*id) else {
                continue;
            };
            let state = element_state(time, item_ratio(count, i), &trail);
            element.visible = state.is_some();
            if let Some(state) = state {
                element.transform.scale = Vector3::new(state.scale, state.scale, state.scale);
                element.material.opacity = state.opacity;
                element.material.color = state.color;
            }
        }
    }

    fn set_background(&mut self, hex: u32) {
        if let Some(compose) = self.composer.pass_mut::<ShaderPass>(self.compose) {
            compose.params[0] = effects::background_param(Color::from_hex(hex));
        }
    }

    fn bloom_pass(&mut self) -> Option<&mut BloomPass> {
        self.second.composer_mut().pass_mut::<BloomPass>(self.bloom)
    }

    fn reset_blur(&mut self) {
        let sigma = self.params.get_f32("blur_sigma").unwrap_or(4.0);
        let kernel = self.params.get_f32("blur_kernel_size").unwrap_or(25.0) as usize;
        if let Some(bloom) = self.bloom_pass() {
            bloom.set_sigma(sigma, kernel);
        }
    }
}

impl InteractiveApp for Shape {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        self.play();
        log::info!("figure and trail of {} elements", self.elements.len());
        Ok(())
    }

    fn on_frame(&mut self, ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        if let Some(time) = self.playback.advance(frame.dt) {
            self.params.set_f32("time", time);
        }
        self.refresh(self.params.get_f32("time").unwrap_or(0.0));

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

    fn destroy(&mut self) {
        self.playback.pause();
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

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, change: &ParamChange) {
        match (change.name.as_str(), &change.value) {
            ("play", ParamValue::Action) => self.play(),
            ("stop", ParamValue::Action) => self.playback.pause(),
            ("duration", _) | ("yoyo", _) if self.playback.is_active() => self.play(),
            ("bg_color", ParamValue::Color(hex)) => self.set_background(*hex),
            ("blur_enabled", ParamValue::Bool(on)) => {
                let bloom = self.bloom;
                self.second.composer_mut().set_enabled(bloom, *on);
            }
            ("blur_strength", ParamValue::Float(strength)) => {
                if let Some(bloom) = self.bloom_pass() {
                    bloom.strength = *strength;
                }
            }
            ("blur_kernel_size" | "blur_sigma", ParamValue::Float(_)) => self.reset_blur(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn opacity_rises_then_drops_out() {
        assert_eq!(opacity(0.0), 0.0);
        assert!(close(opacity(0.495), 0.25));
        assert!(close(opacity(0.99), 1.0));
        assert!(close(opacity(0.995), 0.5));
        assert!(close(opacity(1.0), 0.0));
    }

    #[test]
    fn passed_elements_are_hidden() {
        let settings = TrailSettings::default();
        assert!(element_state(0.5, 0.5, &settings).is_none());
        assert!(element_state(0.6, 0.5, &settings).is_none());
        assert!(element_state(0.0, 0.0, &settings).is_none());
    }

    #[test]
    fn elements_shrink_and_whiten_as_the_figure_nears() {
        let settings = TrailSettings::default();
        let far = element_state(0.0, 0.5, &settings).unwrap();
        assert!(close(far.scale, 2.5));
        assert_eq!(far.opacity, 0.0);
        assert_eq!(far.color, settings.start.lerp(settings.end, 0.5));

        let near = element_state(0.49, 0.5, &settings).unwrap();
        assert!(near.scale < 1.1);
        assert!(near.color.r > far.color.r);
    }

    #[test]
    fn figure_is_centered() {
        let geometry = figure();
        let (min, max) = geometry.vertices.iter().fold(
            (Vector3::new(f32::MAX, f32::MAX, f32::MAX), Vector3::new(f32::MIN, f32::MIN, f32::MIN)),
            |(min, max), v| {
                let p = Vector3::from(v.position);
                (
                    Vector3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z)),
                    Vector3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z)),
                )
            },
        );
        assert!((min + max).magnitude() < 1e-4);
        // the long roof edge makes it deeper than wide
        assert!(max.z - min.z > max.x - min.x);
    }

    #[test]
    fn placement_bobs_once_per_lap() {
        let path = path();
        let (start, _) = placement(&path, 0.0);
        let (quarter, _) = placement(&path, 0.25);
        assert!(close(start.y, 0.0));
        assert!(close(quarter.y, 1.0));
        assert!(close(start.x, 0.2));
        assert!(close(start.z, 0.1));
    }
}
