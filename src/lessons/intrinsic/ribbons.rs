//! Square ribbons chasing each other around a figure eight, with optional
//! screen effects on top.

use std::sync::Arc;

use cgmath::Vector3;
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{Key, NamedKey},
};

use crate::{
    animation::{Easing, Playback, Tween},
    app::{Frame, InteractiveApp},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        mesh::Mesh,
        material::Material,
        scene::{Object, ObjectId, Scene},
        transform::Transform,
    },
    lessons::stage::{Stage, mesh},
    math::{CatmullRomCurve3, Color, Curve},
    params::{ParamChange, ParamValue, Params},
    postprocessing::{
        EffectComposer, PassContext, PassId,
        effects::{self, GlitchPass},
        passes::ScenePass,
    },
};

const BACKGROUND: u32 = 0xd9d9d9;
const DEFAULT_RIBBONS: usize = 40;
const MAX_RIBBONS: usize = 128;
const START_COLOR: u32 = 0xff0000;
const END_COLOR: u32 = 0x0000ff;
const LOOP: Duration = Duration::from_secs(10);

/// How ribbon `ratio` looks at `time`, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RibbonState {
    pub visible: bool,
    pub opacity: f32,
    pub lightness: f32,
}

/// Ribbons behind the leader are gone. The rest fade with their distance
/// to it and fade in over the start of the loop, later ones more slowly.
pub fn ribbon_state(time: f32, ratio: f32) -> RibbonState {
    if ratio < time {
        return RibbonState {
            visible: false,
            opacity: 0.0,
            lightness: 0.0,
        };
    }
    let target = (1.0 - (time - ratio).abs()).powi(2);
    let appearing = (time / (0.1 + ratio * 0.4)).clamp(0.0, 1.0);
    RibbonState {
        visible: true,
        opacity: target * appearing.powi(2),
        lightness: target.powi(3),
    }
}

fn figure_eight() -> CatmullRomCurve3 {
    let p = Vector3::new;
    CatmullRomCurve3::new(
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 0.0, 1.0),
            p(0.0, 0.0, 1.0),
            p(0.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 1.0, 1.0),
            p(0.0, 0.0, 1.0),
            p(0.0, 0.0, 0.0),
        ],
        true,
    )
}

fn place(transform: &mut Transform, curve: &CatmullRomCurve3, u: f32) {
    transform.position = curve.point_at(u);
    transform.look_at(curve.tangent_at(u), Vector3::unit_y());
}

struct Passes {
    dot_screen: PassId,
    glitch: PassId,
    gamma: PassId,
}

pub struct Ribbons {
    stage: Stage,
    composer: EffectComposer,
    passes: Passes,
    curve: CatmullRomCurve3,
    ribbon: Arc<Mesh>,
    ribbons: Vec<ObjectId>,
    params: Params,
    playback: Playback,
}

impl Ribbons {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(2.0, 2.0, 5.0);
        let stage = Stage::new(ctx, Scene::new(Color::from_hex(BACKGROUND)), camera).with_orbit(ctx);

        let mut composer = EffectComposer::new(&ctx.device, ctx.format, ctx.size);
        composer.add_pass(ScenePass::new());
        let passes = Passes {
            dot_screen: composer.add_pass(effects::dot_screen(&ctx.device, &ctx.queue, ctx.format)),
            glitch: composer.add_pass(GlitchPass::new(&ctx.device, &ctx.queue, ctx.format)),
            gamma: composer.add_pass(effects::gamma(&ctx.device, &ctx.queue, ctx.format)),
        };
        for id in [passes.dot_screen, passes.glitch, passes.gamma] {
            composer.set_enabled(id, false);
        }

        let mut params = Params::new();
        params
            .add_action("play")
            .add_action("stop")
            .add_color("start_color", START_COLOR)
            .add_color("end_color", END_COLOR)
            .add_float("elements_number", DEFAULT_RIBBONS as f32, 1.0, MAX_RIBBONS as f32, 1.0)
            .add_float("animation_time", 0.0, 0.0, 1.0, 1e-5)
            .add_bool("dot_screen", false)
            .add_bool("glitch", false)
            .add_bool("glitch_wild", false)
            .add_bool("gamma_correction", false);

        let mut ribbons = Self {
            stage,
            composer,
            passes,
            curve: figure_eight(),
            ribbon: mesh(ctx, &Geometry::ring_square(1.0, 0.05), "ribbon"),
            ribbons: Vec::new(),
            params,
            playback: Playback::new(
                Tween::new(0.0, 1.0, LOOP)
                    .ease(Easing::Power2InOut)
                    .repeat(None),
            ),
        };
        ribbons.rebuild(DEFAULT_RIBBONS);
        ribbons
    }

    fn color(&self, name: &str, fallback: u32) -> Color {
        Color::from_hex(self.params.get_color(name).unwrap_or(fallback))
    }

    fn rebuild(&mut self, count: usize) {
        for id in self.ribbons.drain(..) {
            self.stage.scene.remove(id);
        }
        for i in 0..count {
            let ratio = i as f32 / count as f32;
            let material = if i == 0 {
                Material::basic(Color::WHITE).with_opacity(1.0).with_depth_write(false)
            } else {
                Material::basic(Color::WHITE).with_opacity(0.0)
            };
            let mut object = Object::new(&format!("ribbon {}", i), self.ribbon.clone(), material);
            place(&mut object.transform, &self.curve, ratio);
            self.ribbons.push(self.stage.scene.add(object));
        }
        self.animate(self.params.get_f32("animation_time").unwrap_or(0.0));
    }

    fn animate(&mut self, time: f32) {
        let (start, end) = (self.color("start_color", START_COLOR), self.color("end_color", END_COLOR));
        let count = self.ribbons.len();
        for (i, id) in self.ribbons.iter().enumerate() {
            let Some(ribbon) = self.stage.scene.get_mut(*id) else {
                continue;
            };
            if i == 0 {
                ribbon.material.opacity = 1.0;
                place(&mut ribbon.transform, &self.curve, time);
                continue;
            }
            let ratio = i as f32 / count as f32;
            let state = ribbon_state(time, ratio);
            ribbon.visible = state.visible;
            if !state.visible {
                continue;
            }
            let (hue, _, _) = start.lerp(end, ratio).to_hsl();
            ribbon.material.opacity = state.opacity;
            ribbon.material.color = Color::from_hsl(hue, 1.0, state.lightness);
        }
    }
}

impl InteractiveApp for Ribbons {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        self.playback.restart();
        Ok(())
    }

    fn on_frame(&mut self, ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        if let Some(time) = self.playback.advance(frame.dt) {
            self.params.set_f32("animation_time", time);
            self.animate(time);
        }
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

    fn on_window_event(&mut self, _ctx: &InitContext, event: &WindowEvent) -> bool {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    logical_key: Key::Named(NamedKey::Space),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            self.playback.restart();
            return true;
        }
        self.stage.window_event(event)
    }

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, change: &ParamChange) {
        match (change.name.as_str(), &change.value) {
            ("play", ParamValue::Action) => self.playback.restart(),
            ("stop", ParamValue::Action) => self.playback.pause(),
            ("start_color" | "end_color", ParamValue::Color(_)) => {
                self.animate(self.params.get_f32("animation_time").unwrap_or(0.0))
            }
            ("elements_number", ParamValue::Float(count)) => self.rebuild(*count as usize),
            ("animation_time", ParamValue::Float(time)) => {
                self.playback.pause();
                self.animate(*time);
            }
            ("dot_screen", ParamValue::Bool(on)) => self.composer.set_enabled(self.passes.dot_screen, *on),
            ("glitch", ParamValue::Bool(on)) => self.composer.set_enabled(self.passes.glitch, *on),
            ("glitch_wild", ParamValue::Bool(wild)) => {
                if let Some(glitch) = self.composer.pass_mut::<GlitchPass>(self.passes.glitch) {
                    glitch.go_wild = *wild;
                }
            }
            ("gamma_correction", ParamValue::Bool(on)) => self.composer.set_enabled(self.passes.gamma, *on),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passed_ribbons_disappear() {
        let state = ribbon_state(0.5, 0.25);
        assert!(!state.visible);
        assert_eq!(state.opacity, 0.0);
    }

    #[test]
    fn ribbons_fade_in_from_the_start() {
        assert_eq!(ribbon_state(0.0, 0.5).opacity, 0.0);
        let later = ribbon_state(0.3, 0.5);
        // fully appeared, so only the distance counts
        assert!((later.opacity - 0.64).abs() < 1e-5);
        assert!((later.lightness - 0.64f32.powi(3)).abs() < 1e-5);
    }

    #[test]
    fn ribbons_close_to_the_leader_are_brightest() {
        let near = ribbon_state(0.5, 0.55);
        let far = ribbon_state(0.5, 0.95);
        assert!(near.opacity > far.opacity);
        assert!(near.lightness > far.lightness);
    }
}
