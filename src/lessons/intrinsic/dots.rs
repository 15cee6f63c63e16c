//! A bent tube drawn as a cloud of random dots.

use std::sync::Arc;

use cgmath::{InnerSpace, Vector3};

use crate::{
    app::{Frame, InteractiveApp},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        mesh::Mesh,
        scene::{Object, ObjectId, Scene},
    },
    lessons::stage::{Stage, mesh},
    math::{Color, CurvePath, LineCurve3, lerp},
    params::{ParamChange, ParamValue, Params},
};

const SHAPES: usize = 32;
const MIN_SCALE: f32 = 1.0;
const MAX_SCALE: f32 = 3.0;
const DEFAULT_FRACTION: f32 = 0.5;

/// Which of `count` pre-built shapes to show for `ratio`.
pub fn geometry_index(ratio: f32, count: usize) -> usize {
    let last = count.saturating_sub(1);
    if ratio >= 1.0 {
        last
    } else if ratio <= 0.0 {
        0
    } else {
        ((ratio * count as f32).floor() as usize).min(last)
    }
}

/// Lighter the more dots are shown.
pub fn dots_color(base: Color, fraction: f32) -> Color {
    base.with_lightness(lerp(0.5, 1.0, fraction))
}

fn shape_curve() -> CurvePath {
    let mut curve = CurvePath::new();
    let corner = Vector3::new(0.0, 0.0, 0.0);
    curve.add(LineCurve3::new(Vector3::new(0.0, 0.5, 0.0), corner));
    curve.add(LineCurve3::new(corner, Vector3::new(0.5, -0.5, 0.0).normalize() * 0.5));
    curve
}

fn shape(ratio: f32) -> Geometry {
    let scale = lerp(MIN_SCALE, MAX_SCALE, ratio);
    Geometry::tube(&shape_curve(), 64, 0.01 * scale, 10, false).scaled(scale)
}

pub struct Dots {
    stage: Stage,
    shapes: Vec<Arc<Mesh>>,
    shape: ObjectId,
    base_color: Color,
    params: Params,
}

impl Dots {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(2.0, 2.0, 5.0);
        let mut stage = Stage::new(ctx, Scene::new(Color::WHITE), camera).with_orbit(ctx);

        let shapes: Vec<_> = (0..SHAPES)
            .map(|i| mesh(ctx, &shape(i as f32 / (SHAPES - 1) as f32), &format!("shape {}", i)))
            .collect();
        let base_color = Color::new(0.2, 0.4, 0.6);

        stage.scene.add(Object::new(
            "axes",
            mesh(ctx, &Geometry::axes(1.0), "axes"),
            Material::basic(Color::WHITE),
        ));
        let shape = stage.scene.add(Object::new(
            "shape",
            shapes[geometry_index(DEFAULT_FRACTION, SHAPES)].clone(),
            Material::dots(base_color, DEFAULT_FRACTION).with_opacity(1.0),
        ));

        let mut params = Params::new();
        params
            .add_color("shape_color", base_color.to_hex())
            .add_float("fraction", DEFAULT_FRACTION, 0.0, 1.0, 0.01);

        Self {
            stage,
            shapes,
            shape,
            base_color,
            params,
        }
    }

    fn set_fraction(&mut self, fraction: f32) {
        let Some(shape) = self.stage.scene.get_mut(self.shape) else {
            return;
        };
        shape.material.params[0] = fraction;
        shape.material.color = dots_color(self.base_color, fraction);
        shape.mesh = Some(self.shapes[geometry_index(1.0 - fraction, self.shapes.len())].clone());
    }
}

impl InteractiveApp for Dots {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        self.stage.draw(frame);
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
    }

    fn on_window_event(&mut self, _ctx: &InitContext, event: &winit::event::WindowEvent) -> bool {
        self.stage.window_event(event)
    }

    fn params(&mut self) -> Option<&mut Params> {
        Some(&mut self.params)
    }

    fn on_param_change(&mut self, _ctx: &InitContext, change: &ParamChange) {
        match (change.name.as_str(), &change.value) {
            ("shape_color", ParamValue::Color(hex)) => {
                self.base_color = Color::from_hex(*hex);
                if let Some(shape) = self.stage.scene.get_mut(self.shape) {
                    shape.material.color = self.base_color;
                }
            }
            ("fraction", ParamValue::Float(fraction)) => self.set_fraction(*fraction),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_clamped_at_both_ends() {
        assert_eq!(geometry_index(-0.5, SHAPES), 0);
        assert_eq!(geometry_index(0.0, SHAPES), 0);
        assert_eq!(geometry_index(0.5, SHAPES), 16);
        assert_eq!(geometry_index(0.999, SHAPES), 31);
        assert_eq!(geometry_index(1.0, SHAPES), 31);
    }

    #[test]
    fn more_dots_means_lighter() {
        let base = Color::new(0.2, 0.4, 0.6);
        let (h, s, _) = base.to_hsl();
        let (h2, s2, l2) = dots_color(base, 1.0).to_hsl();
        assert!((l2 - 1.0).abs() < 1e-4);
        let (_, _, l_half) = dots_color(base, 0.0).to_hsl();
        assert!((l_half - 0.5).abs() < 1e-4);
        assert!((h - h2).abs() < 1e-4 || s2 < 1e-4);
        assert!(s > 0.0);
    }

    #[test]
    fn bigger_shapes_have_thicker_tubes() {
        let (small, big) = (shape(0.0), shape(1.0));
        let extent = |g: &Geometry| {
            g.vertices
                .iter()
                .map(|v| v.position[1])
                .fold(f32::MIN, f32::max)
        };
        assert!(extent(&big) > extent(&small) * 2.5);
    }
}
