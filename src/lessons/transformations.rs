//! A row of boxes waving in scale and rotation.

use std::f32::consts::PI;

use crate::{
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene::{Object, ObjectId, Scene},
        transform::Transform,
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::{Color, item_ratio},
};

const BOXES: usize = 16;
const TOTAL_WIDTH: f32 = 5.0;
const FROM: u32 = 0x14386b;
const TO: u32 = 0xfbd85e;

/// Scale along y and rotation around x of box `index` at `time` in ms.
pub fn wave(time: f64, index: usize) -> (f32, f32) {
    let step = PI / BOXES as f32;
    let angle = (time / 1000.0) as f32 * PI;
    let phase = index as f32 * step;
    ((angle + phase).sin(), angle / 2.0 + phase)
}

pub struct Transformations {
    stage: Stage,
    boxes: Vec<ObjectId>,
}

impl Transformations {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(2.0, 2.0, 6.0);
        let mut stage = Stage::new(ctx, Scene::new(Color::WHITE), camera);
        stage.scene.add(Object::new(
            "axes",
            mesh(ctx, &Geometry::axes(1.0), "axes"),
            Material::basic(Color::WHITE),
        ));

        let width = TOTAL_WIDTH / BOXES as f32;
        let block = mesh(ctx, &Geometry::cuboid(width, 1.0, 1.0), "box");
        let boxes = (0..BOXES)
            .map(|i| {
                let ratio = item_ratio(BOXES, i);
                let color = Color::from_hex(FROM).lerp(Color::from_hex(TO), ratio.powi(3));
                stage.scene.add(
                    Object::new(&format!("box {}", i), block.clone(), Material::basic(color))
                        .with_transform(Transform::from_position(ratio * TOTAL_WIDTH - TOTAL_WIDTH / 2.0, 0.0, 0.0)),
                )
            })
            .collect();
        Self { stage, boxes }
    }
}

impl InteractiveApp for Transformations {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        for (i, id) in self.boxes.iter().enumerate() {
            if let Some(object) = self.stage.scene.get_mut(*id) {
                let (scale_y, rotation_x) = wave(frame.time, i);
                object.transform.scale.y = scale_y;
                object.transform.set_euler(rotation_x, 0.0, 0.0);
            }
        }
        self.stage.draw(frame);
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/transformations",
        "THREE.js | Transformations",
        "Transformations",
        AppConstructor::new(|ctx| async move { anyhow::Ok(Transformations::new(&ctx)) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_are_a_step_apart() {
        let (scale0, rotation0) = wave(0.0, 0);
        let (_, rotation1) = wave(0.0, 1);
        assert_eq!(scale0, 0.0);
        assert!((rotation1 - rotation0 - PI / 16.0).abs() < 1e-6);
    }

    #[test]
    fn half_a_second_peaks_the_scale() {
        let (scale, rotation) = wave(500.0, 0);
        assert!((scale - 1.0).abs() < 1e-6);
        assert!((rotation - PI / 4.0).abs() < 1e-6);
    }
}
