//! A cube swinging left and right on a repeating timeline.

use instant::Duration;

use crate::{
    animation::{Easing, Playback, Timeline},
    app::{AppConstructor, Frame, InteractiveApp},
    architecture::{ModuleHost, RouteError},
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        geometry::Geometry,
        material::Material,
        scene::{Object, ObjectId, Scene},
    },
    lessons::{
        lesson,
        stage::{Stage, mesh},
    },
    math::Color,
};

const LEG: Duration = Duration::from_secs(2);

pub fn swing() -> Timeline {
    Timeline::new(0.0)
        .to(1.0, LEG, Easing::default())
        .to(-1.0, LEG, Easing::default())
        .repeat(None)
        .yoyo(true)
}

pub struct Swing {
    stage: Stage,
    cube: ObjectId,
    playback: Playback<Timeline>,
}

impl Swing {
    pub fn new(ctx: &InitContext) -> Self {
        let camera = PerspectiveCamera::new(55.0, ctx.aspect()).at(2.0, 2.0, 3.0);
        let mut stage = Stage::new(ctx, Scene::new(Color::WHITE), camera);
        stage.scene.add(Object::new(
            "axes",
            mesh(ctx, &Geometry::axes(1.0), "axes"),
            Material::basic(Color::WHITE),
        ));
        let cube = stage.scene.add(Object::new(
            "cube",
            mesh(ctx, &Geometry::cuboid(1.0, 1.0, 1.0), "cube"),
            Material::basic(Color::from_hex(0x336699)),
        ));
        Self {
            stage,
            cube,
            playback: Playback::new(swing()),
        }
    }
}

impl InteractiveApp for Swing {
    fn run(&mut self, _ctx: &InitContext) -> anyhow::Result<()> {
        self.playback.play();
        Ok(())
    }

    fn on_frame(&mut self, _ctx: &InitContext, frame: &mut Frame<'_>) -> anyhow::Result<()> {
        if let Some(x) = self.playback.advance(frame.dt) {
            if let Some(cube) = self.stage.scene.get_mut(self.cube) {
                cube.transform.position.x = x;
            }
        }
        self.stage.draw(frame);
        Ok(())
    }

    fn destroy(&mut self) {
        self.playback.pause();
    }

    fn on_resize(&mut self, _ctx: &InitContext, width: u32, height: u32) {
        self.stage.resize(width, height);
    }
}

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/lesson06",
        "THREE.js | Lesson 05",
        "Lesson 05",
        AppConstructor::new(|ctx| async move { anyhow::Ok(Swing::new(&ctx)) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swing_reaches_both_sides() {
        let timeline = swing();
        assert_eq!(timeline.value_at(Duration::ZERO), 0.0);
        assert!((timeline.value_at(LEG) - 1.0).abs() < 1e-5);
        assert!((timeline.value_at(LEG * 2) + 1.0).abs() < 1e-5);
        assert!(!timeline.is_complete(LEG * 100));
    }
}
