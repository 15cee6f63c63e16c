#![cfg(feature = "integration-tests")]

mod common;

use common::test_utils::gpu;
use scene_journey::{
    app::RunningApp,
    architecture::{ModuleHost, RouteMatch},
    lessons,
};

fn start(path: &str) -> (scene_journey::context::InitContext, RunningApp) {
    let ctx = gpu::context();
    let routes = lessons::application("/intrinsic").unwrap().routes();
    let constructor = match routes.resolve(path) {
        Ok(RouteMatch::App { constructor, .. }) => constructor,
        _ => panic!("{} is not a lesson", path),
    };
    let app = futures::executor::block_on(constructor.construct(ctx.clone())).unwrap();
    let running = RunningApp::start(app, &ctx).unwrap();
    (ctx, running)
}

#[test]
fn every_lesson_draws_frames() {
    let application = lessons::application("/intrinsic").unwrap();
    for item in application.menu_items(lessons::MENU) {
        let (ctx, mut app) = start(&item.path);
        let target = gpu::target(&ctx);
        let image = gpu::render(&ctx, &mut app, &target, 2);
        assert_eq!(image.dimensions(), (gpu::WIDTH, gpu::HEIGHT), "{}", item.path);
        app.stop();
    }
}

#[test]
fn the_first_intrinsic_lesson_clears_to_its_grey_background() {
    let (ctx, mut app) = start("/intrinsic");
    let target = gpu::target(&ctx);
    let image = gpu::render(&ctx, &mut app, &target, 1);
    let grey = |p: &image::Rgba<u8>| p.0[..3].iter().all(|c| (*c as i32 - 0xd9).abs() <= 2);
    assert!(image.pixels().any(grey));
}
