mod common;

use std::sync::{Arc, Mutex};

use common::test_utils::{Recorder, State};
use instant::{Duration, Instant};
use scene_journey::app::{FrameClock, LifecycleState, RunningApp};

#[test]
fn lifecycle_only_moves_forward() {
    let mut state = LifecycleState::default();
    assert!(!state.can_frame());
    assert!(state.begin_run());
    assert!(state.can_frame());
    assert!(!state.begin_run());
    assert!(state.begin_destroy());
    assert!(!state.can_frame());
    assert!(!state.begin_destroy());
    assert!(!state.begin_run());
}

#[test]
fn destroying_before_running_skips_the_frames() {
    let mut state = LifecycleState::default();
    assert!(state.begin_destroy());
    assert!(!state.begin_run());
    assert_eq!(state, LifecycleState::Destroyed);
}

#[test]
fn frame_clock_reports_time_since_the_first_tick() {
    let start = Instant::now();
    let mut clock = FrameClock::new();
    assert_eq!(clock.tick(start), (0.0, Duration::ZERO));
    let (time, dt) = clock.tick(start + Duration::from_millis(16));
    assert!((time - 16.0).abs() < 1e-6);
    assert_eq!(dt, Duration::from_millis(16));
    let (time, dt) = clock.tick(start + Duration::from_millis(40));
    assert!((time - 40.0).abs() < 1e-6);
    assert_eq!(dt, Duration::from_millis(24));

    clock.reset();
    assert_eq!(clock.tick(start + Duration::from_secs(1)).0, 0.0);
}

fn recorder(state: &Arc<Mutex<State>>) -> RunningApp {
    RunningApp::new(Box::new(Recorder::new(state.clone())))
}

#[test]
fn stop_destroys_once_and_ends_the_frames() {
    let state = Arc::new(Mutex::new(State::new()));
    let mut app = recorder(&state);
    app.start_with(|_| Ok(())).unwrap();
    assert_eq!(app.state(), LifecycleState::Running);
    assert!(app.needs_redraw());

    app.stop();
    app.stop();
    assert_eq!(app.state(), LifecycleState::Destroyed);
    assert!(!app.needs_redraw());
    assert!(app.params().is_none());
    drop(app);

    assert_eq!(state.lock().unwrap().destroy_invocations(), 1);
}

#[test]
fn a_failing_start_destroys_the_app() {
    let state = Arc::new(Mutex::new(State::new()));
    let mut app = recorder(&state);
    assert!(app.start_with(|_| anyhow::bail!("no GPU today")).is_err());
    assert_eq!(app.state(), LifecycleState::Destroyed);
    assert!(!app.needs_redraw());
    drop(app);

    let state = state.lock().unwrap();
    assert_eq!(state.destroy_invocations(), 1);
    assert_eq!(state.frame_invocations(), 0);
}

#[test]
fn an_app_starts_only_once() {
    let state = Arc::new(Mutex::new(State::new()));
    let mut app = recorder(&state);
    app.start_with(|_| Ok(())).unwrap();
    assert!(app.start_with(|_| Ok(())).is_err());
    assert_eq!(app.state(), LifecycleState::Running);
}

#[test]
fn dropping_an_app_that_never_started_still_destroys_it() {
    let state = Arc::new(Mutex::new(State::new()));
    drop(recorder(&state));
    let state = state.lock().unwrap();
    assert_eq!(state.destroy_invocations(), 1);
    assert_eq!(state.run_invocations(), 0);
}

#[test]
fn still_apps_stop_like_the_others() {
    let state = Arc::new(Mutex::new(State::new()));
    let mut app = RunningApp::new(Box::new(Recorder::still(state.clone())));
    app.start_with(|_| Ok(())).unwrap();
    assert!(app.needs_redraw());
    app.stop();
    assert!(!app.needs_redraw());
    drop(app);

    let state = state.lock().unwrap();
    assert_eq!(state.frame_invocations(), 0);
    assert_eq!(state.destroy_invocations(), 1);
}

#[cfg(feature = "integration-tests")]
mod gpu {
    use std::sync::{Arc, Mutex};

    use scene_journey::{
        app::{LifecycleState, RunningApp},
        params::{ParamChange, ParamValue},
    };

    use crate::common::test_utils::{Recorder, State, gpu};

    #[test]
    fn hooks_run_in_order_and_destroy_runs_once() {
        let ctx = gpu::context();
        let target = gpu::target(&ctx);
        let state = Arc::new(Mutex::new(State::new()));
        let mut app = RunningApp::start(Box::new(Recorder::new(state.clone())), &ctx).unwrap();
        assert_eq!(app.state(), LifecycleState::Running);

        gpu::render(&ctx, &mut app, &target, 3);
        app.param_changed(
            &ctx,
            &ParamChange {
                name: "flag".into(),
                value: ParamValue::Bool(true),
            },
        );
        app.stop();
        app.stop();
        gpu::render(&ctx, &mut app, &target, 1);
        drop(app);

        let state = state.lock().unwrap();
        assert_eq!(state.run_invocations(), 1);
        assert_eq!(state.frame_invocations(), 3);
        assert_eq!(state.param_invocations(), 1);
        assert_eq!(state.destroy_invocations(), 1);
    }

    #[test]
    fn still_apps_draw_once_until_they_change() {
        let ctx = gpu::context();
        let target = gpu::target(&ctx);
        let state = Arc::new(Mutex::new(State::new()));
        let mut app = RunningApp::start(Box::new(Recorder::still(state.clone())), &ctx).unwrap();

        gpu::render(&ctx, &mut app, &target, 3);
        assert!(!app.needs_redraw());
        assert_eq!(state.lock().unwrap().still_invocations(), 1);

        app.resize(&ctx, gpu::WIDTH, gpu::HEIGHT);
        assert!(app.needs_redraw());
        gpu::render(&ctx, &mut app, &target, 2);
        app.stop();

        let state = state.lock().unwrap();
        assert_eq!(state.still_invocations(), 2);
        assert_eq!(state.frame_invocations(), 0);
        assert_eq!(state.destroy_invocations(), 1);
    }

    #[test]
    fn a_failing_run_destroys_the_app() {
        let ctx = gpu::context();
        let state = Arc::new(Mutex::new(State::new()));
        assert!(RunningApp::start(Box::new(Recorder::failing(state.clone())), &ctx).is_err());
        let state = state.lock().unwrap();
        assert_eq!(state.run_invocations(), 1);
        assert_eq!(state.destroy_invocations(), 1);
        assert_eq!(state.frame_invocations(), 0);
    }
}
