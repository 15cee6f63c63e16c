mod common;

use std::sync::{Arc, Mutex};

use common::test_utils::{State, home, recorder_lesson};
use scene_journey::{
    architecture::{Application, ModuleHost, RouteError, RouteMatch},
    config::ShellConfig,
    lessons,
    shell::{Navigation, Navigator},
};

fn journey(state: Arc<Mutex<State>>) -> Result<Application, RouteError> {
    let mut application = Application::new("/");
    let root = home(&mut application, "/first")?;
    recorder_lesson(root, "/first", "First", state.clone())?;
    recorder_lesson(root, "/second", "Second", state)?;
    Ok(application)
}

#[test]
fn lessons_are_listed_in_registration_order() {
    let application = lessons::application("/intrinsic").unwrap();
    let paths: Vec<String> = application
        .menu_items(lessons::MENU)
        .into_iter()
        .map(|item| item.path)
        .collect();
    assert_eq!(paths.first().map(String::as_str), Some("/intrinsic"));
    assert_eq!(paths.last().map(String::as_str), Some("/lesson-32-effects"));
    let at = |p: &str| paths.iter().position(|path| path == p).unwrap();
    assert!(at("/intrinsic-5") < at("/ukrainian-flag"));
    assert!(at("/mouse-control") < at("/fly-control"));
    assert!(at("/geometry") < at("/lil-gui-controls"));
}

#[test]
fn every_lesson_path_is_unique() {
    let paths = lessons::application("/intrinsic").unwrap().routes().app_paths();
    let mut deduped = paths.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(paths.len(), deduped.len());
}

#[test]
fn trailing_slashes_resolve_to_the_same_lesson() {
    let routes = lessons::application("/intrinsic").unwrap().routes();
    assert!(matches!(routes.resolve("/transformations/"), Ok(RouteMatch::App { ref path, .. }) if path == "/transformations"));
    assert!(matches!(routes.resolve("//mouse-control"), Ok(RouteMatch::App { ref path, .. }) if path == "/mouse-control"));
}

#[test]
fn unknown_paths_are_not_found() {
    let routes = lessons::application("/intrinsic").unwrap().routes();
    assert_eq!(
        routes.resolve("/lesson99").map(|_| ()),
        Err(RouteError::NotFound("/lesson99".to_string()))
    );
}

#[test]
fn navigator_starts_the_default_for_the_root() {
    let application = journey(Arc::new(Mutex::new(State::new()))).unwrap();
    let config = ShellConfig {
        default_route: "/first".into(),
        ..Default::default()
    };
    let mut navigator = Navigator::new(&application, &config);
    match navigator.navigate("/") {
        Navigation::Start { path, heading, .. } => {
            assert_eq!(path, "/first");
            assert_eq!(heading.as_deref(), Some("Test Journey"));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(navigator.navigate("/second"), Navigation::Start { ref path, .. } if path == "/second"));
    assert_eq!(navigator.prev_path().as_deref(), Some("/first"));
}

#[test]
fn registering_a_path_twice_on_one_module_fails() {
    let mut application = Application::new("/");
    let module = application.child();
    module.set_path("/a").unwrap();
    assert_eq!(module.set_path("/b").map(|_| ()), Err(RouteError::PathAlreadySet));
}
