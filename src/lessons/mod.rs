//! Every lesson of the journey, registered under one home layout.
//!
//! Each submodule exposes a `feature` that hangs its lessons below the host
//! it is given. [`application`] chains them in menu order.

pub mod controls;
pub mod effects;
pub mod flag;
pub mod fly;
pub mod intrinsic;
pub mod mouse;
pub mod sierpinski;
pub mod stage;
pub mod textures;
pub mod timeline;
pub mod transformations;

use crate::{
    app::AppConstructor,
    architecture::{Application, Layout, ModuleHost, RouteError},
};

pub const HEADING: &str = "Three.js Journey";
pub const MENU: &str = "main";

/// Register one lesson: a routed, titled app with an entry in the main menu.
pub(crate) fn lesson(
    host: &mut dyn ModuleHost,
    path: &str,
    title: &str,
    label: &str,
    constructor: AppConstructor,
) -> Result<(), RouteError> {
    host.child()
        .set_path(path)?
        .set_title(title)?
        .set_element(constructor)?
        .show_in_menu(MENU, label, 0)?;
    Ok(())
}

/// The full site. `/` redirects to `default_route`.
pub fn application(default_route: &str) -> Result<Application, RouteError> {
    let mut application = Application::new("/");
    application
        .child()
        .set_path("/")?
        .set_element(Layout::new(HEADING).with_default_path(default_route))?
        .with(intrinsic::feature)?
        .with(flag::feature)?
        .with(transformations::feature)?
        .with(timeline::feature)?
        .with(mouse::feature)?
        .with(fly::feature)?
        .with(sierpinski::feature)?
        .with(controls::feature)?
        .with(textures::feature)?
        .with(effects::feature)?;
    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::RouteMatch;

    #[test]
    fn every_menu_entry_resolves_to_a_lesson() {
        let application = application("/intrinsic").unwrap();
        let routes = application.routes();
        let items = application.menu_items(MENU);
        assert_eq!(items.len(), 14);
        for item in items {
            assert!(
                matches!(routes.resolve(&item.path), Ok(RouteMatch::App { .. })),
                "{} does not resolve to a lesson",
                item.path
            );
        }
    }

    #[test]
    fn lessons_inherit_the_home_heading() {
        let routes = application("/intrinsic").unwrap().routes();
        match routes.resolve("/geometry") {
            Ok(RouteMatch::App { title, heading, .. }) => {
                assert_eq!(title.as_deref(), Some("THREE.js | Serpinski Triangle"));
                assert_eq!(heading.as_deref(), Some(HEADING));
            }
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn root_redirects_to_the_default() {
        let routes = application("/lesson06").unwrap().routes();
        assert!(matches!(
            routes.resolve("/"),
            Ok(RouteMatch::Redirect { ref to, .. }) if to == "/lesson06"
        ));
    }
}
