//! Route and menu composition.
//!
//! An [`Application`] is a tree of [`Module`]s. Every module can claim a path,
//! a title, an element (a lesson constructor or a layout) and one entry per
//! named menu. Features are plain functions that receive a [`ModuleHost`] and
//! hang their own modules below it, so the whole site is assembled by chaining
//! `with(feature)` calls:
//!
//! ```
//! use scene_journey::architecture::{Application, ModuleHost, RouteError};
//!
//! fn about(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
//!     host.child().set_path("/about")?.show_in_menu("main", "About", 0)?;
//!     Ok(())
//! }
//!
//! let mut app = Application::new("/");
//! app.with(about).unwrap();
//! assert_eq!(app.menu_items("main")[0].path, "/about");
//! ```

pub mod application;
pub mod menu;
pub mod module;
pub mod route;

pub use application::Application;
pub use menu::{MenuItem, MenuState};
pub use module::Module;
pub use route::{Element, Layout, RouteMatch, RouteNode, RouteTree};

/// Misuse of the module builder or a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("the module path is already set")]
    PathAlreadySet,
    #[error("the module element is already set")]
    ElementAlreadySet,
    #[error("the module title is already set")]
    TitleAlreadySet,
    #[error("the module is already shown in menu `{0}`")]
    MenuAlreadySet(String),
    #[error("a path is required before showing the module in menu `{0}`")]
    MissingPath(String),
    #[error("no route matches `{0}`")]
    NotFound(String),
}

/// Something modules can be attached to: the [`Application`] root or another [`Module`].
pub trait ModuleHost {
    /// Create a new child module and return it for configuration.
    fn child(&mut self) -> &mut Module;

    /// Menu entries registered under `menu` in this subtree.
    fn menu_items(&self, menu: &str) -> Vec<MenuItem>;

    /// Run `feature` against `self` and hand `self` back for chaining.
    fn with(&mut self, feature: Feature) -> Result<&mut Self, RouteError>
    where
        Self: Sized,
    {
        feature(self)?;
        Ok(self)
    }
}

/// A unit of registration, usually one per lesson group.
pub type Feature = fn(&mut dyn ModuleHost) -> Result<(), RouteError>;
