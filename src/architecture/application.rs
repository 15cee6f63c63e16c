use crate::architecture::{MenuItem, Module, ModuleHost, RouteTree};

/// Root of the module tree.
#[derive(Debug)]
pub struct Application {
    base_url: String,
    modules: Vec<Module>,
}

impl Application {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            modules: Vec::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn routes(&self) -> RouteTree {
        RouteTree {
            roots: self.modules.iter().map(Module::routes).collect(),
        }
    }
}

impl ModuleHost for Application {
    fn child(&mut self) -> &mut Module {
        self.modules.push(Module::new(self.base_url.clone()));
        let last = self.modules.len() - 1;
        &mut self.modules[last]
    }

    /// All entries of `menu`, stable-sorted by their order.
    fn menu_items(&self, menu: &str) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = self
            .modules
            .iter()
            .flat_map(|module| module.menu_items(menu))
            .collect();
        items.sort_by_key(|item| item.order);
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::architecture::{Layout, RouteError, RouteMatch};

    fn section(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
        host.child()
            .set_path("/late")?
            .show_in_menu("main", "Late", 2)?;
        host.child()
            .set_path("/early")?
            .show_in_menu("main", "Early", 1)?;
        host.child()
            .set_path("/also-early")?
            .show_in_menu("main", "Also early", 1)?;
        Ok(())
    }

    #[test]
    fn menu_items_are_stable_sorted_by_order() {
        let mut app = Application::new("/");
        app.with(section).unwrap();
        app.child()
            .set_path("/first")
            .unwrap()
            .show_in_menu("main", "First", 0)
            .unwrap();

        let titles: Vec<_> = app
            .menu_items("main")
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["First", "Early", "Also early", "Late"]);
    }

    #[test]
    fn features_nest_below_a_layout() {
        let mut app = Application::new("/");
        app.child()
            .set_path("/")
            .unwrap()
            .set_element(Layout::new("Journey").with_default_path("/early"))
            .unwrap()
            .with(section)
            .unwrap();

        let items = app.menu_items("main");
        assert_eq!(items[0].path, "/early");

        let routes = app.routes();
        assert_eq!(routes.roots.len(), 1);
        assert_eq!(routes.roots[0].children.len(), 3);
        assert_eq!(routes.roots[0].children[0].full_path, "/late");

        match routes.resolve("/").unwrap() {
            RouteMatch::Redirect { to, .. } => assert_eq!(to, "/early"),
            other => panic!("unexpected match {:?}", other),
        }
    }
}
