use std::collections::BTreeMap;

use crate::architecture::{
    Element, MenuItem, ModuleHost, RouteError,
    route::{RouteNode, normalize},
};

/// A node of the route tree under construction.
///
/// Each of path, element and title can be set once; a second attempt is
/// reported as an error instead of silently overwriting the first value.
pub struct Module {
    base_url: String,
    path: Option<String>,
    title: Option<String>,
    element: Option<Element>,
    children: Vec<Module>,
    menus: BTreeMap<String, MenuItem>,
}

impl Module {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            path: None,
            title: None,
            element: None,
            children: Vec::new(),
            menus: BTreeMap::new(),
        }
    }

    /// Join `relative` onto this module's base url with exactly one `/` in between.
    pub fn resolve(&self, relative: &str) -> String {
        let base = self.base_url.strip_suffix('/').unwrap_or(&self.base_url);
        let rel = relative.strip_prefix('/').unwrap_or(relative);
        format!("{}/{}", base, rel)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn children(&self) -> &[Module] {
        &self.children
    }

    pub fn set_path(&mut self, path: impl Into<String>) -> Result<&mut Self, RouteError> {
        if self.path.is_some() {
            return Err(RouteError::PathAlreadySet);
        }
        self.path = Some(path.into());
        Ok(self)
    }

    pub fn set_element(&mut self, element: impl Into<Element>) -> Result<&mut Self, RouteError> {
        if self.element.is_some() {
            return Err(RouteError::ElementAlreadySet);
        }
        self.element = Some(element.into());
        Ok(self)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&mut Self, RouteError> {
        if self.title.is_some() {
            return Err(RouteError::TitleAlreadySet);
        }
        self.title = Some(title.into());
        Ok(self)
    }

    /// Register this module in `menu`. The module needs a path first.
    pub fn show_in_menu(
        &mut self,
        menu: &str,
        label: impl Into<String>,
        order: i32,
    ) -> Result<&mut Self, RouteError> {
        if self.menus.contains_key(menu) {
            return Err(RouteError::MenuAlreadySet(menu.to_string()));
        }
        let path = match &self.path {
            Some(path) => self.resolve(path),
            None => return Err(RouteError::MissingPath(menu.to_string())),
        };
        self.menus.insert(
            menu.to_string(),
            MenuItem {
                title: label.into(),
                path,
                order,
            },
        );
        Ok(self)
    }

    /// The absolute path this module answers to.
    ///
    /// Pathless modules are transparent and share the base url of their parent.
    pub fn full_path(&self) -> String {
        match &self.path {
            Some(path) => normalize(&self.resolve(path)),
            None => normalize(&self.base_url),
        }
    }

    /// Build the route subtree rooted at this module.
    pub fn routes(&self) -> RouteNode {
        RouteNode {
            path: self.path.clone(),
            full_path: self.full_path(),
            title: self.title.clone(),
            element: self.element.clone(),
            children: self.children.iter().map(Module::routes).collect(),
        }
    }
}

impl ModuleHost for Module {
    fn child(&mut self) -> &mut Module {
        let base_url = match &self.path {
            Some(path) => self.resolve(path),
            None => self.base_url.clone(),
        };
        self.children.push(Module::new(base_url));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Own entry first, then the entries of every child in registration order.
    fn menu_items(&self, menu: &str) -> Vec<MenuItem> {
        self.menus
            .get(menu)
            .cloned()
            .into_iter()
            .chain(self.children.iter().flat_map(|child| child.menu_items(menu)))
            .collect()
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("title", &self.title)
            .field("element", &self.element)
            .field("children", &self.children)
            .field("menus", &self.menus)
            .finish()
    }
}
