use crate::{app::AppConstructor, architecture::RouteError};

/// What a route shows once it is matched.
#[derive(Clone)]
pub enum Element {
    /// A page frame around nested routes, optionally redirecting its own path.
    Layout(Layout),
    /// An interactive lesson.
    App(AppConstructor),
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layout(layout) => f.debug_tuple("Layout").field(layout).finish(),
            Self::App(_) => f.write_str("App(..)"),
        }
    }
}

impl From<Layout> for Element {
    fn from(layout: Layout) -> Self {
        Self::Layout(layout)
    }
}

impl From<AppConstructor> for Element {
    fn from(constructor: AppConstructor) -> Self {
        Self::App(constructor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub heading: String,
    pub default_path: Option<String>,
}

impl Layout {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            default_path: None,
        }
    }

    pub fn with_default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = Some(path.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct RouteNode {
    /// The path as it was set on the module.
    pub path: Option<String>,
    pub full_path: String,
    pub title: Option<String>,
    pub element: Option<Element>,
    pub children: Vec<RouteNode>,
}

/// Result of resolving a location against the [`RouteTree`].
#[derive(Clone, Debug)]
pub enum RouteMatch {
    /// The location belongs to a lesson.
    App {
        path: String,
        title: Option<String>,
        heading: Option<String>,
        constructor: AppConstructor,
    },
    /// The location is a layout with a default child; navigate there instead.
    Redirect { from: String, to: String },
    /// The location is a bare layout.
    Layout { path: String, layout: Layout },
}

#[derive(Clone, Debug, Default)]
pub struct RouteTree {
    pub roots: Vec<RouteNode>,
}

impl RouteTree {
    /// Find the route for `location`.
    ///
    /// The deepest node whose absolute path equals the normalized location
    /// wins. Titles and the layout heading are inherited from the closest
    /// ancestor that defines them.
    pub fn resolve(&self, location: &str) -> Result<RouteMatch, RouteError> {
        let location = normalize(location);
        let mut chain = Vec::new();
        if !find(&self.roots, &location, &mut chain) {
            return Err(RouteError::NotFound(location));
        }

        let title = chain.iter().rev().find_map(|node| node.title.clone());
        let heading = chain.iter().rev().find_map(|node| match &node.element {
            Some(Element::Layout(layout)) => Some(layout.heading.clone()),
            _ => None,
        });
        // find() only succeeds with at least one node in the chain
        let Some(target) = chain.last() else {
            return Err(RouteError::NotFound(location));
        };
        match &target.element {
            Some(Element::App(constructor)) => Ok(RouteMatch::App {
                path: location,
                title,
                heading,
                constructor: constructor.clone(),
            }),
            Some(Element::Layout(layout)) => match &layout.default_path {
                Some(to) if normalize(to) != location => Ok(RouteMatch::Redirect {
                    from: location,
                    to: normalize(to),
                }),
                _ => Ok(RouteMatch::Layout {
                    path: location,
                    layout: layout.clone(),
                }),
            },
            None => Err(RouteError::NotFound(location)),
        }
    }

    /// Every absolute path that leads to a lesson, in registration order.
    pub fn app_paths(&self) -> Vec<String> {
        fn collect(nodes: &[RouteNode], out: &mut Vec<String>) {
            for node in nodes {
                if let Some(Element::App(_)) = node.element {
                    out.push(node.full_path.clone());
                }
                collect(&node.children, out);
            }
        }
        let mut out = Vec::new();
        collect(&self.roots, &mut out);
        out
    }
}

/// Depth-first search that prefers the deepest node carrying an element.
fn find<'a>(nodes: &'a [RouteNode], location: &str, chain: &mut Vec<&'a RouteNode>) -> bool {
    for node in nodes {
        chain.push(node);
        if find(&node.children, location, chain) {
            return true;
        }
        if node.full_path == location && node.element.is_some() {
            return true;
        }
        chain.pop();
    }
    false
}

/// Collapse repeated slashes, force a leading slash and drop a trailing one.
pub fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//intrinsic//"), "/intrinsic");
        assert_eq!(normalize("lessons/a/"), "/lessons/a");
    }

    fn layout_tree() -> RouteTree {
        RouteTree {
            roots: vec![RouteNode {
                path: Some("/".into()),
                full_path: "/".into(),
                title: Some("Root".into()),
                element: Some(Layout::new("Journey").with_default_path("/b").into()),
                children: vec![
                    RouteNode {
                        path: None,
                        full_path: "/".into(),
                        title: None,
                        element: None,
                        children: vec![],
                    },
                    RouteNode {
                        path: Some("/b".into()),
                        full_path: "/b".into(),
                        title: None,
                        element: Some(Layout::new("Inner").into()),
                        children: vec![],
                    },
                ],
            }],
        }
    }

    #[test]
    fn root_layout_redirects_to_its_default() {
        match layout_tree().resolve("/").unwrap() {
            RouteMatch::Redirect { from, to } => {
                assert_eq!(from, "/");
                assert_eq!(to, "/b");
            }
            other => panic!("unexpected match {:?}", other),
        }
    }

    #[test]
    fn bare_layout_is_returned_as_is() {
        match layout_tree().resolve("/b/").unwrap() {
            RouteMatch::Layout { path, layout } => {
                assert_eq!(path, "/b");
                assert_eq!(layout.heading, "Inner");
            }
            other => panic!("unexpected match {:?}", other),
        }
    }

    #[test]
    fn unknown_locations_are_not_found() {
        assert_eq!(
            layout_tree().resolve("/nope").unwrap_err(),
            RouteError::NotFound("/nope".into())
        );
        assert!(RouteTree::default().resolve("/").is_err());
    }
}
