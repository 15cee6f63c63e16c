/// One entry of a named menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub title: String,
    pub path: String,
    pub order: i32,
}

/// Keyboard selection over a flat list of menu items.
///
/// This is what the sidebar turns into inside a single window: the shell
/// steps through the entries and navigates to the selected path.
#[derive(Clone, Debug, Default)]
pub struct MenuState {
    items: Vec<MenuItem>,
    selected: Option<usize>,
}

impl MenuState {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self {
            items,
            selected: None,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<&MenuItem> {
        self.selected.and_then(|idx| self.items.get(idx))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Select the first entry pointing at `path`. Unknown paths clear the selection.
    pub fn select_path(&mut self, path: &str) -> Option<&MenuItem> {
        self.selected = self.items.iter().position(|item| item.path == path);
        self.selected()
    }

    pub fn select_index(&mut self, idx: usize) -> Option<&MenuItem> {
        if idx < self.items.len() {
            self.selected = Some(idx);
        }
        self.selected()
    }

    pub fn next(&mut self) -> Option<&MenuItem> {
        if self.items.is_empty() {
            return None;
        }
        self.selected = Some(match self.selected {
            Some(idx) => (idx + 1) % self.items.len(),
            None => 0,
        });
        self.selected()
    }

    pub fn prev(&mut self) -> Option<&MenuItem> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len();
        self.selected = Some(match self.selected {
            Some(idx) => (idx + len - 1) % len,
            None => len - 1,
        });
        self.selected()
    }
}
