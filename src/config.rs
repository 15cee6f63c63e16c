//! Shell settings, read from an optional TOML file.
//!
//! ```toml
//! title = "Three.js Journey"
//! default_route = "/intrinsic"
//! width = 1280
//! height = 720
//! ```
//!
//! Every field is optional; missing ones keep their [`Default`].

use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Window title, followed by the current lesson.
    pub title: String,
    /// Where `/` and unknown routes lead.
    pub default_route: String,
    pub width: u32,
    pub height: u32,
    /// Which named menu the shell cycles through.
    pub menu: String,
    /// Defaults to the `assets/` directory of the source tree.
    pub assets_dir: String,
    pub vsync: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "Three.js Journey".to_string(),
            default_route: "/intrinsic".to_string(),
            width: 1280,
            height: 720,
            menu: "main".to_string(),
            assets_dir: crate::resources::BUILT_ASSETS_DIR.to_string(),
            vsync: true,
        }
    }
}

impl ShellConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("could not read {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_keep_defaults() {
        let config = ShellConfig::from_toml("default_route = \"/geometry\"\nvsync = false").unwrap();
        assert_eq!(config.default_route, "/geometry");
        assert!(!config.vsync);
        assert_eq!(config.title, "Three.js Journey");
        assert_eq!((config.width, config.height), (1280, 720));
    }

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(ShellConfig::from_toml("").unwrap(), ShellConfig::default());
    }

    #[test]
    fn assets_are_found_from_any_working_directory() {
        let dir = Path::new(&ShellConfig::default().assets_dir).to_path_buf();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("assets"));
        assert_eq!(dir.parent(), Some(Path::new(env!("CARGO_MANIFEST_DIR"))));

        let config = ShellConfig::from_toml("assets_dir = \"/srv/journey\"").unwrap();
        assert_eq!(config.assets_dir, "/srv/journey");
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(ShellConfig::from_toml("width = \"wide\"").is_err());
    }

    #[test]
    fn survives_a_round_trip_through_toml() {
        let config = ShellConfig {
            menu: "extra".into(),
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ShellConfig::from_toml(&text).unwrap(), config);
    }
}
