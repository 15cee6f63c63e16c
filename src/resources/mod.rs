//! Loading files and textures from the assets directory.
//!
//! Natively assets are read from disk relative to [`assets_dir`]. On the web
//! they are fetched from `<origin>/assets/`.

pub mod texture;

#[cfg(not(target_arch = "wasm32"))]
use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

/// The `assets/` directory of the source tree this crate was built from.
pub const BUILT_ASSETS_DIR: &str = env!("SCENE_JOURNEY_ASSETS");

#[cfg(not(target_arch = "wasm32"))]
static ASSETS_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Set where native builds look for assets. Only the first call has an effect.
#[cfg(not(target_arch = "wasm32"))]
pub fn set_assets_dir(dir: impl Into<PathBuf>) {
    let dir = dir.into();
    if ASSETS_DIR.set(dir.clone()).is_err() {
        log::warn!("assets directory already set, ignoring {}", dir.display());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn assets_dir() -> &'static Path {
    ASSETS_DIR.get_or_init(|| PathBuf::from(BUILT_ASSETS_DIR))
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    use anyhow::{Context as _, anyhow};

    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("no origin: {:?}", e))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name.trim_start_matches('/'))?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        let response = reqwest::get(url).await?.error_for_status()?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        use anyhow::Context as _;

        let path = assets_dir().join(file_name.trim_start_matches('/'));
        std::fs::read(&path).with_context(|| format!("could not read {}", path.display()))?
    };

    Ok(data)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn missing_files_are_errors() {
        let result = futures::executor::block_on(load_binary("textures/does-not-exist.png"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("does-not-exist.png"));
    }
}
