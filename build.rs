use anyhow::*;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    // Default asset directory: `assets/` next to Cargo.toml.
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets = manifest_dir.join("assets");
    println!("cargo:rustc-env=SCENE_JOURNEY_ASSETS={}", assets.display());

    Ok(())
}
