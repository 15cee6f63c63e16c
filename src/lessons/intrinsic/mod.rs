//! The "intrinsic" series: curves, effects, shaders and layered rendering.

pub mod cubes;
pub mod dots;
pub mod layer;
pub mod layers;
pub mod ribbons;
pub mod shape;

use crate::{
    app::AppConstructor,
    architecture::{ModuleHost, RouteError},
    lessons::lesson,
};

pub fn feature(host: &mut dyn ModuleHost) -> Result<(), RouteError> {
    lesson(
        host,
        "/intrinsic",
        "Intrinsic",
        "Intrinsic 1 | Cube",
        AppConstructor::new(|ctx| async move { anyhow::Ok(cubes::Cubes::new(&ctx)) }),
    )?;
    lesson(
        host,
        "/intrinsic-2",
        "Intrinsic 2",
        "Intrinsic 2 | Postprocessing",
        AppConstructor::new(|ctx| async move { anyhow::Ok(ribbons::Ribbons::new(&ctx)) }),
    )?;
    lesson(
        host,
        "/intrinsic-3",
        "Intrinsic 3",
        "Intrinsic 3 | Shader",
        AppConstructor::new(|ctx| async move { anyhow::Ok(dots::Dots::new(&ctx)) }),
    )?;
    lesson(
        host,
        "/intrinsic-4",
        "Intrinsic 4",
        "Intrinsic 4 | Layers",
        AppConstructor::new(|ctx| async move { anyhow::Ok(layers::Layers::new(&ctx)) }),
    )?;
    lesson(
        host,
        "/intrinsic-5",
        "Intrinsic 5",
        "Intrinsic 5 | 3D Shape",
        AppConstructor::new(|ctx| async move { anyhow::Ok(shape::Shape::new(&ctx)) }),
    )
}
