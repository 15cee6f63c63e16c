use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

use crate::{
    data_structures::{
        material::TextureSet,
        texture::{ColorSpace, Texture},
    },
    resources::load_binary,
};

async fn load_image(file_name: &str) -> anyhow::Result<DynamicImage> {
    let data = load_binary(file_name).await?;
    Ok(image::load_from_memory(&data)?)
}

/// The maps of the door texture set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorMap {
    Color,
    Alpha,
    Height,
    Normal,
    Metalness,
    AmbientOcclusion,
    Roughness,
}

impl DoorMap {
    pub const ALL: [DoorMap; 7] = [
        DoorMap::Color,
        DoorMap::Alpha,
        DoorMap::Height,
        DoorMap::Normal,
        DoorMap::Metalness,
        DoorMap::AmbientOcclusion,
        DoorMap::Roughness,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            DoorMap::Color => "textures/door/color.jpg",
            DoorMap::Alpha => "textures/door/alpha.jpg",
            DoorMap::Height => "textures/door/height.jpg",
            DoorMap::Normal => "textures/door/normal.jpg",
            DoorMap::Metalness => "textures/door/metalness.jpg",
            DoorMap::AmbientOcclusion => "textures/door/ambientOcclusion.jpg",
            DoorMap::Roughness => "textures/door/roughness.jpg",
        }
    }

    pub fn color_space(self) -> ColorSpace {
        match self {
            DoorMap::Color => ColorSpace::Srgb,
            _ => ColorSpace::Linear,
        }
    }
}

/// How far `(x, y)` lies inside the door panel, from 0 at the frame edge.
fn door_inset(x: u32, y: u32, size: u32) -> f32 {
    let s = size as f32;
    let u = (x as f32 + 0.5) / s;
    let v = (y as f32 + 0.5) / s;
    let dx = (u - 0.5).abs();
    let dy = (v - 0.5).abs();
    (0.32 - dx).min(0.45 - dy)
}

/// A stand in image for a door map, drawn when the file can't be loaded.
pub fn fallback_door_map(map: DoorMap, size: u32) -> RgbaImage {
    let size = size.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        let inset = door_inset(x, y, size);
        let inside = inset > 0.0;
        // two raised panels, split at half height
        let v = (y as f32 + 0.5) / size as f32;
        let panel = inset > 0.05 && (v - 0.5).abs() > 0.02;
        let gray = |value: f32| {
            let g = (value.clamp(0.0, 1.0) * 255.0) as u8;
            Rgba([g, g, g, 255])
        };
        match map {
            DoorMap::Color => {
                let grain = ((x as f32 * 0.35).sin() * 0.5 + 0.5) * 18.0;
                let base = if panel { 120.0 } else { 95.0 };
                let r = base + grain;
                Rgba([r as u8, (r * 0.62) as u8, (r * 0.38) as u8, 255])
            }
            DoorMap::Alpha => gray(if inside { 1.0 } else { 0.0 }),
            DoorMap::Height => gray(if panel { 0.7 } else if inside { 0.4 } else { 0.0 }),
            DoorMap::Normal => Rgba([127, 127, 255, 255]),
            DoorMap::Metalness => gray(0.0),
            DoorMap::AmbientOcclusion => gray(if inside { 1.0 - (0.05 - inset).max(0.0) * 8.0 } else { 0.6 }),
            DoorMap::Roughness => gray(if panel { 0.55 } else { 0.8 }),
        }
    })
}

/// The door texture set on the GPU, plus the height map the geometry is
/// displaced with.
pub struct DoorTextures {
    pub set: TextureSet,
    pub height: GrayImage,
}

const FALLBACK_SIZE: u32 = 256;

async fn load_door_map(map: DoorMap) -> DynamicImage {
    match load_image(map.file_name()).await {
        Ok(image) => image,
        Err(e) => {
            log::warn!("{:#}; drawing a placeholder instead", e);
            DynamicImage::ImageRgba8(fallback_door_map(map, FALLBACK_SIZE))
        }
    }
}

/// Load every door map, substituting a generated image for each file that is
/// missing or broken.
pub async fn load_door_textures(device: &wgpu::Device, queue: &wgpu::Queue) -> DoorTextures {
    let mut upload = Vec::with_capacity(DoorMap::ALL.len());
    let mut height = GrayImage::from_pixel(1, 1, Luma([0]));
    for map in DoorMap::ALL {
        let image = load_door_map(map).await;
        if map == DoorMap::Height {
            height = image.to_luma8();
        } else {
            upload.push((map, image));
        }
    }
    let texture = |map: DoorMap| -> Texture {
        match upload.iter().find(|(m, _)| *m == map) {
            Some((_, image)) => Texture::from_image(device, queue, image, Some(map.file_name()), map.color_space()),
            None => Texture::solid(device, queue, [255; 4], map.color_space(), map.file_name()),
        }
    };
    let set = TextureSet {
        color: texture(DoorMap::Color),
        alpha: texture(DoorMap::Alpha),
        normal: texture(DoorMap::Normal),
        metalness: texture(DoorMap::Metalness),
        roughness: texture(DoorMap::Roughness),
        ambient_occlusion: texture(DoorMap::AmbientOcclusion),
    };
    DoorTextures { set, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_door_is_cut_out() {
        let alpha = fallback_door_map(DoorMap::Alpha, 64);
        assert_eq!(alpha.get_pixel(32, 32).0[1], 255);
        assert_eq!(alpha.get_pixel(0, 0).0[1], 0);
        assert_eq!(alpha.dimensions(), (64, 64));
    }

    #[test]
    fn fallback_maps_have_neutral_defaults() {
        assert_eq!(fallback_door_map(DoorMap::Normal, 8).get_pixel(3, 3).0, [127, 127, 255, 255]);
        assert_eq!(fallback_door_map(DoorMap::Metalness, 8).get_pixel(3, 3).0[0], 0);
        let height = fallback_door_map(DoorMap::Height, 64);
        assert!(height.get_pixel(32, 16).0[0] > height.get_pixel(0, 0).0[0]);
    }

    #[test]
    fn only_the_color_map_is_srgb() {
        for map in DoorMap::ALL {
            assert_eq!(map.color_space() == ColorSpace::Srgb, map == DoorMap::Color);
            assert!(map.file_name().starts_with("textures/door/"));
        }
    }
}
