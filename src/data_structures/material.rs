//! Surface descriptions for scene objects.

use std::sync::Arc;

use crate::{data_structures::texture::Texture, math::color::Color};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Unlit flat colour, multiplied with the vertex colour.
    #[default]
    Basic,
    /// Lit by the scene lights, sampled from a [`MaterialTextures`] set.
    Standard,
    /// Flat colour with fragments randomly discarded by `params[0]`.
    Dots,
}

/// Which faces get drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

/// The images a [`MaterialKind::Standard`] material samples.
pub struct TextureSet {
    pub color: Texture,
    pub alpha: Texture,
    pub normal: Texture,
    pub metalness: Texture,
    pub roughness: Texture,
    pub ambient_occlusion: Texture,
}

/// A texture set bound for the standard pipeline.
#[derive(Debug)]
pub struct MaterialTextures {
    pub bind_group: wgpu::BindGroup,
}

impl MaterialTextures {
    /// Bind `set` against the standard pipeline's texture layout.
    ///
    /// `linear` samples every map, `nearest` only the colour map.
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        set: &TextureSet,
        linear: &wgpu::Sampler,
        nearest: &wgpu::Sampler,
    ) -> Self {
        fn view(binding: u32, texture: &Texture) -> wgpu::BindGroupEntry<'_> {
            wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            }
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                view(0, &set.color),
                view(1, &set.alpha),
                view(2, &set.normal),
                view(3, &set.metalness),
                view(4, &set.roughness),
                view(5, &set.ambient_occlusion),
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: wgpu::BindingResource::Sampler(linear),
                },
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: wgpu::BindingResource::Sampler(nearest),
                },
            ],
            label: Some("material_textures"),
        });
        Self { bind_group }
    }
}

#[derive(Clone, Debug)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
    pub wireframe: bool,
    pub depth_write: bool,
    /// Kind specific values. Dots: `[fraction, ..]`. Standard:
    /// `[ao_intensity, metalness, roughness, ..]`.
    pub params: [f32; 4],
    pub textures: Option<Arc<MaterialTextures>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Basic,
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
            wireframe: false,
            depth_write: true,
            params: [0.0; 4],
            textures: None,
        }
    }
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    pub fn standard(textures: Arc<MaterialTextures>) -> Self {
        Self {
            kind: MaterialKind::Standard,
            params: [1.0, 1.0, 1.0, 0.0],
            textures: Some(textures),
            ..Default::default()
        }
    }

    pub fn dots(color: Color, fraction: f32) -> Self {
        Self {
            kind: MaterialKind::Dots,
            color,
            params: [fraction, 0.0, 0.0, 0.0],
            ..Default::default()
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    /// Blend with what is behind, sorted back to front.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self.transparent = true;
        self
    }

    pub fn with_depth_write(mut self, depth_write: bool) -> Self {
        self.depth_write = depth_write;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn blend_state(&self) -> wgpu::BlendState {
        if self.transparent {
            wgpu::BlendState::ALPHA_BLENDING
        } else {
            wgpu::BlendState::REPLACE
        }
    }

    /// Straight alpha colour handed to shaders.
    pub fn rgba(&self) -> [f32; 4] {
        self.color.to_rgba(self.opacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sides_map_to_cull_modes() {
        assert_eq!(Side::Front.cull_mode(), Some(wgpu::Face::Back));
        assert_eq!(Side::Back.cull_mode(), Some(wgpu::Face::Front));
        assert_eq!(Side::Double.cull_mode(), None);
    }

    #[test]
    fn opacity_makes_a_material_transparent() {
        let opaque = Material::basic(Color::from_hex(0x336699));
        assert!(!opaque.is_transparent());
        assert_eq!(opaque.blend_state(), wgpu::BlendState::REPLACE);

        let faded = opaque.clone().with_opacity(0.5);
        assert!(faded.is_transparent());
        assert_eq!(faded.rgba()[3], 0.5);
        assert_eq!(faded.blend_state(), wgpu::BlendState::ALPHA_BLENDING);
    }

    #[test]
    fn dots_store_the_fraction() {
        let m = Material::dots(Color::WHITE, 0.25);
        assert_eq!(m.kind, MaterialKind::Dots);
        assert_eq!(m.params[0], 0.25);
    }
}
