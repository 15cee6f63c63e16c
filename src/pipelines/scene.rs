//! Uniforms, bind group layouts and shaders for drawing scene objects.
//!
//! Every scene pipeline shares the same first two groups:
//!
//! - group 0 holds the [`SceneUniform`] (camera and lights)
//! - group 1 holds one [`ObjectUniform`] at a dynamic offset
//!
//! The standard material adds its texture set as group 2.

use cgmath::{Matrix4, Vector3};

use crate::{
    camera::{CameraUniform, PerspectiveCamera},
    data_structures::{
        geometry::{MeshVertex, Vertex},
        material::{Material, MaterialKind},
        scene::Scene,
        texture::Texture,
        transform::normal_matrix,
    },
    pipelines::basic::{RasterState, mk_render_pipeline},
};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    /// Direction towards the light, `w` unused.
    pub light_dir: [f32; 4],
    /// Colour already multiplied by the intensity.
    pub light_color: [f32; 4],
    pub ambient: [f32; 4],
}

impl SceneUniform {
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let (light_dir, light_color) = match scene.directional {
            Some(light) => (
                light.direction(),
                light.color.multiply_scalar(light.intensity).to_array(),
            ),
            None => (Vector3::unit_y(), [0.0; 3]),
        };
        let ambient = scene.ambient.multiply_scalar(scene.ambient_intensity).to_array();
        let mut view = CameraUniform::new();
        view.update_view_proj(camera);
        Self {
            view_proj: view.view_proj,
            eye: view.view_position,
            light_dir: light_dir.extend(0.0).into(),
            light_color: [light_color[0], light_color[1], light_color[2], 1.0],
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Matrix4<f32>, material: &Material) -> Self {
        Self {
            model: model.into(),
            normal: normal_matrix(&model).into(),
            color: material.rgba(),
            params: material.params,
        }
    }
}

/// Distance between two object uniforms in the dynamic buffer.
pub fn object_stride(device: &wgpu::Device) -> wgpu::BufferAddress {
    let align = device.limits().min_uniform_buffer_offset_alignment as wgpu::BufferAddress;
    let size = std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress;
    size.div_ceil(align) * align
}

pub fn mk_scene_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("scene_bind_group_layout"),
    })
}

pub fn mk_object_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
            },
            count: None,
        }],
        label: Some("object_bind_group_layout"),
    })
}

pub fn mk_texture_set_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let sampler = |binding: u32| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            // color, alpha, normal, metalness, roughness, ambient occlusion
            texture(0),
            texture(1),
            texture(2),
            texture(3),
            texture(4),
            texture(5),
            sampler(6),
            sampler(7),
        ],
        label: Some("texture_set_bind_group_layout"),
    })
}

/// The three layouts every scene pipeline is built from.
#[derive(Debug)]
pub struct SceneLayouts {
    pub scene: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub textures: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            scene: mk_scene_bind_group_layout(device),
            object: mk_object_bind_group_layout(device),
            textures: mk_texture_set_layout(device),
        }
    }
}

fn shader_for(kind: MaterialKind) -> wgpu::ShaderModuleDescriptor<'static> {
    match kind {
        MaterialKind::Basic => wgpu::ShaderModuleDescriptor {
            label: Some("Basic Shader"),
            source: wgpu::ShaderSource::Wgsl(concat!(include_str!("scene_common.wgsl"), include_str!("basic.wgsl")).into()),
        },
        MaterialKind::Standard => wgpu::ShaderModuleDescriptor {
            label: Some("Standard Shader"),
            source: wgpu::ShaderSource::Wgsl(
                concat!(include_str!("scene_common.wgsl"), include_str!("standard.wgsl")).into(),
            ),
        },
        MaterialKind::Dots => wgpu::ShaderModuleDescriptor {
            label: Some("Dots Shader"),
            source: wgpu::ShaderSource::Wgsl(concat!(include_str!("scene_common.wgsl"), include_str!("dots.wgsl")).into()),
        },
    }
}

pub fn mk_scene_pipeline(
    device: &wgpu::Device,
    layouts: &SceneLayouts,
    kind: MaterialKind,
    color_format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    raster: RasterState,
) -> wgpu::RenderPipeline {
    let bind_group_layouts: &[&wgpu::BindGroupLayout] = match kind {
        MaterialKind::Standard => &[&layouts.scene, &layouts.object, &layouts.textures],
        MaterialKind::Basic | MaterialKind::Dots => &[&layouts.scene, &layouts.object],
    };
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Scene Pipeline Layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });
    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(blend),
        Some(Texture::DEPTH_FORMAT),
        &[MeshVertex::desc()],
        shader_for(kind),
        raster,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_keep_wgsl_alignment() {
        assert_eq!(std::mem::size_of::<SceneUniform>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 160);
    }

    #[test]
    fn lights_are_premultiplied() {
        let mut scene = Scene::default();
        scene.ambient_light(crate::math::color::Color::WHITE, 0.5);
        scene.directional_light(crate::math::color::Color::WHITE, 2.0, Vector3::new(0.0, 0.0, 4.0));
        let uniform = SceneUniform::new(&scene, &PerspectiveCamera::default());
        assert_eq!(uniform.ambient, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(uniform.light_color, [2.0, 2.0, 2.0, 1.0]);
        assert_eq!(uniform.light_dir, [0.0, 0.0, 1.0, 0.0]);
        assert_eq!(uniform.eye, [0.0, 0.0, 1.0, 1.0]);
    }
}
