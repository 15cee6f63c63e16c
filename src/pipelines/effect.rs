//! Full screen effect pipelines.
//!
//! An effect is a fragment shader appended to `fullscreen.wgsl`. It reads
//! `t_input`, an optional `t_aux` texture and eight `vec4` parameters.

use std::borrow::Cow;

use crate::pipelines::basic::{RasterState, mk_render_pipeline};

pub const EFFECT_PARAMS: usize = 8;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EffectUniform {
    pub params: [[f32; 4]; EFFECT_PARAMS],
}

pub fn mk_effect_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            texture(0),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            texture(3),
        ],
        label: Some("effect_bind_group_layout"),
    })
}

/// Build an effect pipeline from the fragment part of its shader.
pub fn mk_effect_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    label: &str,
    fragment: &str,
) -> wgpu::RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Effect Pipeline Layout"),
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    let source = format!("{}{}", include_str!("fullscreen.wgsl"), fragment);
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
    };
    mk_render_pipeline(
        device,
        &pipeline_layout,
        color_format,
        blend,
        None,
        &[],
        shader,
        RasterState::FULLSCREEN,
    )
}
