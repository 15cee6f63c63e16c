//! Drawing a [`Scene`] through a [`PerspectiveCamera`].
//!
//! [`SceneRenderer`] uploads the camera and lights once per call and every
//! visible object's uniforms into one dynamic-offset buffer, then records a
//! single render pass:
//!
//! 1. opaque objects in insertion order
//! 2. transparent objects sorted back to front by view depth
//!
//! It can draw into the window surface or into any [`RenderTarget`].
//! Uniforms go through `Queue::write_buffer`, so a renderer draws one scene
//! per submission; layers that draw their own scene own their own renderer.

use std::sync::Arc;

use cgmath::{Matrix4, Vector4};
use wgpu::util::DeviceExt;

use crate::{
    camera::PerspectiveCamera,
    context::InitContext,
    data_structures::{
        material::{Material, MaterialKind, MaterialTextures, TextureSet},
        mesh::Mesh,
        scene::Scene,
        texture::{RenderTarget, Texture, create_default_sampler, create_nearest_sampler},
    },
    pipelines::{
        cache::{PipelineCache, PipelineKey},
        scene::{ObjectUniform, SceneUniform, object_stride},
    },
};

/// One object ready to be recorded.
struct Draw {
    key: PipelineKey,
    mesh: Arc<Mesh>,
    wireframe: bool,
    textures: Option<Arc<MaterialTextures>>,
    uniform: ObjectUniform,
    view_depth: f32,
}

/// Order opaque draws first, then transparent ones from far to near.
///
/// `items` holds `(transparent, view_depth)` per draw; the result indexes it.
pub fn draw_order(items: &[(bool, f32)]) -> Vec<usize> {
    let mut opaque: Vec<usize> = (0..items.len()).filter(|&i| !items[i].0).collect();
    let mut transparent: Vec<usize> = (0..items.len()).filter(|&i| items[i].0).collect();
    transparent.sort_by(|&a, &b| items[b].1.total_cmp(&items[a].1));
    opaque.append(&mut transparent);
    opaque
}

pub struct SceneRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    cache: PipelineCache,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_capacity: u64,
    object_stride: u64,
    depth: Option<Texture>,
    linear_sampler: wgpu::Sampler,
    nearest_sampler: wgpu::Sampler,
}

impl SceneRenderer {
    pub fn new(ctx: &InitContext) -> Self {
        let device = &ctx.device;
        let cache = PipelineCache::new(device);
        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[SceneUniform::new(&Scene::default(), &PerspectiveCamera::default())]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &cache.layouts.scene,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });
        let object_stride = object_stride(device);
        let object_capacity = 16;
        let (object_buffer, object_bind_group) =
            Self::mk_object_buffer(device, &cache.layouts.object, object_stride, object_capacity);

        Self {
            device: device.clone(),
            queue: ctx.queue.clone(),
            format: ctx.format,
            cache,
            scene_buffer,
            scene_bind_group,
            object_buffer,
            object_bind_group,
            object_capacity,
            object_stride,
            depth: None,
            linear_sampler: create_default_sampler(device),
            nearest_sampler: create_nearest_sampler(device),
        }
    }

    fn mk_object_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: stride * capacity,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniform>() as u64),
                }),
            }],
            label: Some("object_bind_group"),
        });
        (buffer, bind_group)
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Bind a texture set for [`MaterialKind::Standard`] materials.
    pub fn material_textures(&self, set: &TextureSet) -> Arc<MaterialTextures> {
        Arc::new(MaterialTextures::new(
            &self.device,
            &self.cache.layouts.textures,
            set,
            &self.linear_sampler,
            &self.nearest_sampler,
        ))
    }

    /// Draw into `view` of the given size, e.g. the window surface.
    ///
    /// With `clear` the colour is reset to the scene background first.
    pub fn render(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        camera: &PerspectiveCamera,
        view: &wgpu::TextureView,
        size: (u32, u32),
        clear: bool,
    ) {
        let size = (size.0.max(1), size.1.max(1));
        let stale = self.depth.as_ref().is_none_or(|depth| depth.size() != size);
        if stale {
            self.depth = Some(Texture::create_depth_texture(
                &self.device,
                [size.0, size.1],
                "scene depth",
            ));
        }
        let Some(depth) = self.depth.take() else {
            return;
        };
        self.record(encoder, scene, camera, view, &depth.view, self.format, clear);
        self.depth = Some(depth);
    }

    /// Draw into an offscreen target, using its own depth buffer.
    pub fn render_to_target(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        camera: &PerspectiveCamera,
        target: &RenderTarget,
        clear: bool,
    ) {
        self.record(encoder, scene, camera, target.view(), &target.depth.view, target.format, clear);
    }

    fn collect(&self, scene: &Scene, camera: &PerspectiveCamera, format: wgpu::TextureFormat) -> Vec<Draw> {
        let view_matrix = camera.view_matrix();
        scene
            .iter_visible()
            .filter_map(|(_, object, world)| {
                let mesh = object.mesh.clone()?;
                let material = effective_material(&object.material);
                let (_, _, topology) = mesh.draw_range(material.wireframe);
                let view_depth = view_depth(&view_matrix, &world, &mesh);
                Some(Draw {
                    key: PipelineKey::for_material(format, &material, topology),
                    wireframe: material.wireframe,
                    textures: material.textures.clone(),
                    uniform: ObjectUniform::new(world, &material),
                    view_depth,
                    mesh,
                })
            })
            .collect()
    }

    /// Upload object uniforms at their dynamic offsets, growing the buffer
    /// when the scene outgrew it.
    fn upload_objects(&mut self, draws: &[Draw]) {
        let count = draws.len() as u64;
        if count > self.object_capacity {
            self.object_capacity = count.next_power_of_two();
            log::debug!("growing object uniform buffer to {} entries", self.object_capacity);
            let (buffer, bind_group) = Self::mk_object_buffer(
                &self.device,
                &self.cache.layouts.object,
                self.object_stride,
                self.object_capacity,
            );
            self.object_buffer = buffer;
            self.object_bind_group = bind_group;
        }
        let stride = self.object_stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (i, draw) in draws.iter().enumerate() {
            let raw = bytemuck::bytes_of(&draw.uniform);
            bytes[i * stride..i * stride + raw.len()].copy_from_slice(raw);
        }
        if !bytes.is_empty() {
            self.queue.write_buffer(&self.object_buffer, 0, &bytes);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        scene: &Scene,
        camera: &PerspectiveCamera,
        view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
        format: wgpu::TextureFormat,
        clear: bool,
    ) {
        self.queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[SceneUniform::new(scene, camera)]),
        );
        let draws = self.collect(scene, camera, format);
        self.upload_objects(&draws);
        for draw in &draws {
            self.cache.get_or_create(&self.device, draw.key);
        }
        let order = draw_order(
            &draws
                .iter()
                .map(|d| (d.key.blend != wgpu::BlendState::REPLACE, d.view_depth))
                .collect::<Vec<_>>(),
        );

        let load = if clear {
            wgpu::LoadOp::Clear(scene.clear_color())
        } else {
            wgpu::LoadOp::Load
        };
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
        for i in order {
            let draw = &draws[i];
            let Some(pipeline) = self.cache.get(&draw.key) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            let offset = (i as u64 * self.object_stride) as wgpu::DynamicOffset;
            render_pass.set_bind_group(1, &self.object_bind_group, &[offset]);
            if let (MaterialKind::Standard, Some(textures)) = (draw.key.kind, &draw.textures) {
                render_pass.set_bind_group(2, &textures.bind_group, &[]);
            }
            let (indices, count, _) = draw.mesh.draw_range(draw.wireframe);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..count, 0, 0..1);
        }
    }
}

/// A standard material without textures falls back to a flat colour.
fn effective_material(material: &Material) -> Material {
    if material.kind == MaterialKind::Standard && material.textures.is_none() {
        log::trace!("standard material without textures, drawing it unlit");
        return Material {
            kind: MaterialKind::Basic,
            ..material.clone()
        };
    }
    material.clone()
}

/// Distance in front of the camera of the mesh center.
fn view_depth(view: &Matrix4<f32>, world: &Matrix4<f32>, mesh: &Mesh) -> f32 {
    let center = view * world * Vector4::new(mesh.center.x, mesh.center.y, mesh.center.z, 1.0);
    -center.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_first_then_far_to_near() {
        let items = [(true, 1.0), (false, 5.0), (true, 3.0), (false, 0.5), (true, 2.0)];
        assert_eq!(draw_order(&items), vec![1, 3, 2, 4, 0]);
    }

    #[test]
    fn empty_scene_draws_nothing() {
        assert!(draw_order(&[]).is_empty());
    }

    #[test]
    fn bare_standard_materials_draw_flat() {
        let bare = Material {
            kind: MaterialKind::Standard,
            opacity: 0.5,
            ..Default::default()
        };
        let drawn = effective_material(&bare);
        assert_eq!(drawn.kind, MaterialKind::Basic);
        assert_eq!(drawn.opacity, 0.5);
        assert_eq!(effective_material(&bare).kind, MaterialKind::Basic);

        let basic = Material::default();
        assert_eq!(effective_material(&basic).kind, MaterialKind::Basic);
    }
}
