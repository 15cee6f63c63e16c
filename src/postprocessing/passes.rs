use std::any::Any;

use anyhow::Context as _;

use crate::{
    data_structures::texture::{ColorSpace, RenderTarget, Texture, create_screen_sampler},
    pipelines::effect::{EFFECT_PARAMS, EffectUniform, mk_effect_bind_group_layout, mk_effect_pipeline},
    postprocessing::{Pass, PassContext, PassTarget},
};

/// Draws the context's scene into the output.
#[derive(Debug)]
pub struct ScenePass {
    enabled: bool,
}

impl ScenePass {
    pub fn new() -> Self {
        Self { enabled: true }
    }
}

impl Default for ScenePass {
    fn default() -> Self {
        Self::new()
    }
}

impl Pass for ScenePass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        _input: &RenderTarget,
        output: PassTarget<'_>,
    ) -> anyhow::Result<()> {
        let input = ctx.scene.as_mut().context("scene pass rendered without a scene")?;
        match output {
            PassTarget::Buffer(target) => {
                input
                    .renderer
                    .render_to_target(encoder, input.scene, input.camera, target, true)
            }
            PassTarget::Screen { view, size } => {
                input
                    .renderer
                    .render(encoder, input.scene, input.camera, view, size, true)
            }
        }
        Ok(())
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Which texture a [`ShaderPass`] binds to one of its slots.
#[derive(Debug)]
pub enum Source {
    /// The composer's read buffer.
    Read,
    /// A target handed in through [`PassContext::targets`].
    Named(String),
    Texture(Texture),
    /// A transparent placeholder.
    Empty,
}

/// A full screen effect: one fragment shader over the input texture.
///
/// The shader sees `t_input`, `t_aux` and `effect.params`, eight `vec4`s
/// the pass uploads before every draw.
#[derive(Debug)]
pub struct ShaderPass {
    label: String,
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    uniform: wgpu::Buffer,
    sampler: wgpu::Sampler,
    empty: Texture,
    pub params: [[f32; 4]; EFFECT_PARAMS],
    pub input: Source,
    pub aux: Source,
    /// When set, `params[slot].xy` receives the output size before each draw.
    pub resolution: Option<usize>,
    enabled: bool,
}

impl ShaderPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        label: &str,
        fragment: &str,
    ) -> Self {
        Self::with_blend(device, queue, format, label, fragment, None)
    }

    pub fn with_blend(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        label: &str,
        fragment: &str,
        blend: Option<wgpu::BlendState>,
    ) -> Self {
        let layout = mk_effect_bind_group_layout(device);
        let pipeline = mk_effect_pipeline(device, &layout, format, blend, label, fragment);
        let uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} params", label)),
            size: std::mem::size_of::<EffectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            label: label.to_string(),
            pipeline,
            layout,
            uniform,
            sampler: create_screen_sampler(device),
            empty: Texture::solid(device, queue, [0, 0, 0, 0], ColorSpace::Linear, "empty"),
            params: [[0.0; 4]; EFFECT_PARAMS],
            input: Source::Read,
            aux: Source::Empty,
            resolution: None,
            enabled: true,
        }
    }

    pub fn with_params(mut self, params: &[[f32; 4]]) -> Self {
        for (slot, value) in self.params.iter_mut().zip(params) {
            *slot = *value;
        }
        self
    }

    pub fn with_input(mut self, input: Source) -> Self {
        self.input = input;
        self
    }

    pub fn with_aux(mut self, aux: Source) -> Self {
        self.aux = aux;
        self
    }

    pub fn with_resolution(mut self, slot: usize) -> Self {
        self.resolution = Some(slot.min(EFFECT_PARAMS - 1));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn view<'v>(&'v self, source: &'v Source, read: &'v RenderTarget, ctx: &PassContext<'v>) -> anyhow::Result<&'v wgpu::TextureView> {
        Ok(match source {
            Source::Read => read.view(),
            Source::Named(name) => ctx
                .target(name)
                .with_context(|| format!("{}: no target named {:?}", self.label, name))?
                .view(),
            Source::Texture(texture) => &texture.view,
            Source::Empty => &self.empty.view,
        })
    }

    /// Draw the effect from `input`/`aux` into `output`.
    pub fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        input: &wgpu::TextureView,
        aux: &wgpu::TextureView,
        output: &wgpu::TextureView,
    ) {
        queue.write_buffer(
            &self.uniform,
            0,
            bytemuck::cast_slice(&[EffectUniform { params: self.params }]),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(input),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(aux),
                },
            ],
            label: Some(&self.label),
        });
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&self.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

impl Pass for ShaderPass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &RenderTarget,
        output: PassTarget<'_>,
    ) -> anyhow::Result<()> {
        if let Some(slot) = self.resolution {
            let (width, height) = output.size();
            self.params[slot][0] = width as f32;
            self.params[slot][1] = height as f32;
        }
        let source = self.view(&self.input, input, ctx)?;
        let aux = self.view(&self.aux, input, ctx)?;
        self.draw(ctx.device, ctx.queue, encoder, source, aux, output.view());
        Ok(())
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Copies the read buffer into a target of its own, leaving the chain as is.
#[derive(Debug)]
pub struct SavePass {
    name: String,
    target: RenderTarget,
    enabled: bool,
}

impl SavePass {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: (u32, u32), name: &str) -> Self {
        Self {
            name: name.to_string(),
            target: RenderTarget::new(device, size.0, size.1, format, name),
            enabled: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }
}

impl Pass for SavePass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &RenderTarget,
        _output: PassTarget<'_>,
    ) -> anyhow::Result<()> {
        if input.size() != self.target.size() {
            let (width, height) = input.size();
            self.target.resize(ctx.device, width, height);
        }
        let (width, height) = input.size();
        encoder.copy_texture_to_texture(
            input.color.texture.as_image_copy(),
            self.target.color.texture.as_image_copy(),
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn needs_swap(&self) -> bool {
        false
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.target.resize(device, width, height);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
