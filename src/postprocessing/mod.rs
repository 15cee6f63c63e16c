//! Postprocessing: chains of full screen passes over offscreen targets.
//!
//! An [`EffectComposer`] owns two [`RenderTarget`]s, the read and the write
//! buffer. Each enabled [`Pass`] reads the read buffer and draws into the
//! write buffer; passes that [`needs_swap`](Pass::needs_swap) then swap the
//! two so the next pass sees their result. With `render_to_screen` the last
//! enabled pass draws straight into the frame instead.
//!
//! The order of reads and writes is computed by [`schedule`], which knows
//! nothing about the GPU.

pub mod effects;
pub mod layer;
pub mod passes;

use std::any::Any;

use crate::{
    camera::PerspectiveCamera,
    data_structures::{scene::Scene, texture::RenderTarget},
    render::SceneRenderer,
};

/// The scene a [`passes::ScenePass`] draws, with the renderer to draw it.
pub struct SceneInput<'a> {
    pub renderer: &'a mut SceneRenderer,
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
}

/// What every pass may use while rendering.
pub struct PassContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    /// Milliseconds since the app started.
    pub time: f64,
    pub scene: Option<SceneInput<'a>>,
    /// Targets produced elsewhere (layers, save passes), looked up by name.
    pub targets: &'a [(&'a str, &'a RenderTarget)],
}

impl<'a> PassContext<'a> {
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue, time: f64) -> Self {
        Self {
            device,
            queue,
            time,
            scene: None,
            targets: &[],
        }
    }

    pub fn with_scene(mut self, renderer: &'a mut SceneRenderer, scene: &'a Scene, camera: &'a PerspectiveCamera) -> Self {
        self.scene = Some(SceneInput {
            renderer,
            scene,
            camera,
        });
        self
    }

    pub fn with_targets(mut self, targets: &'a [(&'a str, &'a RenderTarget)]) -> Self {
        self.targets = targets;
        self
    }

    pub fn target(&self, name: &str) -> Option<&'a RenderTarget> {
        self.targets.iter().find(|(n, _)| *n == name).map(|(_, t)| *t)
    }
}

/// Where a pass draws.
#[derive(Clone, Copy)]
pub enum PassTarget<'a> {
    Buffer(&'a RenderTarget),
    Screen {
        view: &'a wgpu::TextureView,
        size: (u32, u32),
    },
}

impl<'a> PassTarget<'a> {
    pub fn view(&self) -> &'a wgpu::TextureView {
        match self {
            PassTarget::Buffer(target) => target.view(),
            PassTarget::Screen { view, .. } => view,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        match self {
            PassTarget::Buffer(target) => target.size(),
            PassTarget::Screen { size, .. } => *size,
        }
    }
}

/// One step of an [`EffectComposer`].
pub trait Pass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &RenderTarget,
        output: PassTarget<'_>,
    ) -> anyhow::Result<()>;

    fn enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);

    /// Whether the composer swaps read and write buffers after this pass.
    fn needs_swap(&self) -> bool {
        true
    }

    fn resize(&mut self, _device: &wgpu::Device, _width: u32, _height: u32) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Buffer {
    A,
    B,
}

impl Buffer {
    fn other(self) -> Self {
        match self {
            Buffer::A => Buffer::B,
            Buffer::B => Buffer::A,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Destination {
    Buffer(Buffer),
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Index of the pass in the composer.
    pub pass: usize,
    pub source: Buffer,
    pub destination: Destination,
}

/// Plan a composer run.
///
/// `passes` holds `(enabled, needs_swap)` per pass. Returns the steps in order
/// and the buffer that holds the result afterwards.
pub fn schedule(passes: &[(bool, bool)], render_to_screen: bool, read: Buffer) -> (Vec<Step>, Buffer) {
    let last_enabled = passes.iter().rposition(|(enabled, _)| *enabled);
    let mut read = read;
    let mut steps = Vec::new();
    for (pass, &(enabled, needs_swap)) in passes.iter().enumerate() {
        if !enabled {
            continue;
        }
        let destination = if render_to_screen && Some(pass) == last_enabled {
            Destination::Screen
        } else {
            Destination::Buffer(read.other())
        };
        steps.push(Step {
            pass,
            source: read,
            destination,
        });
        if needs_swap {
            read = read.other();
        }
    }
    (steps, read)
}

/// Handle to a pass added to an [`EffectComposer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassId(usize);

pub struct EffectComposer {
    a: RenderTarget,
    b: RenderTarget,
    read: Buffer,
    passes: Vec<Box<dyn Pass>>,
    pub render_to_screen: bool,
}

impl EffectComposer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        Self {
            a: RenderTarget::new(device, size.0, size.1, format, "composer buffer a"),
            b: RenderTarget::new(device, size.0, size.1, format, "composer buffer b"),
            read: Buffer::A,
            passes: Vec::new(),
            render_to_screen: true,
        }
    }

    pub fn add_pass(&mut self, pass: impl Pass + 'static) -> PassId {
        self.passes.push(Box::new(pass));
        PassId(self.passes.len() - 1)
    }

    pub fn pass<T: Pass + 'static>(&self, id: PassId) -> Option<&T> {
        self.passes.get(id.0)?.as_any().downcast_ref()
    }

    pub fn pass_mut<T: Pass + 'static>(&mut self, id: PassId) -> Option<&mut T> {
        self.passes.get_mut(id.0)?.as_any_mut().downcast_mut()
    }

    pub fn set_enabled(&mut self, id: PassId, enabled: bool) {
        if let Some(pass) = self.passes.get_mut(id.0) {
            pass.set_enabled(enabled);
        }
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// The buffer holding the result of the last run.
    pub fn read_target(&self) -> &RenderTarget {
        self.buffer(self.read)
    }

    fn buffer(&self, buffer: Buffer) -> &RenderTarget {
        match buffer {
            Buffer::A => &self.a,
            Buffer::B => &self.b,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.a.resize(device, width, height);
        self.b.resize(device, width, height);
        for pass in &mut self.passes {
            pass.resize(device, width, height);
        }
    }

    /// Run every enabled pass. `screen` is only drawn into when
    /// `render_to_screen` is set.
    pub fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        screen: Option<(&wgpu::TextureView, (u32, u32))>,
    ) -> anyhow::Result<()> {
        let flags: Vec<(bool, bool)> = self.passes.iter().map(|p| (p.enabled(), p.needs_swap())).collect();
        let to_screen = self.render_to_screen && screen.is_some();
        let (steps, read) = schedule(&flags, to_screen, self.read);
        for step in steps {
            let input = match step.source {
                Buffer::A => &self.a,
                Buffer::B => &self.b,
            };
            let output = match (step.destination, screen) {
                (Destination::Screen, Some((view, size))) => PassTarget::Screen { view, size },
                (Destination::Buffer(Buffer::A), _) | (Destination::Screen, None) => PassTarget::Buffer(&self.a),
                (Destination::Buffer(Buffer::B), _) => PassTarget::Buffer(&self.b),
            };
            self.passes[step.pass].render(ctx, encoder, input, output)?;
        }
        self.read = read;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapping_passes_ping_pong() {
        let (steps, read) = schedule(&[(true, true), (true, true), (true, true)], false, Buffer::A);
        let io: Vec<_> = steps.iter().map(|s| (s.source, s.destination)).collect();
        assert_eq!(
            io,
            vec![
                (Buffer::A, Destination::Buffer(Buffer::B)),
                (Buffer::B, Destination::Buffer(Buffer::A)),
                (Buffer::A, Destination::Buffer(Buffer::B)),
            ]
        );
        assert_eq!(read, Buffer::B);
    }

    #[test]
    fn last_enabled_pass_goes_to_screen() {
        let passes = [(true, true), (true, true), (false, true)];
        let (steps, _) = schedule(&passes, true, Buffer::A);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].destination, Destination::Buffer(Buffer::B));
        assert_eq!(steps[1].pass, 1);
        assert_eq!(steps[1].source, Buffer::B);
        assert_eq!(steps[1].destination, Destination::Screen);
    }

    #[test]
    fn non_swapping_pass_leaves_the_read_buffer() {
        // scene, save, effect
        let passes = [(true, true), (true, false), (true, true)];
        let (steps, read) = schedule(&passes, false, Buffer::A);
        assert_eq!(steps[1].source, Buffer::B);
        assert_eq!(steps[2].source, Buffer::B);
        assert_eq!(steps[2].destination, Destination::Buffer(Buffer::A));
        assert_eq!(read, Buffer::A);
    }

    #[test]
    fn nothing_enabled_means_nothing_scheduled() {
        let (steps, read) = schedule(&[(false, true), (false, false)], true, Buffer::B);
        assert!(steps.is_empty());
        assert_eq!(read, Buffer::B);
        assert!(schedule(&[], false, Buffer::A).0.is_empty());
    }
}
