use crate::data_structures::texture::RenderTarget;

/// A stage that renders itself into a target another pass samples later.
pub trait Layer {
    fn update(&mut self, encoder: &mut wgpu::CommandEncoder, time: f64) -> anyhow::Result<()>;

    /// The target holding the last [`update`](Layer::update).
    fn output(&self) -> &RenderTarget;

    fn resize(&mut self, width: u32, height: u32);
}
