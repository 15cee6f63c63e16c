//! Ready made effects built on [`ShaderPass`].

use std::{any::Any, f32::consts::PI};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    data_structures::texture::{ColorSpace, RenderTarget, Texture},
    math::color::Color,
    pipelines::effect::EFFECT_PARAMS,
    postprocessing::{
        Pass, PassContext, PassTarget,
        passes::{ShaderPass, Source},
    },
};

/// Edge detection on luminance, sized to the output.
pub fn sobel(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> ShaderPass {
    ShaderPass::new(device, queue, format, "Sobel", include_str!("shaders/sobel.wgsl")).with_resolution(0)
}

/// Halftone dots over the average brightness.
pub fn dot_screen(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> ShaderPass {
    ShaderPass::new(device, queue, format, "Dot Screen", include_str!("shaders/dot_screen.wgsl"))
        .with_params(&[[0.5, 0.5, 1.57, 1.0], [256.0, 256.0, 0.0, 0.0]])
}

/// Encode linear colour as sRGB.
pub fn gamma(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> ShaderPass {
    ShaderPass::new(device, queue, format, "Gamma Correction", include_str!("shaders/gamma.wgsl"))
}

/// Lay `main` over `secondary` over a flat background. Both layers are read
/// from the named targets of the [`PassContext`].
pub fn compose(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    format: wgpu::TextureFormat,
    main: &str,
    secondary: &str,
    background: Color,
) -> ShaderPass {
    ShaderPass::new(device, queue, format, "Compose", include_str!("shaders/compose.wgsl"))
        .with_input(Source::Named(main.to_string()))
        .with_aux(Source::Named(secondary.to_string()))
        .with_params(&[background_param(background)])
}

pub fn background_param(color: Color) -> [f32; 4] {
    let [r, g, b] = color.to_array();
    [r, g, b, 1.0]
}

/// Parameters of one glitch frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlitchUniform {
    pub bypass: f32,
    pub amount: f32,
    pub angle: f32,
    pub seed: f32,
    pub seed_x: f32,
    pub seed_y: f32,
    pub distortion_x: f32,
    pub distortion_y: f32,
    pub column: f32,
}

impl GlitchUniform {
    pub fn to_params(self) -> [[f32; 4]; 3] {
        [
            [self.bypass, self.amount, self.angle, self.seed],
            [self.seed_x, self.seed_y, self.distortion_x, self.distortion_y],
            [self.column, 0.0, 0.0, 0.0],
        ]
    }
}

/// When the glitch fires.
///
/// A strong glitch fires every `trigger` frames, where `trigger` is redrawn
/// from `120..=240` each time. The first fifth of each cycle keeps a weaker
/// glitch, the rest passes the image through. `go_wild` fires every frame.
#[derive(Clone, Debug)]
pub struct GlitchState {
    frame: u32,
    trigger: u32,
    current: GlitchUniform,
}

impl GlitchState {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            frame: 0,
            trigger: rng.random_range(120..=240),
            current: GlitchUniform {
                column: 0.05,
                ..Default::default()
            },
        }
    }

    pub fn trigger(&self) -> u32 {
        self.trigger
    }

    pub fn step(&mut self, rng: &mut impl Rng, go_wild: bool) -> GlitchUniform {
        let u = &mut self.current;
        u.seed = rng.random();
        u.bypass = 0.0;
        let phase = self.frame % self.trigger;
        if phase == 0 || go_wild {
            u.amount = rng.random::<f32>() / 30.0;
            u.angle = rng.random_range(-PI..PI);
            u.seed_x = rng.random_range(-1.0..1.0);
            u.seed_y = rng.random_range(-1.0..1.0);
            u.distortion_x = rng.random_range(0.0..1.0);
            u.distortion_y = rng.random_range(0.0..1.0);
            self.frame = 0;
            self.trigger = rng.random_range(120..=240);
        } else if (phase as f32) < self.trigger as f32 / 5.0 {
            u.amount = rng.random::<f32>() / 90.0;
            u.angle = rng.random_range(-PI..PI);
            u.distortion_x = rng.random_range(0.0..1.0);
            u.distortion_y = rng.random_range(0.0..1.0);
            u.seed_x = rng.random_range(-0.3..0.3);
            u.seed_y = rng.random_range(-0.3..0.3);
        } else {
            u.bypass = 1.0;
        }
        self.frame += 1;
        *u
    }
}

/// Random colour noise used to displace the glitched image.
fn displacement_map(rng: &mut impl Rng, size: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(size, size, |_, _| {
        image::Rgba([rng.random(), rng.random(), rng.random(), 255])
    })
}

/// RGB shift with random displacement on a random schedule.
pub struct GlitchPass {
    shader: ShaderPass,
    state: GlitchState,
    rng: StdRng,
    pub go_wild: bool,
}

impl GlitchPass {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        Self::with_rng(device, queue, format, StdRng::from_os_rng())
    }

    pub fn with_rng(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat, mut rng: StdRng) -> Self {
        let map = image::DynamicImage::ImageRgba8(displacement_map(&mut rng, 64));
        let map = Texture::from_image(device, queue, &map, Some("glitch displacement"), ColorSpace::Linear);
        let shader = ShaderPass::new(device, queue, format, "Glitch", include_str!("shaders/glitch.wgsl"))
            .with_aux(Source::Texture(map));
        Self {
            shader,
            state: GlitchState::new(&mut rng),
            rng,
            go_wild: false,
        }
    }
}

impl Pass for GlitchPass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &RenderTarget,
        output: PassTarget<'_>,
    ) -> anyhow::Result<()> {
        let uniform = self.state.step(&mut self.rng, self.go_wild);
        self.shader.params[..3].copy_from_slice(&uniform.to_params());
        self.shader.render(ctx, encoder, input, output)
    }

    fn enabled(&self) -> bool {
        self.shader.enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.shader.set_enabled(enabled);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Largest kernel the convolution shader can hold.
pub const MAX_KERNEL_SIZE: usize = 25;

/// Normalized gaussian weights covering three sigmas on each side.
pub fn gaussian_kernel(sigma: f32, max_size: usize) -> Vec<f32> {
    let size = (2.0 * (3.0 * sigma).ceil() + 1.0).max(1.0) as usize;
    let size = size.min(max_size.clamp(1, MAX_KERNEL_SIZE));
    let half = (size as f32 - 1.0) * 0.5;
    let mut values: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - half;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = values.iter().sum();
    for v in &mut values {
        *v /= sum;
    }
    values
}

fn convolution_params(increment: [f32; 2], kernel: &[f32]) -> [[f32; 4]; EFFECT_PARAMS] {
    let mut params = [[0.0; 4]; EFFECT_PARAMS];
    params[0] = [increment[0], increment[1], kernel.len() as f32, 0.0];
    for (i, w) in kernel.iter().enumerate() {
        params[1 + i / 4][i % 4] = *w;
    }
    params
}

const BLUR_X: [f32; 2] = [0.001953125, 0.0];
const BLUR_Y: [f32; 2] = [0.0, 0.001953125];

/// Separable gaussian blur at half resolution, added back over the input.
pub struct BloomPass {
    blur_x: ShaderPass,
    blur_y: ShaderPass,
    combine: ShaderPass,
    horizontal: RenderTarget,
    vertical: RenderTarget,
    pub strength: f32,
    enabled: bool,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        size: (u32, u32),
        strength: f32,
        kernel_size: usize,
        sigma: f32,
    ) -> Self {
        let kernel = gaussian_kernel(sigma, kernel_size);
        let convolution = include_str!("shaders/convolution.wgsl");
        let (width, height) = half(size);
        Self {
            blur_x: ShaderPass::new(device, queue, format, "Bloom Blur X", convolution)
                .with_params(&convolution_params(BLUR_X, &kernel)),
            blur_y: ShaderPass::new(device, queue, format, "Bloom Blur Y", convolution)
                .with_params(&convolution_params(BLUR_Y, &kernel)),
            combine: ShaderPass::new(device, queue, format, "Bloom Combine", include_str!("shaders/combine.wgsl")),
            horizontal: RenderTarget::new(device, width, height, format, "bloom horizontal"),
            vertical: RenderTarget::new(device, width, height, format, "bloom vertical"),
            strength,
            enabled: true,
        }
    }

    pub fn set_sigma(&mut self, sigma: f32, kernel_size: usize) {
        let kernel = gaussian_kernel(sigma, kernel_size);
        self.blur_x.params = convolution_params(BLUR_X, &kernel);
        self.blur_y.params = convolution_params(BLUR_Y, &kernel);
    }
}

fn half(size: (u32, u32)) -> (u32, u32) {
    ((size.0 / 2).max(1), (size.1 / 2).max(1))
}

impl Pass for BloomPass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &RenderTarget,
        output: PassTarget<'_>,
    ) -> anyhow::Result<()> {
        self.combine.params[0] = [self.strength, 0.0, 0.0, 0.0];
        self.blur_x
            .draw(ctx.device, ctx.queue, encoder, input.view(), input.view(), self.horizontal.view());
        self.blur_y.draw(
            ctx.device,
            ctx.queue,
            encoder,
            self.horizontal.view(),
            self.horizontal.view(),
            self.vertical.view(),
        );
        self.combine
            .draw(ctx.device, ctx.queue, encoder, input.view(), self.vertical.view(), output.view());
        Ok(())
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = half((width, height));
        self.horizontal.resize(device, width, height);
        self.vertical.resize(device, width, height);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Directional blur with animated grain.
pub struct NoisePass {
    shader: ShaderPass,
    /// Grain cells across the screen.
    pub cells: f32,
    /// Blur length in pixels.
    pub blur: f32,
    pub angle: f32,
    /// Grain strength in `0..=1`.
    pub fraction: f32,
}

impl NoisePass {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        Self {
            shader: ShaderPass::new(device, queue, format, "Noise", include_str!("shaders/noise.wgsl")),
            cells: 125.0,
            blur: 4.0,
            angle: 0.0,
            fraction: 0.3,
        }
    }
}

impl Pass for NoisePass {
    fn render(
        &mut self,
        ctx: &mut PassContext<'_>,
        encoder: &mut wgpu::CommandEncoder,
        input: &RenderTarget,
        output: PassTarget<'_>,
    ) -> anyhow::Result<()> {
        self.shader.params[0] = [(ctx.time / 1000.0) as f32, self.cells, self.blur, self.angle];
        self.shader.params[1] = [self.fraction, 0.0, 0.0, 0.0];
        self.shader.render(ctx, encoder, input, output)
    }

    fn enabled(&self) -> bool {
        self.shader.enabled()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.shader.set_enabled(enabled);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(4.0, MAX_KERNEL_SIZE);
        assert_eq!(kernel.len(), 25);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-6);
        }
        assert!(kernel[12] > kernel[11]);
    }

    #[test]
    fn kernel_size_follows_sigma_and_cap() {
        assert_eq!(gaussian_kernel(1.0, MAX_KERNEL_SIZE).len(), 7);
        assert_eq!(gaussian_kernel(10.0, MAX_KERNEL_SIZE).len(), 25);
        assert_eq!(gaussian_kernel(4.0, 9).len(), 9);
    }

    #[test]
    fn kernel_weights_fit_the_params() {
        let kernel = gaussian_kernel(4.0, MAX_KERNEL_SIZE);
        let params = convolution_params(BLUR_X, &kernel);
        assert_eq!(params[0], [0.001953125, 0.0, 25.0, 0.0]);
        assert_eq!(params[1][0], kernel[0]);
        assert_eq!(params[7][0], kernel[24]);
    }

    #[test]
    fn glitch_fires_on_the_first_frame() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = GlitchState::new(&mut rng);
        let first = state.step(&mut rng, false);
        assert_eq!(first.bypass, 0.0);
        assert!(first.amount < 1.0 / 30.0);
        assert!((120..=240).contains(&state.trigger()));
        assert_eq!(first.column, 0.05);
    }

    #[test]
    fn glitch_weakens_then_bypasses() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut state = GlitchState::new(&mut rng);
        state.step(&mut rng, false);
        // the shortest cycle keeps 24 weak frames
        for _ in 1..24 {
            let weak = state.step(&mut rng, false);
            assert_eq!(weak.bypass, 0.0);
            assert!(weak.amount <= 1.0 / 90.0);
            assert!(weak.seed_x.abs() <= 0.3);
        }
        let mut bypassed = 0;
        for _ in 24..119 {
            if state.step(&mut rng, false).bypass == 1.0 {
                bypassed += 1;
            }
        }
        assert!(bypassed > 0);
        assert_eq!(state.step(&mut rng, false).bypass, 1.0);
    }

    #[test]
    fn going_wild_never_bypasses() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GlitchState::new(&mut rng);
        for _ in 0..300 {
            assert_eq!(state.step(&mut rng, true).bypass, 0.0);
        }
    }

    #[test]
    fn background_is_opaque() {
        assert_eq!(background_param(Color::WHITE), [1.0, 1.0, 1.0, 1.0]);
    }
}
