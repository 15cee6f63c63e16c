/// A linear RGB colour.
///
/// Hex literals are treated as sRGB and converted to linear on the way in,
/// so interpolation and lighting happen in linear space and the sRGB surface
/// encodes the result on output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |c: f32| (linear_to_srgb(c).clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn lerp(&self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    pub fn multiply_scalar(&self, s: f32) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }

    /// Hue, saturation and lightness, each in `[0, 1]`.
    pub fn to_hsl(&self) -> (f32, f32, f32) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let lightness = (min + max) / 2.0;
        if min == max {
            return (0.0, 0.0, lightness);
        }
        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let hue = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        (hue / 6.0, saturation, lightness)
    }

    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            return Self::new(l, l, l);
        }
        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        Self::new(
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        )
    }

    pub fn with_lightness(&self, lightness: f32) -> Self {
        let (h, s, _) = self.to_hsl();
        Self::from_hsl(h, s, lightness)
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgba(&self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    if c < 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn hex_survives_the_linear_round_trip() {
        for hex in [0x000000, 0xffffff, 0x336699, 0x0056b9, 0xffd800, 0xd9d9d9] {
            assert_eq!(Color::from_hex(hex).to_hex(), hex, "{:06x}", hex);
        }
    }

    #[test]
    fn primaries_convert_to_hsl() {
        let (h, s, l) = Color::new(1.0, 0.0, 0.0).to_hsl();
        assert!(close(h, 0.0) && close(s, 1.0) && close(l, 0.5));
        let (h, _, _) = Color::new(0.0, 0.0, 1.0).to_hsl();
        assert!(close(h, 2.0 / 3.0));
        let (h, s, l) = Color::new(0.5, 0.5, 0.5).to_hsl();
        assert!(close(h, 0.0) && close(s, 0.0) && close(l, 0.5));
    }

    #[test]
    fn hsl_inverts_to_hsl() {
        let original = Color::new(0.2, 0.4, 0.6);
        let (h, s, l) = original.to_hsl();
        let back = Color::from_hsl(h, s, l);
        assert!(close(back.r, original.r));
        assert!(close(back.g, original.g));
        assert!(close(back.b, original.b));
    }

    #[test]
    fn lerp_hits_both_ends() {
        let a = Color::from_hex(0x14386b);
        let b = Color::from_hex(0xfbd85e);
        assert_eq!(a.lerp(b, 0.0), a);
        let end = a.lerp(b, 1.0);
        assert!(close(end.r, b.r) && close(end.g, b.g) && close(end.b, b.b));
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 0.25), Color::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn lightness_can_be_replaced() {
        let c = Color::new(1.0, 0.0, 0.0).with_lightness(1.0);
        assert!(close(c.r, 1.0) && close(c.g, 1.0) && close(c.b, 1.0));
    }
}
