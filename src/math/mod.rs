//! Colour and curve math shared by the lessons.

pub mod color;
pub mod curve;

pub use color::Color;
pub use curve::{CatmullRomCurve3, Curve, Curve3, CurvePath, EllipseCurve, LineCurve3};

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of element `index` among `count`, spread over `[0, 1]`.
pub fn item_ratio(count: usize, index: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        index as f32 / (count - 1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_cover_the_unit_interval() {
        assert_eq!(item_ratio(1, 0), 0.0);
        assert_eq!(item_ratio(5, 0), 0.0);
        assert_eq!(item_ratio(5, 2), 0.5);
        assert_eq!(item_ratio(5, 4), 1.0);
        assert_eq!(lerp(1.0, 3.0, 0.5), 2.0);
    }
}
