use std::f32::consts::PI;

/// Timing curves for tweens. Every variant maps `0 → 0` and `1 → 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Quadratic ease-out, the usual default for one-shot tweens.
    #[default]
    Power1Out,
    Power2InOut,
    Power2Out,
    SineInOut,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power1Out => 1.0 - (1.0 - t).powi(2),
            Easing::Power2InOut => ease_in_out(t, 3.0),
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Symmetric ease: `(2t)^power / 2` on the first half, mirrored on the second.
pub fn ease_in_out(t: f32, power: f32) -> f32 {
    if t < 0.5 {
        (2.0 * t).powf(power) / 2.0
    } else {
        1.0 - (2.0 * (1.0 - t)).powf(power) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::Power1Out,
        Easing::Power2InOut,
        Easing::Power2Out,
        Easing::SineInOut,
    ];

    #[test]
    fn every_easing_keeps_its_endpoints() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-6, "{:?}", ease);
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", ease);
            assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        }
    }

    #[test]
    fn in_out_is_symmetric_around_the_middle() {
        assert!((ease_in_out(0.5, 2.0) - 0.5).abs() < 1e-6);
        assert!((ease_in_out(0.25, 2.0) + ease_in_out(0.75, 2.0) - 1.0).abs() < 1e-6);
        assert!((Easing::Power2InOut.apply(0.25) - 0.0625).abs() < 1e-6);
        assert!(Easing::Power2InOut.apply(0.1) < Easing::Linear.apply(0.1));
    }
}
