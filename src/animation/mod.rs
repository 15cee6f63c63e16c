//! Tweens and timelines driven by frame deltas.

pub mod easing;
pub mod tween;

pub use easing::{Easing, ease_in_out};
pub use tween::{Animation, Playback, Repeat, Segment, Timeline, Tween};
