use instant::Duration;

use crate::animation::Easing;

/// How often a tween plays after its first run. `None` repeats forever.
pub type Repeat = Option<u32>;

/// A single value animated from `from` to `to`.
///
/// The tween itself holds no clock: [`Tween::value_at`] is a pure function of
/// the elapsed time, and [`Playback`] does the bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub delay: Duration,
    pub ease: Easing,
    pub repeat: Repeat,
    pub yoyo: bool,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            delay: Duration::ZERO,
            ease: Easing::default(),
            repeat: Some(0),
            yoyo: false,
        }
    }

    pub fn ease(mut self, ease: Easing) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    /// Total running time including the delay, `None` when it repeats forever.
    pub fn total_duration(&self) -> Option<Duration> {
        self.repeat
            .map(|repeat| self.delay + self.duration * (repeat + 1))
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        self.total_duration().is_some_and(|total| elapsed >= total)
    }

    /// Eased progress in `[0, 1]` of the current iteration, reversed on yoyo.
    pub fn progress_at(&self, elapsed: Duration) -> f32 {
        let Some(t) = elapsed.checked_sub(self.delay) else {
            return self.ease.apply(0.0);
        };
        let cycle = self.duration.as_secs_f64();
        if cycle <= 0.0 {
            return 1.0;
        }
        let t = t.as_secs_f64();
        let (iteration, local) = match self.repeat {
            Some(repeat) if t >= cycle * (repeat + 1) as f64 => (repeat as u64, 1.0),
            _ => {
                let iteration = (t / cycle).floor();
                (iteration as u64, (t - iteration * cycle) / cycle)
            }
        };
        let local = if self.yoyo && iteration % 2 == 1 {
            1.0 - local
        } else {
            local
        };
        self.ease.apply(local as f32)
    }

    pub fn value_at(&self, elapsed: Duration) -> f32 {
        self.from + (self.to - self.from) * self.progress_at(elapsed)
    }
}

/// One leg of a [`Timeline`]: move to `to` over `duration`.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub to: f32,
    pub duration: Duration,
    pub ease: Easing,
}

/// Consecutive tweens on one value, each starting where the previous ended.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    pub start: f32,
    pub segments: Vec<Segment>,
    pub repeat: Repeat,
    pub yoyo: bool,
}

impl Timeline {
    pub fn new(start: f32) -> Self {
        Self {
            start,
            segments: Vec::new(),
            repeat: Some(0),
            yoyo: false,
        }
    }

    pub fn to(mut self, to: f32, duration: Duration, ease: Easing) -> Self {
        self.segments.push(Segment { to, duration, ease });
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn cycle(&self) -> Duration {
        self.segments.iter().map(|s| s.duration).sum()
    }

    pub fn is_complete(&self, elapsed: Duration) -> bool {
        self.repeat
            .is_some_and(|repeat| elapsed >= self.cycle() * (repeat + 1))
    }

    /// Value at the given position inside one forward cycle.
    fn value_in_cycle(&self, at: f64) -> f32 {
        let mut from = self.start;
        let mut offset = 0.0;
        for segment in &self.segments {
            let length = segment.duration.as_secs_f64();
            if at < offset + length {
                let local = ((at - offset) / length) as f32;
                return from + (segment.to - from) * segment.ease.apply(local);
            }
            offset += length;
            from = segment.to;
        }
        from
    }

    pub fn value_at(&self, elapsed: Duration) -> f32 {
        let cycle = self.cycle().as_secs_f64();
        if cycle <= 0.0 {
            return self.segments.last().map_or(self.start, |s| s.to);
        }
        let t = elapsed.as_secs_f64();
        let (iteration, local) = match self.repeat {
            Some(repeat) if t >= cycle * (repeat + 1) as f64 => (repeat as u64, cycle),
            _ => {
                let iteration = (t / cycle).floor();
                (iteration as u64, t - iteration * cycle)
            }
        };
        if self.yoyo && iteration % 2 == 1 {
            self.value_in_cycle(cycle - local)
        } else {
            self.value_in_cycle(local)
        }
    }
}

/// Anything with a pure value over elapsed time.
pub trait Animation {
    fn value_at(&self, elapsed: Duration) -> f32;
    fn is_complete(&self, elapsed: Duration) -> bool;
}

impl Animation for Tween {
    fn value_at(&self, elapsed: Duration) -> f32 {
        Tween::value_at(self, elapsed)
    }

    fn is_complete(&self, elapsed: Duration) -> bool {
        Tween::is_complete(self, elapsed)
    }
}

impl Animation for Timeline {
    fn value_at(&self, elapsed: Duration) -> f32 {
        Timeline::value_at(self, elapsed)
    }

    fn is_complete(&self, elapsed: Duration) -> bool {
        Timeline::is_complete(self, elapsed)
    }
}

/// Advances an animation with frame deltas.
#[derive(Clone, Debug)]
pub struct Playback<A = Tween> {
    animation: A,
    elapsed: Duration,
    playing: bool,
}

impl<A: Animation> Playback<A> {
    /// Created paused at the start.
    pub fn new(animation: A) -> Self {
        Self {
            animation,
            elapsed: Duration::ZERO,
            playing: false,
        }
    }

    pub fn animation(&self) -> &A {
        &self.animation
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Jump back to the start and play.
    pub fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.playing = true;
    }

    /// Replace the animation and restart.
    pub fn replace(&mut self, animation: A) {
        self.animation = animation;
        self.restart();
    }

    pub fn is_active(&self) -> bool {
        self.playing && !self.animation.is_complete(self.elapsed)
    }

    pub fn value(&self) -> f32 {
        self.animation.value_at(self.elapsed)
    }

    /// Move forward by `dt`. Returns the new value while active.
    pub fn advance(&mut self, dt: Duration) -> Option<f32> {
        if !self.is_active() {
            return None;
        }
        self.elapsed += dt;
        Some(self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn linear_tween_interpolates() {
        let tween = Tween::new(0.0, 10.0, secs(2.0)).ease(Easing::Linear);
        assert!(close(tween.value_at(secs(0.0)), 0.0));
        assert!(close(tween.value_at(secs(0.5)), 2.5));
        assert!(close(tween.value_at(secs(2.0)), 10.0));
        assert!(close(tween.value_at(secs(9.0)), 10.0));
        assert!(tween.is_complete(secs(2.0)));
    }

    #[test]
    fn delay_holds_the_start_value() {
        let tween = Tween::new(1.0, 2.0, secs(1.0))
            .ease(Easing::Linear)
            .delay(secs(1.0));
        assert!(close(tween.value_at(secs(0.5)), 1.0));
        assert!(close(tween.value_at(secs(1.5)), 1.5));
        assert_eq!(tween.total_duration(), Some(secs(2.0)));
    }

    #[test]
    fn yoyo_reverses_odd_iterations() {
        let tween = Tween::new(0.0, 1.0, secs(1.0))
            .ease(Easing::Linear)
            .repeat(Some(1))
            .yoyo(true);
        assert!(close(tween.value_at(secs(0.25)), 0.25));
        assert!(close(tween.value_at(secs(1.25)), 0.75));
        // ends where it started after an odd number of repeats
        assert!(close(tween.value_at(secs(5.0)), 0.0));
    }

    #[test]
    fn infinite_repeat_never_completes() {
        let tween = Tween::new(0.0, 1.0, secs(10.0))
            .ease(Easing::Linear)
            .repeat(None);
        assert!(!tween.is_complete(secs(1e6)));
        assert!(close(tween.value_at(secs(25.0)), 0.5));
    }

    #[test]
    fn timeline_chains_segments_and_yoyos() {
        let timeline = Timeline::new(0.0)
            .to(1.0, secs(2.0), Easing::Linear)
            .to(-1.0, secs(2.0), Easing::Linear)
            .repeat(None)
            .yoyo(true);
        assert_eq!(timeline.cycle(), secs(4.0));
        assert!(close(timeline.value_at(secs(1.0)), 0.5));
        assert!(close(timeline.value_at(secs(3.0)), 0.0));
        assert!(close(timeline.value_at(secs(4.0)), -1.0));
        // the second cycle runs backwards
        assert!(close(timeline.value_at(secs(5.0)), 0.0));
        assert!(close(timeline.value_at(secs(7.0)), 0.5));
    }

    #[test]
    fn playback_advances_only_while_playing() {
        let mut playback = Playback::new(Tween::new(0.0, 1.0, secs(1.0)).ease(Easing::Linear));
        assert_eq!(playback.advance(secs(0.5)), None);
        playback.play();
        assert!(close(playback.advance(secs(0.5)).unwrap(), 0.5));
        playback.pause();
        assert_eq!(playback.advance(secs(0.5)), None);
        playback.play();
        assert!(close(playback.advance(secs(0.5)).unwrap(), 1.0));
        assert!(!playback.is_active());
        playback.restart();
        assert!(playback.is_active());
        assert!(close(playback.value(), 0.0));
    }
}
