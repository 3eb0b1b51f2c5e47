use std::time::{Duration, Instant};

use rand::Rng;

use crate::color::{HslColor, RgbwColor};
use crate::models::AmbientConfig;

use super::GroupAnimator;

/// Drives a group through perpetual randomized hue transitions
///
/// The random source is injected so tests can supply a seeded generator and
/// get a reproducible schedule.
pub struct AmbientDriver<R: Rng> {
    rng: R,
    min_duration_ms: u32,
    max_duration_ms: u32,
}

/// Outcome of one ambient tick for a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientUpdate {
    /// Running transitions advanced; the buffer changed and needs a flush
    Advanced,
    /// The group was idle; zero or more new transitions were armed
    Armed(usize),
}

impl<R: Rng> AmbientDriver<R> {
    pub fn new(rng: R, config: &AmbientConfig) -> Self {
        Self {
            rng,
            min_duration_ms: config.min_duration_ms,
            max_duration_ms: config.max_duration_ms.max(config.min_duration_ms + 1),
        }
    }

    /// One scheduler tick for one group
    ///
    /// While the group animates, only advance it. Once it is fully idle,
    /// launch a random burst of new transitions: up to `pixel_count - 1`
    /// pixels (duplicates collapse onto the same pixel), each towards a
    /// random fully-saturated hue at `brightness` lightness. A burst of 0
    /// leaves the group idle for this tick on purpose; the uneven pauses
    /// are part of the look.
    ///
    /// Starting colors are read back from the output buffer, not from the
    /// recorded endpoints, so a pixel retargeted mid-transition continues
    /// from what is actually displayed instead of snapping.
    pub fn tick(
        &mut self,
        now: Instant,
        brightness: f32,
        animator: &mut GroupAnimator,
        buffer: &mut [RgbwColor],
    ) -> AmbientUpdate {
        if animator.is_animating() {
            animator.tick(now, buffer);
            return AmbientUpdate::Advanced;
        }

        let pixel_count = animator.pixel_count();
        let count = self.rng.gen_range(0..pixel_count);

        for _ in 0..count {
            let pixel = self.rng.gen_range(0..pixel_count);
            let duration_ms = self
                .rng
                .gen_range(self.min_duration_ms..self.max_duration_ms);
            let hue = self.rng.gen::<f32>();

            let starting_color = buffer[pixel];
            let ending_color = RgbwColor::from(HslColor::new(hue, 1.0, brightness));

            animator.start_transition(
                pixel,
                Duration::from_millis(duration_ms as u64),
                starting_color,
                ending_color,
                now,
            );
        }

        AmbientUpdate::Armed(count)
    }
}
