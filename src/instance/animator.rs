use std::time::{Duration, Instant};

use crate::color::RgbwColor;

/// Endpoints of a pixel's current (or last) transition
///
/// One record per pixel, overwritten whenever a new transition starts for
/// that pixel and reused for the next one; never deallocated.
#[derive(Debug, Default, Clone, Copy)]
pub struct PixelAnimation {
    pub starting_color: RgbwColor,
    pub ending_color: RgbwColor,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    armed_at: Instant,
    duration: Duration,
}

impl Timer {
    /// Normalized progress at `now`, clamped to [0, 1]
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.;
        }

        (now.saturating_duration_since(self.armed_at).as_secs_f32()
            / self.duration.as_secs_f32())
        .min(1.)
    }
}

/// Per-group animation scheduler
///
/// Owns one timer per pixel. Each armed timer advances an interpolation from
/// its starting to its ending color; [tick](Self::tick) writes the blended
/// colors into the group's output buffer and retires finished timers.
/// The clock is always passed in, so tests can drive time exactly.
pub struct GroupAnimator {
    state: Vec<PixelAnimation>,
    timers: Vec<Option<Timer>>,
}

impl GroupAnimator {
    pub fn new(pixel_count: usize) -> Self {
        Self {
            state: vec![PixelAnimation::default(); pixel_count],
            timers: vec![None; pixel_count],
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.state.len()
    }

    /// Arm (or re-arm) the timer for one pixel
    ///
    /// Starting a new transition on a mid-animation pixel is retargeting:
    /// the previous endpoints are overwritten and progress restarts at 0.
    /// `pixel` must be in range for the group.
    pub fn start_transition(
        &mut self,
        pixel: usize,
        duration: Duration,
        starting_color: RgbwColor,
        ending_color: RgbwColor,
        now: Instant,
    ) {
        self.state[pixel] = PixelAnimation {
            starting_color,
            ending_color,
        };
        self.timers[pixel] = Some(Timer {
            armed_at: now,
            duration,
        });
    }

    /// Advance all armed timers to `now` and blend into `buffer`
    ///
    /// Timers that reach full progress are retired: the pixel receives its
    /// ending color exactly and no further writes happen for it until it is
    /// re-armed.
    pub fn tick(&mut self, now: Instant, buffer: &mut [RgbwColor]) {
        for (pixel, timer_slot) in self.timers.iter_mut().enumerate() {
            if let Some(timer) = timer_slot {
                let progress = timer.progress(now);
                let animation = &self.state[pixel];

                buffer[pixel] = RgbwColor::linear_blend(
                    animation.starting_color,
                    animation.ending_color,
                    progress,
                );

                if progress >= 1. {
                    *timer_slot = None;
                }
            }
        }
    }

    /// True while any pixel has a non-retired timer
    pub fn is_animating(&self) -> bool {
        self.timers.iter().any(Option::is_some)
    }

    /// Endpoints currently recorded for a pixel
    pub fn animation(&self, pixel: usize) -> &PixelAnimation {
        &self.state[pixel]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: RgbwColor = RgbwColor::new(0, 0, 0, 0);
    const END: RgbwColor = RgbwColor::new(200, 100, 50, 25);

    fn armed(now: Instant) -> (GroupAnimator, Vec<RgbwColor>) {
        let mut animator = GroupAnimator::new(4);
        let buffer = vec![RgbwColor::BLACK; 4];
        animator.start_transition(1, Duration::from_millis(1000), START, END, now);
        (animator, buffer)
    }

    #[test]
    fn full_duration_reaches_ending_color_exactly() {
        let now = Instant::now();
        let (mut animator, mut buffer) = armed(now);

        animator.tick(now + Duration::from_millis(1000), &mut buffer);

        assert_eq!(buffer[1], END);
        assert!(!animator.is_animating());
    }

    #[test]
    fn progress_clamps_past_duration() {
        let now = Instant::now();
        let (mut animator, mut buffer) = armed(now);

        animator.tick(now + Duration::from_secs(30), &mut buffer);
        assert_eq!(buffer[1], END);
    }

    #[test]
    fn midpoint_blends_and_keeps_animating() {
        let now = Instant::now();
        let (mut animator, mut buffer) = armed(now);

        animator.tick(now + Duration::from_millis(500), &mut buffer);

        assert_eq!(buffer[1], RgbwColor::linear_blend(START, END, 0.5));
        assert!(animator.is_animating());
        // Untouched pixels stay untouched
        assert_eq!(buffer[0], RgbwColor::BLACK);
    }

    #[test]
    fn retired_timer_stops_writing() {
        let now = Instant::now();
        let (mut animator, mut buffer) = armed(now);

        animator.tick(now + Duration::from_millis(1000), &mut buffer);

        // Later writes to the buffer are not undone by further ticks
        buffer[1] = RgbwColor::new(1, 2, 3, 4);
        animator.tick(now + Duration::from_millis(2000), &mut buffer);
        assert_eq!(buffer[1], RgbwColor::new(1, 2, 3, 4));
    }

    #[test]
    fn retargeting_resets_progress() {
        let now = Instant::now();
        let (mut animator, mut buffer) = armed(now);

        let halfway = now + Duration::from_millis(500);
        animator.tick(halfway, &mut buffer);
        let displayed = buffer[1];

        // Retarget from the displayed color towards a new endpoint
        let retarget = RgbwColor::new(0, 0, 255, 0);
        animator.start_transition(1, Duration::from_millis(1000), displayed, retarget, halfway);

        // Progress restarted: at the original end time we are only halfway
        animator.tick(now + Duration::from_millis(1000), &mut buffer);
        assert_eq!(
            buffer[1],
            RgbwColor::linear_blend(displayed, retarget, 0.5)
        );

        animator.tick(halfway + Duration::from_millis(1000), &mut buffer);
        assert_eq!(buffer[1], retarget);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let now = Instant::now();
        let mut animator = GroupAnimator::new(2);
        let mut buffer = vec![RgbwColor::BLACK; 2];

        animator.start_transition(0, Duration::ZERO, START, END, now);
        animator.tick(now, &mut buffer);

        assert_eq!(buffer[0], END);
        assert!(!animator.is_animating());
    }
}
