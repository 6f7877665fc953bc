use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MAX_INTERVALS: usize = 90;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Admission {
    Render,
    Throttled,
}

/// Drops ticks that arrive sooner than `1 / cap` after the last admitted
/// one. There is no catch-up: an admitted tick resets the reference point
/// to its own timestamp.
#[derive(Debug)]
pub struct FrameLimiter {
    frame_cap_hz: f32,
    last_render: Option<Instant>,
    frame_count: u64,
    frame_intervals: VecDeque<Duration>,
}

impl FrameLimiter {
    pub fn new(frame_cap_hz: f32) -> Self {
        Self {
            frame_cap_hz: frame_cap_hz.max(1.0),
            last_render: None,
            frame_count: 0,
            frame_intervals: VecDeque::new(),
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frame_cap_hz)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Earliest instant the next tick can be admitted.
    pub fn next_deadline(&self, now: Instant) -> Instant {
        self.last_render
            .map(|last| last + self.frame_interval())
            .unwrap_or(now)
    }

    pub fn admit(&mut self, now: Instant) -> Admission {
        if let Some(last) = self.last_render {
            let elapsed = now.saturating_duration_since(last);

            if elapsed < self.frame_interval() {
                return Admission::Throttled;
            }

            self.record_interval(elapsed);
        }

        self.last_render = Some(now);
        self.frame_count += 1;
        Admission::Render
    }

    pub fn average_fps(&self) -> f32 {
        if self.frame_intervals.is_empty() {
            return 0.0;
        }

        let sum: Duration = self.frame_intervals.iter().copied().sum();
        let avg = sum / self.frame_intervals.len() as u32;

        if avg.is_zero() {
            return 0.0;
        }

        1.0 / avg.as_secs_f32()
    }

    fn record_interval(&mut self, interval: Duration) {
        self.frame_intervals.push_back(interval);
        if self.frame_intervals.len() > MAX_INTERVALS {
            self.frame_intervals.pop_front();
        }
    }
}

/// Seconds since mount. Keeps running while rendering is gated, so a
/// resumed scene jumps to the current phase instead of continuing where it
/// stopped.
#[derive(Clone, Copy, Debug)]
pub struct SceneClock {
    start: Instant,
}

impl SceneClock {
    pub fn start(now: Instant) -> Self {
        Self { start: now }
    }

    pub fn elapsed_seconds(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn first_tick_is_always_admitted() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(30.0);
        assert_eq!(limiter.admit(start), Admission::Render);
        assert_eq!(limiter.frame_count(), 1);
    }

    #[test]
    fn ticks_inside_the_interval_are_dropped() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(30.0);

        let admitted = (0..10)
            .filter(|step| {
                limiter.admit(start + ms(10 * step)) == Admission::Render
            })
            .count();

        // 0, 40 and 80 ms.
        assert_eq!(admitted, 3);
    }

    #[test]
    fn no_catch_up_after_a_long_gap() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(60.0);

        assert_eq!(limiter.admit(start), Admission::Render);
        assert_eq!(limiter.admit(start + ms(1000)), Admission::Render);
        assert_eq!(limiter.admit(start + ms(1001)), Admission::Throttled);
        assert_eq!(limiter.frame_count(), 2);
    }

    #[test]
    fn deadline_tracks_last_admission() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(40.0);
        assert_eq!(limiter.next_deadline(start), start);

        limiter.admit(start);
        assert_eq!(limiter.next_deadline(start), start + ms(25));
    }

    #[test]
    fn average_fps_over_recorded_intervals() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::new(30.0);
        assert_eq!(limiter.average_fps(), 0.0);

        for step in 0..=10 {
            limiter.admit(start + ms(50 * step));
        }

        assert!((limiter.average_fps() - 20.0).abs() < 0.01);
    }

    #[test]
    fn scene_clock_counts_from_mount() {
        let start = Instant::now();
        let clock = SceneClock::start(start);
        assert_eq!(clock.elapsed_seconds(start), 0.0);
        assert!((clock.elapsed_seconds(start + ms(1500)) - 1.5).abs() < 1e-6);
    }
}
