use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::viewport::ContainerSize;

/// Signals a host delivers between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    Resized(ContainerSize),
    VisibilityChanged { hidden: bool },
    IntersectionChanged { intersecting: bool },
}

/// Source of display-refresh ticks.
pub trait FrameScheduler {
    /// Blocks until the next refresh and returns its timestamp.
    fn await_next_tick(&mut self) -> Instant;

    /// Host events observed since the previous call, oldest first.
    fn take_events(&mut self) -> Vec<HostEvent>;
}

/// Cancels a running render loop. Clones share one flag, so any thread
/// holding a clone can stop the loop.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Fixed-rate scheduler that sleeps until each refresh. Used for headless
/// rendering, where there is no display to pace the loop.
#[derive(Debug)]
pub struct IntervalScheduler {
    interval: Duration,
    next_tick: Option<Instant>,
    events: VecDeque<HostEvent>,
}

impl IntervalScheduler {
    pub fn new(refresh_hz: f32) -> Self {
        Self {
            interval: Duration::from_secs_f32(1.0 / refresh_hz.max(1.0)),
            next_tick: None,
            events: VecDeque::new(),
        }
    }

    pub fn push_event(&mut self, event: HostEvent) {
        self.events.push_back(event);
    }
}

impl FrameScheduler for IntervalScheduler {
    fn await_next_tick(&mut self) -> Instant {
        let now = Instant::now();

        let Some(target) = self.next_tick else {
            self.next_tick = Some(now + self.interval);
            return now;
        };

        if target > now {
            std::thread::sleep(target - now);
        }

        let now = Instant::now();
        let next = target + self.interval;
        // Skip missed refreshes rather than bursting to catch up.
        self.next_tick = Some(if next < now {
            now + self.interval
        } else {
            next
        });
        now
    }

    fn take_events(&mut self) -> Vec<HostEvent> {
        self.events.drain(..).collect()
    }
}
