use std::time::{Duration, Instant};

/// One periodic frame signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSignal {
    pub index: u64,
    pub elapsed: Duration,
}

/// Source of periodic frame signals driving a [`Scheduler`](crate::Scheduler).
///
/// `next_frame` blocks until the next signal is due and returns `None` once the source is
/// exhausted.
pub trait FrameDriver {
    fn next_frame(&mut self) -> Option<FrameSignal>;
}

/// Emits a fixed number of signals immediately. Intended for tests and offline runs.
#[derive(Clone, Debug)]
pub struct FixedFrames {
    total: u64,
    emitted: u64,
    step: Duration,
}

impl FixedFrames {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            emitted: 0,
            step: Duration::from_micros(16_667),
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl FrameDriver for FixedFrames {
    fn next_frame(&mut self) -> Option<FrameSignal> {
        if self.emitted >= self.total {
            return None;
        }
        let index = self.emitted;
        self.emitted += 1;
        Some(FrameSignal {
            index,
            elapsed: self.step.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX)),
        })
    }
}

/// Wall-clock driver: one signal per `interval`, optionally capped.
#[derive(Clone, Debug)]
pub struct IntervalDriver {
    interval: Duration,
    max_frames: Option<u64>,
    started: Option<Instant>,
    emitted: u64,
}

impl IntervalDriver {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_frames: None,
            started: None,
            emitted: 0,
        }
    }

    /// Roughly 60 signals per second.
    pub fn sixty_hz() -> Self {
        Self::new(Duration::from_micros(16_667))
    }

    pub fn with_max_frames(mut self, max: u64) -> Self {
        self.max_frames = Some(max);
        self
    }
}

impl FrameDriver for IntervalDriver {
    fn next_frame(&mut self) -> Option<FrameSignal> {
        if self.max_frames.is_some_and(|max| self.emitted >= max) {
            return None;
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        let factor = u32::try_from(self.emitted).unwrap_or(u32::MAX);
        let due = started + self.interval.saturating_mul(factor);
        let now = Instant::now();
        if due > now {
            std::thread::sleep(due - now);
        }
        let index = self.emitted;
        self.emitted += 1;
        Some(FrameSignal {
            index,
            elapsed: started.elapsed(),
        })
    }
}
