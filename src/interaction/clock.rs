use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Time since the clock started
    pub elapsed: Duration,
    /// Time since the previous frame
    pub delta: Duration,
}

/// Monotonic frame clock, ticked once per rendered frame.
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();

        Self {
            start: now,
            last_tick: now,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let frame = FrameTime {
            elapsed: now.duration_since(self.start),
            delta: now.duration_since(self.last_tick),
        };
        self.last_tick = now;
        frame
    }
}
