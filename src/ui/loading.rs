use std::time::{Duration, Instant};

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner shown next to the button while the engine is still buffering.
pub struct LoadingAnimation {
    current_frame: usize,
    last_update: Instant,
    frame_duration: Duration,
}

impl LoadingAnimation {
    pub fn new(now: Instant) -> Self {
        Self {
            current_frame: 0,
            last_update: now,
            frame_duration: Duration::from_millis(80),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_update) >= self.frame_duration {
            self.current_frame = (self.current_frame + 1) % FRAMES.len();
            self.last_update = now;
        }
    }

    pub fn current_frame(&self) -> &'static str {
        FRAMES[self.current_frame]
    }
}
