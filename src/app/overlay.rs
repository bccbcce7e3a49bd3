use std::time::{Duration, Instant};

/// Visibility of the control overlay drawn over the video surface.
#[derive(Debug, Clone)]
pub struct Overlay {
    visible: bool,
    auto_hide_at: Option<Instant>,
}

impl Overlay {
    /// Visible now, hidden once `delay` has passed. A delay past the clock's range never fires.
    pub fn with_auto_hide(now: Instant, delay: Duration) -> Self {
        Self {
            visible: true,
            auto_hide_at: now.checked_add(delay),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// The pending auto-hide fires once, whatever was toggled meanwhile.
    pub fn tick(&mut self, now: Instant) {
        if self.auto_hide_at.is_some_and(|at| at <= now) {
            self.auto_hide_at = None;
            self.visible = false;
        }
    }
}
