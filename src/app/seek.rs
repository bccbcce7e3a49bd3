use std::time::Duration;

use ratatui::layout::Rect;

/// Hit testing and drag tracking for the progress slider.
#[derive(Debug, Default, Clone)]
pub struct SeekBar {
    pub area: Option<Rect>,
    pressed: bool,
    dragging: bool,
}

impl SeekBar {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        self.area.is_some_and(|rect| point_in_rect(x, y, &rect))
    }

    /// Horizontal position of `column` along the bar in [0, 1].
    ///
    /// The last cell maps to exactly 1.0 so the end of the media is reachable.
    pub fn fraction_at(&self, column: u16) -> Option<f64> {
        let rect = self.area?;
        if rect.width == 0 {
            return None;
        }
        let span = rect.width.saturating_sub(1).max(1) as f64;
        let offset = column.saturating_sub(rect.x) as f64;
        Some((offset / span).clamp(0.0, 1.0))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self) {
        self.pressed = true;
    }

    /// A drag only counts when the button went down on the bar.
    pub fn drag(&mut self) -> bool {
        if self.pressed {
            self.dragging = true;
        }
        self.dragging
    }

    pub fn release(&mut self) {
        self.pressed = false;
        self.dragging = false;
    }
}

pub fn point_in_rect(x: u16, y: u16, rect: &Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// The far end maps to `total` exactly, without float rounding.
pub fn seek_target(fraction: f64, total: Duration) -> Duration {
    if fraction >= 1.0 {
        return total;
    }
    total.mul_f64(fraction.max(0.0))
}

pub fn reaches_end(target: Duration, total: Duration) -> bool {
    target >= total
}
