use std::time::{Duration, Instant};

use crate::player::engine::MediaEngine;
use crate::player::facade::Player;
use crate::ui::duration::PlayerDuration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-rate schedule driven by the main loop.
///
/// There is no timer thread: the loop asks [`Poller::due`] on every pass, so
/// ticks always run on the UI thread.
#[derive(Debug)]
pub struct Poller {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Starting an already running poller keeps its schedule.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = now.checked_add(self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Consumes a tick if one is due. Missed ticks are not replayed.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(at) if at <= now => {
                self.next_due = now.checked_add(self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|at| at.saturating_duration_since(now))
    }
}

/// What one tick pushes to the label and slider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub current: Duration,
    pub total: Duration,
    pub ratio: f64,
}

impl ProgressSnapshot {
    pub fn new(current: Duration, total: Duration) -> Self {
        Self {
            current,
            total,
            ratio: progress_ratio(current, total),
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{} / {}",
            PlayerDuration::from(self.current),
            PlayerDuration::from(self.total)
        )
    }
}

/// Exactly zero at the start, and when the total is zero.
pub fn progress_ratio(current: Duration, total: Duration) -> f64 {
    if current.is_zero() || total.is_zero() {
        return 0.0;
    }
    (current.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

/// Reads the player once; `None` while the total duration is still unknown.
pub fn sample<E: MediaEngine>(player: &Player<E>) -> Option<ProgressSnapshot> {
    let total = player.total_duration()?;
    let current = player.current_duration().min(total);
    Some(ProgressSnapshot::new(current, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::engine::fake::FakeEngine;

    #[test]
    fn test_ticks_at_interval() {
        let start = Instant::now();
        let mut poller = Poller::new(Duration::from_millis(100));
        assert!(!poller.due(start));

        poller.start(start);
        assert!(poller.is_running());
        assert!(!poller.due(start + Duration::from_millis(50)));
        assert!(poller.due(start + Duration::from_millis(100)));
        assert!(!poller.due(start + Duration::from_millis(150)));
        assert!(poller.due(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_stop_cancels_ticks() {
        let start = Instant::now();
        let mut poller = Poller::new(Duration::from_millis(100));
        poller.start(start);
        poller.stop();

        assert!(!poller.is_running());
        assert!(!poller.due(start + Duration::from_secs(1)));
        assert_eq!(poller.time_until_due(start), None);
    }

    #[test]
    fn test_restart_keeps_schedule() {
        let start = Instant::now();
        let mut poller = Poller::new(Duration::from_millis(100));
        poller.start(start);
        poller.start(start + Duration::from_millis(90));
        assert_eq!(
            poller.time_until_due(start + Duration::from_millis(90)),
            Some(Duration::from_millis(10))
        );
    }

    #[test]
    fn test_ratio_zero_at_start_regardless_of_total() {
        assert_eq!(progress_ratio(Duration::ZERO, Duration::from_secs(120)), 0.0);
        assert_eq!(progress_ratio(Duration::ZERO, Duration::ZERO), 0.0);
        assert_eq!(progress_ratio(Duration::from_secs(3), Duration::ZERO), 0.0);
    }

    #[test]
    fn test_ratio_is_monotonic() {
        let total = Duration::from_secs(120);
        let mut last = 0.0;
        for secs in 0..=120 {
            let ratio = progress_ratio(Duration::from_secs(secs), total);
            assert!(ratio >= last);
            last = ratio;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_sample_skips_unknown_total() {
        let player = Player::new(FakeEngine::new());
        assert_eq!(sample(&player), None);
    }

    #[test]
    fn test_sample_formats_label() {
        let mut engine = FakeEngine::with_duration(3661);
        engine.position = Duration::from_secs(59);
        let player = Player::new(engine);

        let snapshot = sample(&player).unwrap();
        assert_eq!(snapshot.label(), "00:59 / 1:01:01");
        assert!(snapshot.ratio > 0.0 && snapshot.ratio < 1.0);
    }
}
