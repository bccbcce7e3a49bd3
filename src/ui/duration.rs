use std::fmt;
use std::time::Duration;

/// Whole hours, minutes and seconds of a playback time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerDuration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl PlayerDuration {
    /// Splits `floor(secs)`. Negative, NaN and infinite inputs count as zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        let whole = if secs.is_finite() && secs > 0.0 {
            secs.floor() as u64
        } else {
            0
        };

        Self {
            hours: whole / 3600,
            minutes: whole % 3600 / 60,
            seconds: whole % 60,
        }
    }

    /// `MM:SS`, or `H:MM:SS` once there is an hour to show.
    pub fn short(&self) -> String {
        if self.hours == 0 {
            format!("{:02}:{:02}", self.minutes, self.seconds)
        } else {
            format!("{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        }
    }
}

impl From<Duration> for PlayerDuration {
    fn from(d: Duration) -> Self {
        Self::from_secs_f64(d.as_secs_f64())
    }
}

impl fmt::Display for PlayerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}
