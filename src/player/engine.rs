use std::time::Duration;

use reqwest::Url;

use crate::player::commands::TimeControl;

/// The host media engine as the player facade sees it.
///
/// Commands take effect immediately from the caller's point of view: after
/// `pause()` returns, `time_control()` reports `Paused`. End of playback is
/// not part of this trait; engines report it as an
/// [`EngineEvent::Ended`](crate::events::types::EngineEvent::Ended).
pub trait MediaEngine {
    /// Replaces the current item. The engine stays `Waiting` until the item is playable.
    fn load(&mut self, url: &Url);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, to: Duration);

    fn time_control(&self) -> TimeControl;
    fn position(&self) -> Duration;
    /// `None` until the item's metadata has loaded.
    fn duration(&self) -> Option<Duration>;
}
