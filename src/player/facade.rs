use std::sync::mpsc;
use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

use crate::events::types::AppEvent;
use crate::player::commands::{PlaybackState, TimeControl};
use crate::player::engine::MediaEngine;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("invalid media url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Single point of control over the media engine.
///
/// State changes the facade causes are published to at most one subscriber.
/// The subscriber channel is drained on the UI thread, so publishing never
/// runs UI code on another thread.
pub struct Player<E: MediaEngine> {
    engine: E,
    state: PlaybackState,
    subscriber: Option<mpsc::Sender<AppEvent>>,
}

impl<E: MediaEngine> Player<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlaybackState::Waiting,
            subscriber: None,
        }
    }

    /// Registers the sole subscriber, replacing any previous one.
    pub fn subscribe(&mut self, tx: mpsc::Sender<AppEvent>) {
        self.subscriber = Some(tx);
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn play(&mut self, url: &str) -> Result<(), PlayerError> {
        let url = Url::parse(url).map_err(|e| PlayerError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        log::info!("Loading {}", url);
        self.engine.load(&url);
        self.engine.play();
        self.set_state(self.engine.time_control().into());
        Ok(())
    }

    pub fn play_pause(&mut self) {
        // A finished item is parked paused at zero, so resuming replays it.
        match self.engine.time_control() {
            TimeControl::Playing => self.engine.pause(),
            TimeControl::Paused => self.engine.play(),
            TimeControl::Waiting => {
                log::debug!("Ignoring play/pause while the engine is waiting");
                return;
            }
        }
        self.set_state(self.engine.time_control().into());
    }

    pub fn seek(&mut self, to: Duration) {
        log::debug!("Seeking to {:.2}s", to.as_secs_f64());
        self.engine.seek(to);
    }

    /// End-of-media: park the engine paused at zero and show the replay affordance.
    pub fn finish(&mut self) {
        log::info!("Playback finished");
        if self.engine.time_control() == TimeControl::Playing {
            self.engine.pause();
        }
        self.engine.seek(Duration::ZERO);
        self.set_state(PlaybackState::Finished);
    }

    /// Re-derives the state after the engine changed status on its own.
    pub fn on_engine_status(&mut self, status: TimeControl) {
        if self.state == PlaybackState::Finished && status != TimeControl::Playing {
            return;
        }
        let state = status.into();
        if state != self.state {
            self.set_state(state);
        }
    }

    pub fn current_duration(&self) -> Duration {
        self.engine.position()
    }

    pub fn total_duration(&self) -> Option<Duration> {
        self.engine.duration()
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn set_state(&mut self, state: PlaybackState) {
        log::debug!("Player state {:?} -> {:?}", self.state, state);
        self.state = state;
        if let Some(ref tx) = self.subscriber {
            if tx.send(AppEvent::PlayerStateChanged(state)).is_err() {
                log::warn!("Player subscriber is gone, dropping it");
                self.subscriber = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::engine::fake::{Call, FakeEngine};

    const URL: &str = "https://example.com/video.mp4";

    fn subscribed(engine: FakeEngine) -> (Player<FakeEngine>, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let mut player = Player::new(engine);
        player.subscribe(tx);
        (player, rx)
    }

    fn published(rx: &mpsc::Receiver<AppEvent>) -> Vec<PlaybackState> {
        rx.try_iter()
            .filter_map(|e| match e {
                AppEvent::PlayerStateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_play_loads_and_notifies() {
        let (mut player, rx) = subscribed(FakeEngine::with_duration(120));
        player.play(URL).unwrap();

        assert_eq!(
            player.engine().calls,
            vec![Call::Load(URL.to_string()), Call::Play]
        );
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(published(&rx), vec![PlaybackState::Playing]);
    }

    #[test]
    fn test_malformed_url_is_a_silent_noop() {
        let (mut player, rx) = subscribed(FakeEngine::new());
        let result = player.play("not a url");

        assert!(matches!(result, Err(PlayerError::InvalidUrl { .. })));
        assert_eq!(player.state(), PlaybackState::Waiting);
        assert!(player.engine().calls.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_play_pause_twice_returns_to_playing() {
        let (mut player, rx) = subscribed(FakeEngine::with_duration(60));
        player.play(URL).unwrap();

        player.play_pause();
        assert_eq!(player.state(), PlaybackState::Paused);
        player.play_pause();
        assert_eq!(player.state(), PlaybackState::Playing);

        assert_eq!(
            published(&rx),
            vec![
                PlaybackState::Playing,
                PlaybackState::Paused,
                PlaybackState::Playing
            ]
        );
    }

    #[test]
    fn test_play_pause_ignored_while_waiting() {
        let mut engine = FakeEngine::new();
        engine.ready = false;
        let (mut player, rx) = subscribed(engine);
        player.play(URL).unwrap();
        let _ = published(&rx);

        player.play_pause();

        assert_eq!(player.state(), PlaybackState::Waiting);
        assert!(rx.try_recv().is_err());
        assert_eq!(player.engine().calls.last(), Some(&Call::Play));
    }

    #[test]
    fn test_seek_keeps_state() {
        let (mut player, rx) = subscribed(FakeEngine::with_duration(60));
        player.play(URL).unwrap();
        let _ = published(&rx);

        player.seek(Duration::from_secs(30));

        assert_eq!(player.current_duration(), Duration::from_secs(30));
        assert_eq!(player.state(), PlaybackState::Playing);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_total_duration_unknown_until_loaded() {
        let (player, _rx) = subscribed(FakeEngine::new());
        assert_eq!(player.total_duration(), None);
    }

    #[test]
    fn test_finish_resets_position_and_replays() {
        let (mut player, rx) = subscribed(FakeEngine::with_duration(60));
        player.play(URL).unwrap();
        player.seek(Duration::from_secs(60));

        player.finish();
        assert_eq!(player.state(), PlaybackState::Finished);
        assert_eq!(player.current_duration(), Duration::ZERO);

        player.play_pause();
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(
            published(&rx),
            vec![
                PlaybackState::Playing,
                PlaybackState::Finished,
                PlaybackState::Playing
            ]
        );
    }

    #[test]
    fn test_engine_status_only_notifies_on_change() {
        let mut engine = FakeEngine::new();
        engine.ready = false;
        let (mut player, rx) = subscribed(engine);
        player.play(URL).unwrap();
        let _ = published(&rx);

        player.on_engine_status(TimeControl::Waiting);
        assert!(rx.try_recv().is_err());

        player.engine_mut().status = TimeControl::Playing;
        player.on_engine_status(TimeControl::Playing);
        assert_eq!(published(&rx), vec![PlaybackState::Playing]);
    }

    #[test]
    fn test_finished_ignores_engine_pause() {
        let (mut player, rx) = subscribed(FakeEngine::with_duration(10));
        player.play(URL).unwrap();
        player.finish();
        let _ = published(&rx);

        player.on_engine_status(TimeControl::Paused);

        assert_eq!(player.state(), PlaybackState::Finished);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_without_subscriber_transitions_still_apply() {
        let mut player = Player::new(FakeEngine::with_duration(10));
        player.play(URL).unwrap();
        player.play_pause();
        assert_eq!(player.state(), PlaybackState::Paused);
    }
}
