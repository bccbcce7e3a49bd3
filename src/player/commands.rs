use std::time::Duration;

use reqwest::Url;

/// Commands sent from an [`EngineHandle`](super::thread::EngineHandle) to the engine thread.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    Load(Url),
    Play,
    Pause,
    Seek(Duration),
}

/// What the media engine itself reports about its clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControl {
    Waiting,
    Playing,
    Paused,
}

/// Playback state as seen by the UI.
///
/// `Finished` is entered only through the end-of-media path and drives the
/// replay affordance on the play/pause button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Waiting,
    Playing,
    Paused,
    Finished,
}

impl PlaybackState {
    pub fn icon(&self) -> ButtonIcon {
        match self {
            PlaybackState::Paused => ButtonIcon::Play,
            PlaybackState::Finished => ButtonIcon::Replay,
            PlaybackState::Waiting | PlaybackState::Playing => ButtonIcon::Pause,
        }
    }

    /// Whether the position poller should be running in this state.
    pub fn is_polling(&self) -> bool {
        matches!(self, PlaybackState::Waiting | PlaybackState::Playing)
    }
}

impl From<TimeControl> for PlaybackState {
    fn from(status: TimeControl) -> Self {
        match status {
            TimeControl::Waiting => PlaybackState::Waiting,
            TimeControl::Playing => PlaybackState::Playing,
            TimeControl::Paused => PlaybackState::Paused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonIcon {
    Play,
    Pause,
    Replay,
}

impl ButtonIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            ButtonIcon::Play => "▶",
            ButtonIcon::Pause => "⏸",
            ButtonIcon::Replay => "↻",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ButtonIcon::Play => "Play",
            ButtonIcon::Pause => "Pause",
            ButtonIcon::Replay => "Replay",
        }
    }
}
