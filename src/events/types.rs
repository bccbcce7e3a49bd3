use crossterm::event::{KeyEvent, MouseEvent};
use std::time::Duration;

use crate::player::commands::{PlaybackState, TimeControl};

#[derive(Debug, Clone)]
pub enum AppEvent {
    // From input thread
    Input(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),

    // From the player facade
    PlayerStateChanged(PlaybackState),

    // From engine thread
    Engine(EngineEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StatusChanged(TimeControl),
    DurationLoaded(Duration),
    Ended,
    Error(String),
}
