use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::overlay::Overlay;
use crate::app::seek::{SeekBar, point_in_rect, reaches_end, seek_target};
use crate::config::Config;
use crate::events::types::{AppEvent, EngineEvent};
use crate::player::commands::{ButtonIcon, PlaybackState};
use crate::player::engine::MediaEngine;
use crate::player::facade::Player;
use crate::player::poller::{self, Poller, ProgressSnapshot};
use crate::ui::duration::PlayerDuration;
use crate::ui::loading::LoadingAnimation;
use crate::ui::notifications::NotificationManager;

#[derive(Default, Clone)]
pub struct LayoutRegions {
    pub surface: Option<Rect>,
    pub overlay: Option<Rect>,
    pub button: Option<Rect>,
}

/// Owns the widgets' state and wires input and player events together.
pub struct App<E: MediaEngine> {
    pub player: Player<E>,
    pub poller: Poller,
    pub overlay: Overlay,
    pub seek_bar: SeekBar,

    // What the controls currently show
    pub icon: ButtonIcon,
    pub label: String,
    pub slider: f64,
    last_total: Option<Duration>,

    pub media_url: String,
    seek_step: Duration,

    pub notifications: NotificationManager,
    pub spinner: LoadingAnimation,

    pub should_quit: bool,
    pub layout_regions: LayoutRegions,
}

impl<E: MediaEngine> App<E> {
    pub fn new(player: Player<E>, config: &Config, now: Instant) -> Self {
        let state = player.state();
        Self {
            player,
            poller: Poller::new(config.poll_interval()),
            overlay: Overlay::with_auto_hide(now, config.auto_hide_delay()),
            seek_bar: SeekBar::default(),

            icon: state.icon(),
            label: String::from("--:-- / --:--"),
            slider: 0.0,
            last_total: None,

            media_url: config.media_url.clone(),
            seek_step: config.seek_step(),

            notifications: NotificationManager::new(),
            spinner: LoadingAnimation::new(now),

            should_quit: false,
            layout_regions: LayoutRegions::default(),
        }
    }

    /// Subscribes to the player and starts the configured media.
    pub fn start(&mut self, event_tx: mpsc::Sender<AppEvent>) {
        self.player.subscribe(event_tx);
        let url = self.media_url.clone();
        if let Err(e) = self.player.play(&url) {
            log::warn!("{}", e);
            self.notifications.warning(format!("Cannot play: {}", e));
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.player.state()
    }

    pub fn tick(&mut self, now: Instant) {
        self.overlay.tick(now);
        self.notifications.tick(now);
        self.spinner.tick(now);

        if self.poller.due(now) {
            self.on_poll();
        }
    }

    /// How long the main loop may sleep before the next scheduled tick.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.poller.time_until_due(now)
    }

    fn on_poll(&mut self) {
        let Some(snapshot) = poller::sample(&self.player) else {
            return;
        };
        self.show_progress(&snapshot);
    }

    fn show_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.label = snapshot.label();
        self.slider = if snapshot.current.is_zero() {
            0.0
        } else {
            snapshot.ratio
        };
        self.last_total = Some(snapshot.total);
    }

    pub fn on_player_state_changed(&mut self, state: PlaybackState, now: Instant) {
        self.icon = state.icon();
        if state.is_polling() {
            self.poller.start(now);
        } else {
            self.poller.stop();
        }
    }

    pub fn on_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::StatusChanged(status) => self.player.on_engine_status(status),
            EngineEvent::DurationLoaded(total) => {
                self.notifications
                    .info(format!("Media ready ({})", PlayerDuration::from(total)));
                self.last_total = Some(total);
                self.on_poll();
            }
            EngineEvent::Ended => self.finish_playback(),
            EngineEvent::Error(e) => {
                self.notifications.error(format!("Player: {}", e));
            }
        }
    }

    /// Shared by end-of-media and seeking onto the very end.
    fn finish_playback(&mut self) {
        self.poller.stop();
        self.player.finish();
        if let Some(total) = self.player.total_duration().or(self.last_total) {
            self.show_progress(&ProgressSnapshot::new(Duration::ZERO, total));
        } else {
            self.slider = 0.0;
        }
    }

    pub fn toggle_playback(&mut self) {
        self.player.play_pause();
    }

    pub fn seek_to_fraction(&mut self, fraction: f64) {
        let Some(total) = self.last_total.or_else(|| self.player.total_duration()) else {
            log::debug!("Ignoring seek, duration not loaded yet");
            return;
        };
        if total.is_zero() {
            return;
        }
        self.seek_to(seek_target(fraction, total), total);
    }

    pub fn seek_forward(&mut self) {
        if let Some(total) = self.player.total_duration() {
            let target = self
                .player
                .current_duration()
                .saturating_add(self.seek_step)
                .min(total);
            self.seek_to(target, total);
        }
    }

    pub fn seek_backward(&mut self) {
        if let Some(total) = self.player.total_duration() {
            let target = self.player.current_duration().saturating_sub(self.seek_step);
            self.seek_to(target, total);
        }
    }

    fn seek_to(&mut self, target: Duration, total: Duration) {
        self.player.seek(target);
        if reaches_end(target, total) {
            self.finish_playback();
        } else {
            self.show_progress(&ProgressSnapshot::new(target, total));
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                self.toggle_playback();
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.seek_forward();
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.seek_backward();
            }
            KeyCode::Enter => {
                self.overlay.toggle();
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        let (x, y) = (event.column, event.row);

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !self.overlay.is_visible() {
                    if self.in_region(self.layout_regions.surface, x, y) {
                        self.overlay.show();
                    }
                    return;
                }

                if self.in_region(self.layout_regions.button, x, y) {
                    self.toggle_playback();
                } else if self.seek_bar.contains(x, y) {
                    if self.seek_bar.is_dragging() {
                        return;
                    }
                    self.seek_bar.press();
                    if let Some(fraction) = self.seek_bar.fraction_at(x) {
                        self.seek_to_fraction(fraction);
                    }
                } else if self.in_region(self.layout_regions.overlay, x, y) {
                    self.overlay.hide();
                } else if self.in_region(self.layout_regions.surface, x, y) {
                    self.overlay.show();
                }
            }

            MouseEventKind::Drag(MouseButton::Left) => {
                if self.seek_bar.drag() {
                    if let Some(fraction) = self.seek_bar.fraction_at(x) {
                        self.seek_to_fraction(fraction);
                    }
                }
            }

            MouseEventKind::Up(MouseButton::Left) => {
                self.seek_bar.release();
            }

            _ => {}
        }
    }

    fn in_region(&self, region: Option<Rect>, x: u16, y: u16) -> bool {
        region.is_some_and(|rect| point_in_rect(x, y, &rect))
    }
}
