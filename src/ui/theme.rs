use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

use crate::player::commands::PlaybackState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    TokyoNight,
    #[default]
    CatppuccinMocha,
}

#[derive(Clone, Copy)]
pub struct Theme {
    // Base colors
    pub bg: Color,
    pub fg: Color,
    pub fg_dim: Color,

    // UI elements
    pub border: Color,
    pub overlay_bg: Color,

    // Accents
    pub accent: Color,

    // Semantic colors
    pub playing: Color,
    pub paused: Color,
    pub finished: Color,
    pub error: Color,
    pub title: Color,
}

impl Theme {
    pub const fn tokyo_night() -> Self {
        Self {
            bg: Color::Rgb(26, 27, 38),           // #1a1b26
            fg: Color::Rgb(192, 202, 245),        // #c0caf5
            fg_dim: Color::Rgb(86, 95, 137),      // #565f89
            border: Color::Rgb(61, 89, 161),      // #3d59a1
            overlay_bg: Color::Rgb(41, 46, 66),   // #292e42
            accent: Color::Rgb(125, 207, 255),    // #7dcfff
            playing: Color::Rgb(158, 206, 106),   // #9ece6a
            paused: Color::Rgb(224, 175, 104),    // #e0af68
            finished: Color::Rgb(187, 154, 247),  // #bb9af7
            error: Color::Rgb(247, 118, 142),     // #f7768e
            title: Color::Rgb(122, 162, 247),     // #7aa2f7
        }
    }

    pub const fn catppuccin_mocha() -> Self {
        Self {
            bg: Color::Rgb(30, 30, 46),           // #1e1e2e
            fg: Color::Rgb(205, 214, 244),        // #cdd6f4
            fg_dim: Color::Rgb(108, 112, 134),    // #6c7086
            border: Color::Rgb(137, 180, 250),    // #89b4fa
            overlay_bg: Color::Rgb(49, 50, 68),   // #313244
            accent: Color::Rgb(148, 226, 213),    // #94e2d5
            playing: Color::Rgb(166, 227, 161),   // #a6e3a1
            paused: Color::Rgb(249, 226, 175),    // #f9e2af
            finished: Color::Rgb(203, 166, 247),  // #cba6f7
            error: Color::Rgb(243, 139, 168),     // #f38ba8
            title: Color::Rgb(137, 180, 250),     // #89b4fa
        }
    }

    pub const fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::TokyoNight => Self::tokyo_night(),
            ThemeName::CatppuccinMocha => Self::catppuccin_mocha(),
        }
    }

    pub fn border_style(&self) -> Style {
        Style::new().fg(self.border)
    }

    pub fn title_style(&self) -> Style {
        Style::new().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::new().fg(self.fg_dim)
    }

    pub fn value_style(&self) -> Style {
        Style::new().fg(self.fg)
    }

    pub fn header_style(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn state_color(&self, state: PlaybackState) -> Color {
        match state {
            PlaybackState::Playing => self.playing,
            PlaybackState::Paused => self.paused,
            PlaybackState::Finished => self.finished,
            PlaybackState::Waiting => self.fg_dim,
        }
    }
}

static THEME: OnceLock<Theme> = OnceLock::new();

/// First call wins; later calls are ignored.
pub fn init_theme(name: ThemeName) {
    let _ = THEME.set(Theme::from_name(name));
}

pub fn get_theme() -> &'static Theme {
    THEME.get_or_init(|| Theme::from_name(ThemeName::default()))
}
