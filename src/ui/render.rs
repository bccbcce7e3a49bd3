use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::{
    app::state::App,
    player::{commands::PlaybackState, engine::MediaEngine},
    ui::{notifications::NotificationLevel, theme::get_theme},
};

const ROUNDED_BORDER: border::Set = border::ROUNDED;
const OVERLAY_HEIGHT: u16 = 4;

fn block_with_title(title: &'_ str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_set(ROUNDED_BORDER)
        .title(title)
}

pub fn render<E: MediaEngine>(f: &mut Frame, app: &mut App<E>) {
    let theme = get_theme();
    let area = f.area();

    let background = Block::default().style(Style::default().bg(theme.bg));
    f.render_widget(background, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(f, chunks[0]);
    draw_surface(f, chunks[1], app);
    draw_footer(f, chunks[2]);
    draw_notifications(f, chunks[1], app);
}

fn draw_header(f: &mut Frame, area: Rect) {
    let theme = get_theme();
    let header = Paragraph::new("reelplay")
        .style(theme.header_style())
        .block(block_with_title(" ▶ ").border_style(theme.border_style()))
        .centered();
    f.render_widget(header, area);
}

fn state_text(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Waiting => "Buffering",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Finished => "Finished",
    }
}

fn draw_surface<E: MediaEngine>(f: &mut Frame, area: Rect, app: &mut App<E>) {
    let theme = get_theme();
    let block = block_with_title(" ● Video ").border_style(theme.border_style());
    let inner = block.inner(area);
    f.render_widget(block, area);
    app.layout_regions.surface = Some(area);

    let state = app.state();
    let lines = vec![
        Line::from(Span::styled(app.media_url.as_str(), theme.title_style())),
        Line::from(""),
        Line::from(Span::styled(
            state_text(state),
            Style::new().fg(theme.state_color(state)),
        )),
    ];
    let info_height = (lines.len() as u16).min(inner.height);
    let info_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(info_height) / 2,
        width: inner.width,
        height: info_height,
    };
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        info_area,
    );

    if app.overlay.is_visible() && inner.height >= OVERLAY_HEIGHT {
        let overlay_area = Rect {
            x: inner.x,
            y: inner.y + inner.height - OVERLAY_HEIGHT,
            width: inner.width,
            height: OVERLAY_HEIGHT,
        };
        draw_controls(f, overlay_area, app);
    } else {
        app.layout_regions.overlay = None;
        app.layout_regions.button = None;
        app.seek_bar.area = None;
    }
}

fn draw_controls<E: MediaEngine>(f: &mut Frame, area: Rect, app: &mut App<E>) {
    let theme = get_theme();
    let block = block_with_title(" Controls ")
        .border_style(theme.border_style())
        .style(Style::new().bg(theme.overlay_bg));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    app.layout_regions.overlay = Some(area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let state = app.state();
    let spinner = if state == PlaybackState::Waiting {
        app.spinner.current_frame()
    } else {
        " "
    };
    let button_text = format!("{} {} {}", app.icon.glyph(), app.icon.label(), spinner);
    let button_width = (button_text.chars().count() as u16).min(rows[0].width);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(button_width),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(rows[0]);

    f.render_widget(
        Paragraph::new(button_text).style(Style::new().fg(theme.state_color(state))),
        top[0],
    );
    app.layout_regions.button = Some(top[0]);

    f.render_widget(
        Paragraph::new(app.label.as_str())
            .alignment(Alignment::Right)
            .style(theme.value_style()),
        top[2],
    );

    draw_slider(f, rows[1], app.slider, state);
    app.seek_bar.area = Some(rows[1]);
}

fn draw_slider(f: &mut Frame, area: Rect, progress: f64, state: PlaybackState) {
    let theme = get_theme();
    let slider_width = area.width as usize;
    let filled = ((progress * slider_width as f64) as usize).min(slider_width);

    let slider_spans = vec![
        Span::styled("━".repeat(filled), Style::new().fg(theme.state_color(state))),
        Span::styled(
            "─".repeat(slider_width - filled),
            Style::new().fg(theme.fg_dim),
        ),
    ];
    f.render_widget(Paragraph::new(Line::from(slider_spans)), area);
}

fn draw_notifications<E: MediaEngine>(f: &mut Frame, area: Rect, app: &App<E>) {
    let theme = get_theme();
    for (i, n) in app.notifications.active_notifications().iter().enumerate() {
        let y = area.y + 1 + i as u16;
        if y >= area.y + area.height.saturating_sub(1) {
            break;
        }
        let color = match n.level {
            NotificationLevel::Info => theme.accent,
            NotificationLevel::Warning => theme.paused,
            NotificationLevel::Error => theme.error,
        };
        let text = format!(" {} {} ", n.level.prefix(), n.text);
        let width = (text.chars().count() as u16).min(area.width.saturating_sub(2));
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height: 1,
        };
        f.render_widget(Clear, rect);
        f.render_widget(Paragraph::new(text).style(Style::new().fg(color)), rect);
    }
}

fn draw_footer(f: &mut Frame, area: Rect) {
    let theme = get_theme();
    let keybinds =
        "Space: Play/Pause | ←→/hl: Seek | Click: Controls | Click bar: Seek | Enter: Toggle controls | q: Quit";

    f.render_widget(
        Paragraph::new(keybinds)
            .style(theme.label_style())
            .block(block_with_title("").border_style(theme.border_style())),
        area,
    );
}
