use std::fs::{self, File};
use std::io::stdout;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ratatui::DefaultTerminal;

use crate::{
    app::state::App, events::types::AppEvent, player::facade::Player,
    player::thread::EngineHandle,
};

mod app;
mod config;
mod events;
mod input;
mod player;
mod ui;

const IDLE_WAIT: Duration = Duration::from_millis(50);

fn init_logging() -> Result<()> {
    let log_dir = dirs::cache_dir()
        .context("Could not find cache directory")?
        .join("reelplay");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    let file = File::create(log_dir.join("reelplay.log")).context("Failed to create log file")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {:#}", e);
    }

    let config = config::load_or_create_config()?;
    ui::theme::init_theme(config.theme);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();

    let _input_handle = input::thread::spawn(event_tx.clone());
    let (engine, _engine_handle) = player::thread::spawn(event_tx.clone());

    let mut app = App::new(Player::new(engine), &config, Instant::now());
    app.start(event_tx);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app, &event_rx);
    ratatui::restore();
    if let Err(e) = input::thread::release_mouse(&mut stdout()) {
        log::warn!("Failed to disable mouse capture: {}", e);
    }

    if let Err(ref e) = result {
        log::error!("Exiting with error: {:#}", e);
    }
    result
}

fn run(
    terminal: &mut DefaultTerminal,
    app: &mut App<EngineHandle>,
    event_rx: &mpsc::Receiver<AppEvent>,
) -> Result<()> {
    loop {
        let now = Instant::now();
        app.tick(now);

        terminal.draw(|f| ui::render::render(f, app))?;

        let timeout = app
            .next_wakeup(now)
            .map_or(IDLE_WAIT, |due| due.min(IDLE_WAIT));

        match event_rx.recv_timeout(timeout) {
            Ok(event) => match event {
                AppEvent::Input(key_event) => app.handle_input(key_event),
                AppEvent::Mouse(mouse_event) => app.handle_mouse(mouse_event),
                AppEvent::Resize(_width, _height) => {}
                AppEvent::PlayerStateChanged(state) => {
                    app.on_player_state_changed(state, Instant::now())
                }
                AppEvent::Engine(engine_event) => app.on_engine_event(engine_event),
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                anyhow::bail!("Event channel disconnected");
            }
        }

        if app.should_quit {
            log::info!("Quit requested");
            return Ok(());
        }
    }
}
