use crate::events::types::AppEvent;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::event::MouseEventKind;
use crossterm::execute;
use std::io::{self, Write, stdout};
use std::{sync::mpsc, thread::JoinHandle};

/// Turns mouse reporting back off. The input thread is usually still blocked
/// in `read()` at exit, so the main loop calls this too.
pub fn release_mouse(out: &mut impl Write) -> io::Result<()> {
    execute!(out, DisableMouseCapture)
}

/// Forwards terminal input to the main loop until the receiver goes away.
pub fn spawn(event_tx: mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if let Err(e) = execute!(stdout(), EnableMouseCapture) {
            log::warn!("Mouse capture unavailable: {}", e);
        }

        loop {
            let event = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Input(key),
                Ok(Event::Mouse(mouse)) if mouse.kind != MouseEventKind::Moved => {
                    AppEvent::Mouse(mouse)
                }
                Ok(Event::Resize(width, height)) => AppEvent::Resize(width, height),
                Ok(_) => continue,
                Err(e) => {
                    log::error!("Terminal input error: {}", e);
                    break;
                }
            };

            if event_tx.send(event).is_err() {
                break;
            }
        }

        let _ = release_mouse(&mut stdout());
    })
}
