//! parley-tui: Terminal host for the parley chat widget
//!
//! This crate provides the interactive screen for parley:
//! - Scrolling transcript with Markdown, thinking log, and sources
//! - Input field with history and a send control
//! - Light/dark palettes following the persisted theme

mod app;
mod event;
#[cfg(test)]
pub mod test_utils;
mod text;
mod theme;
mod ui;
mod widgets;

pub use app::App;
pub use event::{key_to_action, Action, Event, EventHandler};
pub use parley_engine;
pub use theme::Palette;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use parley_engine::{ChatResponse, ChatWidget, RequestError};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Tick interval; drives the loading animation and progress label.
const TICK_RATE_MS: u64 = 250;

type SendTask = JoinHandle<Result<ChatResponse, RequestError>>;

/// RAII guard for terminal state restoration.
struct TerminalGuard {
    /// Keyboard enhancement flags were pushed and must be popped.
    enhanced_keys: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.enhanced_keys {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the chat screen until the user quits.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit. Exports are written to `data_dir`.
pub async fn run_tui(widget: ChatWidget, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut guard = TerminalGuard {
        enhanced_keys: false,
    };

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Lets Shift+Enter and Ctrl+Enter arrive with their modifiers.
    if supports_keyboard_enhancement().unwrap_or(false) {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        guard.enhanced_keys = true;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(widget, data_dir.to_path_buf());
    let mut events = EventHandler::new(TICK_RATE_MS);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    // At most one request in flight; the widget ignores sends while locked.
    let mut send_task: Option<SendTask> = None;

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    let action = key_to_action(key);
                    if let Some(pending) = app.handle_action(action) {
                        debug!(len = pending.message.len(), "Spawning send task");
                        send_task = Some(tokio::spawn(pending.dispatch()));
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.handle_action(Action::ScrollUp);
                    }
                    MouseEventKind::ScrollDown => {
                        app.handle_action(Action::ScrollDown);
                    }
                    _ => {}
                },
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {}
            }
        }

        if send_task.as_ref().is_some_and(JoinHandle::is_finished) {
            if let Some(handle) = send_task.take() {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "Send task did not complete");
                        Err(RequestError::Malformed(format!("send task failed: {e}")))
                    }
                };
                app.complete(result);
            }
        }

        if app.should_quit {
            if let Some(handle) = send_task.take() {
                handle.abort();
            }
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
