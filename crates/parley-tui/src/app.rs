//! Application state for the chat screen.

use std::path::{Path, PathBuf};

use parley_engine::{ChatResponse, ChatWidget, PendingSend, RenderOptions, RequestError};
use tracing::{info, warn};

use crate::event::Action;
use crate::theme::Palette;
use crate::widgets::TextInputState;

/// Lines moved per PgUp/PgDn.
const SCROLL_STEP: usize = 10;

/// Main application state.
pub struct App {
    /// The chat widget being hosted.
    pub widget: ChatWidget,
    /// Editable input, kept separately so it can hold history.
    pub input: TextInputState,
    /// Colors of the active theme.
    pub palette: Palette,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_back: usize,
    /// Animation counter, advanced on every tick.
    pub tick: usize,
    /// One-line status shown in the footer.
    pub status: Option<String>,
    pub should_quit: bool,
    data_dir: PathBuf,
    /// Entry count at the last tick; growth snaps the view to the bottom.
    seen_entries: usize,
}

impl App {
    /// Create the app around an initialized widget.
    pub fn new(widget: ChatWidget, data_dir: PathBuf) -> Self {
        let palette = Palette::for_preference(widget.theme());
        Self {
            widget,
            input: TextInputState::new(),
            palette,
            scroll_back: 0,
            tick: 0,
            status: None,
            should_quit: false,
            data_dir,
            seen_entries: 0,
        }
    }

    /// Rendering switches derived from the widget configuration.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::from(self.widget.config())
    }

    /// Apply an action. Returns a request to spawn when a send starts.
    pub fn handle_action(&mut self, action: Action) -> Option<PendingSend> {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleTheme => self.toggle_theme(),
            Action::Export => self.export(),
            Action::ScrollUp => self.scroll_back += SCROLL_STEP,
            Action::ScrollDown => self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP),
            Action::Send => return self.send(),
            Action::None => {}
            edit => {
                if !self.widget.controls_locked() {
                    self.edit(edit);
                }
            }
        }
        None
    }

    /// Feed back the result of the spawned send.
    pub fn complete(&mut self, result: Result<ChatResponse, RequestError>) {
        self.widget.complete(result);
        self.follow_new_entries();
    }

    /// Advance animations and the progress label.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        self.widget.update_progress();
        self.follow_new_entries();
    }

    /// Footer text: status message or key hints.
    pub fn footer(&self) -> String {
        if let Some(status) = &self.status {
            return status.clone();
        }
        let mut hint = String::from("Enter send · Ctrl+J newline");
        if self.widget.config().enable_theme_toggle {
            hint.push_str(" · Ctrl+T theme");
        }
        hint.push_str(" · Ctrl+E export · PgUp/PgDn scroll · Esc quit");
        hint
    }

    fn send(&mut self) -> Option<PendingSend> {
        if self.widget.controls_locked() {
            return None;
        }
        let pending = self.widget.submit_text(self.input.content())?;
        self.input.submit();
        self.status = None;
        self.follow_new_entries();
        Some(pending)
    }

    fn edit(&mut self, action: Action) {
        match action {
            Action::Insert(c) => self.input.insert(c),
            Action::Newline => self.input.insert('\n'),
            Action::Backspace => self.input.backspace(),
            Action::Delete => self.input.delete(),
            Action::Left => self.input.move_left(),
            Action::Right => self.input.move_right(),
            Action::Home => self.input.move_home(),
            Action::End => self.input.move_end(),
            Action::HistoryPrev => self.input.history_prev(),
            Action::HistoryNext => self.input.history_next(),
            _ => {}
        }
    }

    fn toggle_theme(&mut self) {
        if !self.widget.config().enable_theme_toggle {
            return;
        }
        let theme = self.widget.toggle_theme();
        self.palette = Palette::for_preference(theme);
    }

    fn export(&mut self) {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = self.data_dir.join(format!("transcript-{stamp}.html"));
        self.status = Some(match write_export(&path, &self.widget.export_html()) {
            Ok(()) => {
                info!(path = %path.display(), "Transcript exported");
                format!("Exported to {}", path.display())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Transcript export failed");
                format!("Export failed: {e}")
            }
        });
    }

    fn follow_new_entries(&mut self) {
        let count = self.widget.transcript().entries().len();
        if count != self.seen_entries {
            self.seen_entries = count;
            self.scroll_back = 0;
            self.widget.transcript_mut().scroll_to_bottom();
        }
    }
}

fn write_export(path: &Path, html: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
}
