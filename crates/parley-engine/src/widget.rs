//! The chat widget: one context object owning every piece of widget state.
//!
//! A host (the TUI, the CLI) feeds user actions in and reads the transcript
//! out. The only suspension point is the network call, which is handed to
//! the host as a [`PendingSend`] so it can run on a spawned task; its result
//! comes back through [`ChatWidget::complete`].

use std::time::{Duration, Instant};

use tracing::debug;

use crate::client::{ChatClient, ChatResponse, RequestError};
use crate::config::WidgetConfig;
use crate::message::Message;
use crate::orchestrator::{transition, Effect, SendEvent, SendState};
use crate::render::{RenderOptions, Renderer};
use crate::session::get_or_create_session_id;
use crate::storage::KeyValueStore;
use crate::theme::{ThemeController, ThemePreference};
use crate::transcript::Transcript;

/// Label of the send control while idle.
pub const SEND_LABEL: &str = "Send";

/// Label of the send control while a request is in flight.
pub const SENDING_LABEL: &str = "Sending...";

/// A request the host must run and report back.
#[derive(Debug, Clone)]
pub struct PendingSend {
    /// Session the request belongs to.
    pub session_id: String,
    /// Trimmed message text.
    pub message: String,
    client: ChatClient,
}

impl PendingSend {
    /// Perform the request under the configured deadline.
    pub async fn dispatch(self) -> Result<ChatResponse, RequestError> {
        self.client.send(&self.session_id, &self.message).await
    }
}

/// Result of a full send as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was sent (blank input or a send already in flight).
    Ignored,
    /// The bot reply was rendered.
    Replied,
    /// An error was shown with this text.
    Failed(String),
}

/// Chat widget state.
pub struct ChatWidget {
    config: WidgetConfig,
    store: Box<dyn KeyValueStore + Send>,
    session_id: String,
    theme: ThemeController,
    transcript: Transcript,
    input: String,
    controls_locked: bool,
    state: SendState,
    timer: Option<Instant>,
    client: ChatClient,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("controls_locked", &self.controls_locked)
            .field("messages", &self.transcript.message_count())
            .finish_non_exhaustive()
    }
}

impl ChatWidget {
    /// Initialize the widget: session, theme, and an empty transcript.
    pub fn new(
        config: WidgetConfig,
        mut store: Box<dyn KeyValueStore + Send>,
    ) -> Result<Self, RequestError> {
        let client = ChatClient::new(&config)?;
        let session_id = get_or_create_session_id(store.as_mut());
        let theme = ThemeController::initialize(store.as_ref(), config.enable_theme_toggle);
        let transcript = Transcript::new(Renderer::new(RenderOptions::from(&config)));

        debug!(session_id = %session_id, theme = theme.marker(), "Widget initialized");

        Ok(Self {
            config,
            store,
            session_id,
            theme,
            transcript,
            input: String::new(),
            controls_locked: false,
            state: SendState::Idle,
            timer: None,
            client,
        })
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Mutable access for scrolling.
    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input field contents. Ignored while controls are locked.
    pub fn set_input(&mut self, text: impl Into<String>) {
        if !self.controls_locked {
            self.input = text.into();
        }
    }

    pub fn controls_locked(&self) -> bool {
        self.controls_locked
    }

    /// Current label of the send control.
    pub fn send_label(&self) -> &'static str {
        if self.controls_locked {
            SENDING_LABEL
        } else {
            SEND_LABEL
        }
    }

    pub fn theme(&self) -> ThemePreference {
        self.theme.preference()
    }

    /// Icon shown on the theme toggle.
    pub fn theme_icon(&self) -> &'static str {
        self.theme.icon()
    }

    /// Flip and persist the theme.
    pub fn toggle_theme(&mut self) -> ThemePreference {
        self.theme.toggle(self.store.as_mut())
    }

    /// Time since the in-flight request started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.timer.map(|started| started.elapsed())
    }

    /// Refresh the placeholder's progress label from the request timer.
    pub fn update_progress(&mut self) {
        if let Some(elapsed) = self.elapsed() {
            self.transcript
                .set_placeholder_progress(format!("{}s", elapsed.as_secs()));
        }
    }

    /// Standalone HTML page of the conversation in the active theme.
    pub fn export_html(&self) -> String {
        self.transcript.to_html_document(self.theme.preference())
    }

    /// Submit the current input.
    ///
    /// Returns the request to run, or `None` when the input is blank or a
    /// send is already in flight.
    pub fn submit(&mut self) -> Option<PendingSend> {
        let text = self.input.clone();
        self.drive(SendEvent::Submit(text))
    }

    /// Put `text` in the input field and submit it.
    pub fn submit_text(&mut self, text: impl Into<String>) -> Option<PendingSend> {
        self.set_input(text);
        self.submit()
    }

    /// Feed back the result of a [`PendingSend`].
    ///
    /// Results arriving while no send is in flight are dropped.
    pub fn complete(&mut self, result: Result<ChatResponse, RequestError>) -> SendOutcome {
        if self.state != SendState::Sending {
            debug!(state = ?self.state, "Dropping result with no send in flight");
            return SendOutcome::Ignored;
        }

        let event = match result {
            Ok(response) => SendEvent::Completed(response),
            Err(error) => SendEvent::Failed(error),
        };
        self.drive(event);

        let outcome = match self.state {
            SendState::Failed => SendOutcome::Failed(
                self.transcript.error().unwrap_or_default().to_string(),
            ),
            _ => SendOutcome::Replied,
        };
        self.drive(SendEvent::Settle);
        outcome
    }

    /// Submit the current input and wait for the outcome.
    pub async fn send(&mut self) -> SendOutcome {
        let Some(pending) = self.submit() else {
            return SendOutcome::Ignored;
        };
        let result = pending.dispatch().await;
        self.complete(result)
    }

    /// Run one transition and apply its effects in order.
    fn drive(&mut self, event: SendEvent) -> Option<PendingSend> {
        let (next, effects) = transition(self.state, event);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "Send state changed");
        }
        self.state = next;

        let mut pending = None;
        for effect in effects {
            if let Some(send) = self.apply(effect) {
                pending = Some(send);
            }
        }
        pending
    }

    fn apply(&mut self, effect: Effect) -> Option<PendingSend> {
        match effect {
            Effect::RenderUser(text) => {
                self.transcript.render_message(Message::user(text));
            }
            Effect::ClearInput => self.input.clear(),
            Effect::LockControls => self.controls_locked = true,
            Effect::ShowPlaceholder => {
                self.transcript.show_placeholder(None);
            }
            Effect::StartTimer => self.timer = Some(Instant::now()),
            Effect::Dispatch(message) => {
                return Some(PendingSend {
                    session_id: self.session_id.clone(),
                    message,
                    client: self.client.clone(),
                });
            }
            Effect::RemovePlaceholder => {
                self.transcript.remove_placeholder();
            }
            Effect::RenderBot(message) => {
                self.transcript.clear_error();
                self.transcript.render_message(message);
            }
            Effect::ShowError(message) => {
                self.transcript.show_error(message);
            }
            Effect::UnlockControls => self.controls_locked = false,
            Effect::CancelTimer => self.timer = None,
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TIMEOUT_MESSAGE;
    use crate::message::Role;
    use crate::session::SESSION_KEY;
    use crate::storage::MemoryStore;
    use crate::transcript::EntryKind;

    fn widget() -> ChatWidget {
        ChatWidget::new(WidgetConfig::default(), Box::new(MemoryStore::new())).unwrap()
    }

    fn reply(text: &str) -> ChatResponse {
        ChatResponse {
            response: text.to_string(),
            sources: Vec::new(),
            thinking_log: Vec::new(),
        }
    }

    #[test]
    fn test_new_reuses_persisted_session() {
        let mut store = MemoryStore::new();
        store.set(SESSION_KEY, "session-1-abc").unwrap();
        let widget = ChatWidget::new(WidgetConfig::default(), Box::new(store)).unwrap();
        assert_eq!(widget.session_id(), "session-1-abc");
    }

    #[test]
    fn test_blank_submit_does_nothing() {
        let mut widget = widget();
        assert!(widget.submit_text("   ").is_none());
        assert!(widget.transcript().entries().is_empty());
        assert_eq!(widget.state(), SendState::Idle);
        assert!(!widget.controls_locked());
    }

    #[test]
    fn test_submit_locks_and_shows_placeholder() {
        let mut widget = widget();
        let pending = widget.submit_text("  hello  ").unwrap();

        assert_eq!(pending.message, "hello");
        assert_eq!(pending.session_id, widget.session_id());
        assert_eq!(widget.input(), "");
        assert!(widget.controls_locked());
        assert_eq!(widget.send_label(), SENDING_LABEL);
        assert!(widget.transcript().has_placeholder());
        assert!(widget.elapsed().is_some());

        let messages: Vec<_> = widget.transcript().messages().collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "hello");
    }

    #[test]
    fn test_second_submit_while_sending_is_ignored() {
        let mut widget = widget();
        widget.submit_text("one").unwrap();
        assert!(widget.submit_text("two").is_none());
        assert_eq!(widget.transcript().message_count(), 1);
    }

    #[test]
    fn test_success_renders_reply_and_unlocks() {
        let mut widget = widget();
        widget.submit_text("q").unwrap();
        let outcome = widget.complete(Ok(reply("answer")));

        assert_eq!(outcome, SendOutcome::Replied);
        assert_eq!(widget.state(), SendState::Idle);
        assert!(!widget.controls_locked());
        assert_eq!(widget.send_label(), SEND_LABEL);
        assert!(!widget.transcript().has_placeholder());
        assert!(widget.elapsed().is_none());
        assert_eq!(widget.transcript().message_count(), 2);
    }

    #[test]
    fn test_failure_shows_error_and_unlocks() {
        let mut widget = widget();
        widget.submit_text("q").unwrap();
        let outcome = widget.complete(Err(RequestError::Timeout(Duration::from_secs(1))));

        assert_eq!(outcome, SendOutcome::Failed(TIMEOUT_MESSAGE.to_string()));
        assert_eq!(widget.state(), SendState::Idle);
        assert!(!widget.controls_locked());
        assert!(!widget.transcript().has_placeholder());
        assert_eq!(widget.transcript().error(), Some(TIMEOUT_MESSAGE));
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut widget = widget();
        widget.submit_text("q").unwrap();
        widget.complete(Err(RequestError::Status(502)));
        widget.submit_text("again").unwrap();
        widget.complete(Ok(reply("ok")));

        assert_eq!(widget.transcript().error(), None);
        assert!(widget
            .transcript()
            .entries()
            .iter()
            .all(|e| !matches!(e.kind, EntryKind::Error(_))));
    }

    #[test]
    fn test_late_result_is_dropped() {
        let mut widget = widget();
        assert_eq!(widget.complete(Ok(reply("late"))), SendOutcome::Ignored);
        assert!(widget.transcript().entries().is_empty());
    }

    #[test]
    fn test_input_frozen_while_locked() {
        let mut widget = widget();
        widget.submit_text("q").unwrap();
        widget.set_input("typing");
        assert_eq!(widget.input(), "");
    }

    #[test]
    fn test_progress_label_tracks_timer() {
        let mut widget = widget();
        widget.submit_text("q").unwrap();
        widget.update_progress();
        let placeholder = widget
            .transcript()
            .entries()
            .iter()
            .find(|e| matches!(e.kind, EntryKind::Placeholder { .. }))
            .unwrap();
        assert!(matches!(
            &placeholder.kind,
            EntryKind::Placeholder { progress: Some(p) } if p.ends_with('s')
        ));
    }

    #[test]
    fn test_export_uses_theme() {
        let mut widget = widget();
        widget.toggle_theme();
        assert_eq!(widget.theme(), ThemePreference::Dark);
        assert!(widget.export_html().contains("data-theme=\"dark\""));
    }
}
