//! The scrolling transcript.
//!
//! Messages are append-only. Besides messages the transcript holds at most
//! one loading placeholder and at most one error surface; both are transient
//! and are excluded from exports.

use std::fmt::Write;

use tracing::debug;

use crate::message::Message;
use crate::render::{render_error, render_placeholder, Renderer};
use crate::theme::ThemePreference;

/// What a transcript entry shows.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    /// A rendered chat message.
    Message(Message),
    /// The loading indicator, with an optional progress label.
    Placeholder { progress: Option<String> },
    /// A user-visible error.
    Error(String),
}

/// A transcript entry with its rendered markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Entry kind and payload.
    pub kind: EntryKind,
    /// Sanitized HTML fragment.
    pub html: String,
}

/// Ordered list of display entries.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    renderer: Renderer,
    entries: Vec<Entry>,
    /// Index of the entry scrolled into view (the last one after insertion).
    scroll_offset: usize,
}

impl Transcript {
    /// Create an empty transcript using `renderer` for messages.
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            entries: Vec::new(),
            scroll_offset: 0,
        }
    }

    /// Render `message` and append it, then scroll to the bottom.
    ///
    /// A placeholder still present is removed first so that it never sits
    /// between two messages.
    pub fn render_message(&mut self, message: Message) -> &Entry {
        if self.remove_placeholder() {
            debug!("Placeholder removed implicitly before rendering a message");
        }

        let html = self.renderer.render_message(&message);
        self.push(Entry {
            kind: EntryKind::Message(message),
            html,
        })
    }

    /// Append the loading placeholder. Returns `false` if one already exists.
    pub fn show_placeholder(&mut self, progress: Option<String>) -> bool {
        if self.has_placeholder() {
            return false;
        }

        let html = render_placeholder(progress.as_deref());
        self.push(Entry {
            kind: EntryKind::Placeholder { progress },
            html,
        });
        true
    }

    /// Update the progress label of the placeholder, if shown.
    pub fn set_placeholder_progress(&mut self, label: impl Into<String>) {
        let label = label.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| matches!(e.kind, EntryKind::Placeholder { .. }))
        {
            entry.html = render_placeholder(Some(&label));
            entry.kind = EntryKind::Placeholder {
                progress: Some(label),
            };
        }
    }

    /// Remove the placeholder. Returns whether one was present.
    pub fn remove_placeholder(&mut self) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|e| !matches!(e.kind, EntryKind::Placeholder { .. }));
        let removed = self.entries.len() != before;
        if removed {
            self.clamp_scroll();
        }
        removed
    }

    /// Show an error, replacing any error already displayed.
    pub fn show_error(&mut self, message: impl Into<String>) -> &Entry {
        self.remove_placeholder();
        self.clear_error();

        let message = message.into();
        let html = render_error(&message);
        self.push(Entry {
            kind: EntryKind::Error(message),
            html,
        })
    }

    /// Remove the error surface. Returns whether one was present.
    pub fn clear_error(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !matches!(e.kind, EntryKind::Error(_)));
        let removed = self.entries.len() != before;
        if removed {
            self.clamp_scroll();
        }
        removed
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Rendered messages in display order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|e| match &e.kind {
            EntryKind::Message(m) => Some(m),
            _ => None,
        })
    }

    /// Number of messages (placeholder and error excluded).
    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    /// Whether the placeholder is shown.
    pub fn has_placeholder(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e.kind, EntryKind::Placeholder { .. }))
    }

    /// The error currently displayed, if any.
    pub fn error(&self) -> Option<&str> {
        self.entries.iter().find_map(|e| match &e.kind {
            EntryKind::Error(m) => Some(m.as_str()),
            _ => None,
        })
    }

    /// Index of the entry scrolled into view.
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Whether the view sits on the last entry.
    pub fn is_at_bottom(&self) -> bool {
        self.entries.is_empty() || self.scroll_offset == self.entries.len() - 1
    }

    /// Scroll to the last entry.
    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.entries.len().saturating_sub(1);
    }

    /// Body markup of the transcript container.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div id=\"chat-messages\">\n");
        for entry in &self.entries {
            html.push_str(&entry.html);
        }
        html.push_str("</div>\n");
        html
    }

    /// Standalone HTML page with the messages only.
    pub fn to_html_document(&self, theme: ThemePreference) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"{}\">\n<head>\n\
             <meta charset=\"utf-8\">\n<title>parley transcript</title>\n</head>\n<body>\n\
             <div id=\"chat-messages\">\n",
            theme.marker(),
        );
        for entry in &self.entries {
            if matches!(entry.kind, EntryKind::Message(_)) {
                html.push_str(&entry.html);
            }
        }
        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    fn push(&mut self, entry: Entry) -> &Entry {
        self.entries.push(entry);
        self.scroll_to_bottom();
        &self.entries[self.entries.len() - 1]
    }

    fn clamp_scroll(&mut self) {
        let last = self.entries.len().saturating_sub(1);
        if self.scroll_offset > last {
            self.scroll_offset = last;
        }
    }
}
