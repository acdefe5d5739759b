//! Input field with its send control.
//!
//! Multi-line input; Ctrl+J inserts a newline everywhere, Shift+Enter and
//! Ctrl+Enter where the terminal reports modified Enter keys.
//! While a send is in flight the field is disabled and the control reads
//! `Sending...`.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Palette;
use crate::widgets::TextInputState;

/// Most input lines shown before the field scrolls.
pub const MAX_VISIBLE_LINES: u16 = 5;

/// Input bar widget.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    palette: &'a Palette,
    send_label: &'a str,
    locked: bool,
}

impl<'a> InputBar<'a> {
    pub fn new(input: &'a TextInputState, palette: &'a Palette) -> Self {
        Self {
            input,
            palette,
            send_label: "Send",
            locked: false,
        }
    }

    /// Label of the send control.
    #[must_use]
    pub fn send_label(mut self, label: &'a str) -> Self {
        self.send_label = label;
        self
    }

    /// Disable editing.
    #[must_use]
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Height needed for the current content, borders included.
    pub fn height(input: &TextInputState) -> u16 {
        let lines = u16::try_from(input.content().split('\n').count()).unwrap_or(u16::MAX);
        lines.clamp(1, MAX_VISIBLE_LINES) + 2
    }

    /// Lines of the field and the index of the line holding the cursor.
    fn build_lines(&self) -> (Vec<Line<'static>>, usize) {
        let text_style = Style::default().fg(self.palette.text);
        let prompt_style = Style::default().fg(self.palette.primary);

        if self.locked {
            let line = Line::from(vec![
                Span::styled("> ", prompt_style),
                Span::styled(
                    "Waiting for reply...",
                    Style::default()
                        .fg(self.palette.muted)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]);
            return (vec![line], 0);
        }

        if self.input.is_empty() {
            let line = Line::from(vec![
                Span::styled("> ", prompt_style),
                Span::styled("█", text_style),
                Span::styled(
                    " Type a message...",
                    Style::default().fg(self.palette.muted),
                ),
            ]);
            return (vec![line], 0);
        }

        let mut lines = Vec::new();
        let mut cursor_line = 0;
        let mut offset = 0;
        let cursor = self.input.cursor();

        for (idx, text) in self.input.content().split('\n').enumerate() {
            let len = text.chars().count();
            let prefix = if idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(prefix, prompt_style)];

            if cursor >= offset && cursor <= offset + len {
                cursor_line = idx;
                let col = cursor - offset;
                let before: String = text.chars().take(col).collect();
                let after: String = text.chars().skip(col).collect();
                spans.push(Span::styled(before, text_style));
                spans.push(Span::styled("█", text_style));
                spans.push(Span::styled(after, text_style));
            } else {
                spans.push(Span::styled(text.to_string(), text_style));
            }

            lines.push(Line::from(spans));
            offset += len + 1;
        }

        (lines, cursor_line)
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (border, label_style) = if self.locked {
            (
                self.palette.border,
                Style::default().fg(self.palette.muted),
            )
        } else {
            (
                self.palette.border_focused,
                Style::default()
                    .fg(self.palette.primary)
                    .add_modifier(Modifier::BOLD),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title_top(
                Line::from(Span::styled(format!("[ {} ]", self.send_label), label_style))
                    .right_aligned(),
            )
            .style(Style::default().bg(self.palette.base));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let (lines, cursor_line) = self.build_lines();
        let visible = inner.height as usize;
        let start = (cursor_line + 1).saturating_sub(visible);
        let end = (start + visible).min(lines.len());

        Paragraph::new(lines[start..end].to_vec()).render(inner, buf);
    }
}
