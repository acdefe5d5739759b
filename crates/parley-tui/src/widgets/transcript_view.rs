//! Scrolling transcript pane.
//!
//! ```text
//! ┌ parley ─────────────────────────── 🌙 ┐
//! │ You                                    │
//! │ What is the capital of France?         │
//! │                                        │
//! │ Bot                                    │
//! │ 🧠 Step 1 — Planning  plan the search  │
//! │ Paris is the capital.                  │
//! │ 🔗 en.wikipedia.org                    │
//! └────────────────────────────────────────┘
//! ```

use parley_engine::render::source_hostname;
use parley_engine::{EntryKind, Message, RenderOptions, Role, Transcript};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::{render_markdown, wrap_lines};
use crate::theme::Palette;

/// Frames of the loading animation.
const DOTS: [&str; 4] = ["●○○", "○●○", "○○●", "○●○"];

/// Build the styled lines of every transcript entry.
pub fn transcript_lines(
    transcript: &Transcript,
    options: RenderOptions,
    palette: &Palette,
    tick: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for entry in transcript.entries() {
        match &entry.kind {
            EntryKind::Message(message) => {
                message_lines(message, options, palette, &mut lines);
            }
            EntryKind::Placeholder { progress } => {
                let mut spans = vec![Span::styled(
                    DOTS[tick % DOTS.len()],
                    Style::default().fg(palette.primary),
                )];
                if let Some(progress) = progress {
                    spans.push(Span::styled(
                        format!(" {progress}"),
                        Style::default().fg(palette.muted),
                    ));
                }
                lines.push(Line::from(spans));
            }
            EntryKind::Error(text) => {
                lines.push(Line::from(Span::styled(
                    format!("⚠ {text}"),
                    Style::default()
                        .fg(palette.error)
                        .add_modifier(Modifier::BOLD),
                )));
            }
        }
    }

    lines
}

fn message_lines(
    message: &Message,
    options: RenderOptions,
    palette: &Palette,
    lines: &mut Vec<Line<'static>>,
) {
    let (label, color) = match message.role {
        Role::User => ("You", palette.user),
        Role::Bot => ("Bot", palette.bot),
    };
    lines.push(Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));

    if message.role == Role::Bot && options.thinking_log {
        for step in &message.step_log {
            let color = palette.phase(step.phase);
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} {}", step.phase.icon(), step.caption()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", step.description),
                    Style::default().fg(palette.subtext),
                ),
            ]));
        }
    }

    if message.role == Role::Bot && options.markdown {
        lines.extend(render_markdown(&message.text, palette));
    } else {
        let style = Style::default().fg(palette.text);
        for text_line in message.text.split('\n') {
            lines.push(Line::from(Span::styled(text_line.to_string(), style)));
        }
    }

    for source in &message.sources {
        let line = match source_hostname(source) {
            Some(host) => Line::from(Span::styled(
                format!("🔗 {host}"),
                Style::default()
                    .fg(palette.info)
                    .add_modifier(Modifier::UNDERLINED),
            )),
            None => Line::from(Span::styled(
                format!("🔗 {source}"),
                Style::default().fg(palette.muted),
            )),
        };
        lines.push(line);
    }

    lines.push(Line::default());
}

/// The transcript pane.
pub struct TranscriptView<'a> {
    lines: Vec<Line<'static>>,
    palette: &'a Palette,
    theme_icon: &'a str,
    /// Lines scrolled up from the bottom.
    scroll_back: usize,
}

impl<'a> TranscriptView<'a> {
    pub fn new(lines: Vec<Line<'static>>, palette: &'a Palette) -> Self {
        Self {
            lines,
            palette,
            theme_icon: "",
            scroll_back: 0,
        }
    }

    /// Icon of the theme toggle, shown in the title bar.
    #[must_use]
    pub fn theme_icon(mut self, icon: &'a str) -> Self {
        self.theme_icon = icon;
        self
    }

    #[must_use]
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.border))
            .title(Span::styled(
                " parley ",
                Style::default()
                    .fg(self.palette.primary)
                    .add_modifier(Modifier::BOLD),
            ))
            .title_top(Line::from(format!(" {} ", self.theme_icon)).right_aligned())
            .style(Style::default().bg(self.palette.base));

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let wrapped = wrap_lines(self.lines, inner.width as usize);
        let height = inner.height as usize;
        let max_back = wrapped.len().saturating_sub(height);
        let back = self.scroll_back.min(max_back);
        let start = wrapped.len().saturating_sub(height + back);
        let end = (start + height).min(wrapped.len());

        Paragraph::new(wrapped[start..end].to_vec()).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;
    use parley_engine::{Phase, Step};

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn sample() -> Transcript {
        let mut transcript = Transcript::default();
        transcript.render_message(Message::user("What is the capital of France?"));
        transcript.render_message(Message::bot(
            "Paris is the **capital**.",
            vec!["https://en.wikipedia.org/wiki/Paris".into(), "not a url".into()],
            vec![Step::new(1, Phase::Searching, "looking it up")],
        ));
        transcript
    }

    #[test]
    fn test_message_lines() {
        let lines = transcript_lines(&sample(), RenderOptions::default(), &Palette::default(), 0);
        assert_eq!(
            text(&lines),
            vec![
                "You",
                "What is the capital of France?",
                "",
                "Bot",
                "🔍 Step 1 \u{2014} Searching  looking it up",
                "Paris is the capital.",
                "🔗 en.wikipedia.org",
                "🔗 not a url",
                "",
            ]
        );
    }

    #[test]
    fn test_options_disable_markdown_and_steps() {
        let options = RenderOptions {
            markdown: false,
            thinking_log: false,
        };
        let lines = transcript_lines(&sample(), options, &Palette::default(), 0);
        let text = text(&lines);
        assert!(text.contains(&"Paris is the **capital**.".to_string()));
        assert!(!text.iter().any(|l| l.contains("Step 1")));
    }

    #[test]
    fn test_user_text_is_not_markdown() {
        let mut transcript = Transcript::default();
        transcript.render_message(Message::user("**literal**"));
        let lines = transcript_lines(&transcript, RenderOptions::default(), &Palette::default(), 0);
        assert_eq!(text(&lines)[1], "**literal**");
    }

    #[test]
    fn test_placeholder_animates() {
        let mut transcript = Transcript::default();
        transcript.show_placeholder(Some("2s".into()));
        let first = transcript_lines(&transcript, RenderOptions::default(), &Palette::default(), 0);
        let second = transcript_lines(&transcript, RenderOptions::default(), &Palette::default(), 1);
        assert_eq!(text(&first), vec!["●○○ 2s"]);
        assert_eq!(text(&second), vec!["○●○ 2s"]);
    }

    #[test]
    fn test_error_line() {
        let mut transcript = Transcript::default();
        transcript.show_error("Request timed out. Please try again.");
        let lines = transcript_lines(&transcript, RenderOptions::default(), &Palette::default(), 0);
        assert_eq!(text(&lines), vec!["⚠ Request timed out. Please try again."]);
    }

    #[test]
    fn test_view_follows_bottom() {
        let palette = Palette::default();
        let lines: Vec<Line<'static>> = (0..20).map(|i| Line::from(format!("line {i}"))).collect();
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        TranscriptView::new(lines, &palette).render(area, &mut buf);

        let screen = buffer_to_string(&buf);
        assert!(screen.contains("line 19"));
        assert!(screen.contains("line 16"));
        assert!(!screen.contains("line 15"));
    }

    #[test]
    fn test_view_scroll_back() {
        let palette = Palette::default();
        let lines: Vec<Line<'static>> = (0..20).map(|i| Line::from(format!("line {i}"))).collect();
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        TranscriptView::new(lines, &palette)
            .scroll_back(100)
            .render(area, &mut buf);

        let screen = buffer_to_string(&buf);
        assert!(screen.contains("line 0"));
        assert!(!screen.contains("line 19"));
    }
}
