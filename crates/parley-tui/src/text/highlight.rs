//! Code block highlighting for the terminal.

use std::sync::OnceLock;

use parley_engine::render::{find_syntax, syntax_set};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::util::LinesWithEndings;

fn theme_set() -> &'static ThemeSet {
    static SET: OnceLock<ThemeSet> = OnceLock::new();
    SET.get_or_init(ThemeSet::load_defaults)
}

/// Highlight `code` as the language named by a fence info string.
///
/// Returns `None` when the language or the syntect theme is unknown; callers
/// fall back to a flat code style.
pub fn highlight_code(code: &str, info: &str, theme_name: &str) -> Option<Vec<Line<'static>>> {
    let syntax = find_syntax(info)?;
    let theme: &Theme = theme_set().themes.get(theme_name)?;
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        let ranges = highlighter.highlight_line(line, syntax_set()).ok()?;
        let spans: Vec<Span<'static>> = ranges
            .into_iter()
            .map(|(style, text)| {
                let fg = style.foreground;
                Span::styled(
                    text.trim_end_matches(['\n', '\r']).to_string(),
                    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                )
            })
            .filter(|span| !span.content.is_empty())
            .collect();
        lines.push(Line::from(spans));
    }
    Some(lines)
}
