//! Markdown rendering using pulldown-cmark.
//!
//! Bot replies become styled ratatui Lines. Raw HTML in a reply is shown as
//! literal text, the same way the HTML renderer treats it.

use parley_engine::render::replace_shortcodes;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span},
};

use crate::theme::Palette;

use super::highlight::highlight_code;
use super::styles::ReplyStyles;

/// Render markdown text to styled Lines.
pub fn render_markdown(input: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(input, options);
    let mut renderer = MarkdownRenderer::new(palette);
    for event in parser {
        renderer.handle_event(event);
    }
    renderer.flush_line();

    // No trailing blank line after the last block.
    while renderer.lines.last().is_some_and(|l| l.spans.is_empty()) {
        renderer.lines.pop();
    }
    renderer.lines
}

struct MarkdownRenderer<'p> {
    lines: Vec<Line<'static>>,
    palette: &'p Palette,
    styles: ReplyStyles,
    /// Active inline styles, innermost last.
    style_stack: Vec<Style>,
    current_spans: Vec<Span<'static>>,
    /// Open list levels; `Some(n)` is an ordered list at item `n`.
    lists: Vec<Option<u64>>,
    /// Open code block: (info string, accumulated code).
    code_block: Option<(String, String)>,
    blockquote_depth: usize,
    pending_list_marker: Option<String>,
    /// Destination of the open link.
    link_url: Option<String>,
    /// Whether the current table cell is the first of its row.
    first_cell: bool,
}

impl<'p> MarkdownRenderer<'p> {
    fn new(palette: &'p Palette) -> Self {
        Self {
            lines: Vec::new(),
            palette,
            styles: ReplyStyles::new(palette),
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            lists: Vec::new(),
            code_block: None,
            blockquote_depth: 0,
            pending_list_marker: None,
            link_url: None,
            first_cell: true,
        }
    }

    #[allow(clippy::too_many_lines)]
    fn handle_event(&mut self, event: Event<'_>) {
        if let Some((_, code)) = self.code_block.as_mut() {
            match event {
                Event::Text(text) => code.push_str(&text),
                Event::End(TagEnd::CodeBlock) => self.finish_code_block(),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                let style = self.styles.heading(level);
                self.style_stack.push(style);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
                self.blank_line();
            }

            Event::Start(Tag::Emphasis) => self.style_stack.push(self.styles.emphasis),
            Event::Start(Tag::Strong) => self.style_stack.push(self.styles.strong),
            Event::Start(Tag::Strikethrough) => {
                self.style_stack.push(self.styles.struck);
            }
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::Link { dest_url, .. }) => {
                self.style_stack.push(self.styles.link);
                self.link_url = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                self.style_stack.pop();
                if let Some(url) = self.link_url.take() {
                    let shown: String = self
                        .current_spans
                        .iter()
                        .map(|s| s.content.as_ref())
                        .collect();
                    if !url.is_empty() && !shown.ends_with(url.as_str()) {
                        self.current_spans
                            .push(Span::styled(format!(" ({url})"), self.styles.link_target));
                    }
                }
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_line();
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((info, String::new()));
            }

            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.pending_list_marker = Some(marker);
            }
            Event::End(TagEnd::Item) => self.flush_line(),
            Event::TaskListMarker(checked) => {
                self.take_list_marker();
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.current_spans
                    .push(Span::styled(checkbox, self.styles.marker));
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.blockquote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.blockquote_depth = self.blockquote_depth.saturating_sub(1);
            }

            Event::Start(Tag::TableRow | Tag::TableHead) => {
                self.flush_line();
                self.first_cell = true;
            }
            Event::End(TagEnd::TableHead) => {
                self.flush_line();
                self.current_spans
                    .push(Span::styled("───", self.styles.rule));
                self.flush_line();
            }
            Event::End(TagEnd::TableRow) => self.flush_line(),
            Event::Start(Tag::TableCell) => {
                if !self.first_cell {
                    self.current_spans
                        .push(Span::styled(" │ ", self.styles.rule));
                }
                self.first_cell = false;
            }
            Event::End(TagEnd::Table) => self.blank_line(),

            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }

            Event::Text(text) => {
                let text = replace_shortcodes(&text).into_owned();
                self.add_text(text);
            }
            Event::Html(raw) | Event::InlineHtml(raw) => {
                for (i, part) in raw.split('\n').enumerate() {
                    if i > 0 {
                        self.flush_line();
                    }
                    if !part.is_empty() {
                        self.add_text(part.to_string());
                    }
                }
            }
            Event::Code(code) => {
                self.prefix_line();
                self.current_spans
                    .push(Span::styled(code.to_string(), self.styles.code));
            }

            Event::SoftBreak => self.add_text(" ".to_string()),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.flush_line();
                self.current_spans
                    .push(Span::styled("────────", self.styles.rule));
                self.flush_line();
                self.blank_line();
            }

            _ => {}
        }
    }

    fn add_text(&mut self, text: String) {
        self.prefix_line();
        let style = self.current_style();
        self.current_spans.push(Span::styled(text, style));
    }

    /// Emit list markers and quote bars owed to the start of a line.
    fn prefix_line(&mut self) {
        if self.blockquote_depth > 0 && self.current_spans.is_empty() {
            self.current_spans.push(Span::styled(
                "│ ".repeat(self.blockquote_depth),
                self.styles.quote,
            ));
        }
        self.take_list_marker();
    }

    fn take_list_marker(&mut self) {
        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.marker));
        }
    }

    fn finish_code_block(&mut self) {
        let Some((info, code)) = self.code_block.take() else {
            return;
        };
        let indent = "  ".repeat(self.lists.len());

        let highlighted = highlight_code(&code, &info, self.palette.code_theme);
        match highlighted {
            Some(lines) => {
                for line in lines {
                    let mut spans = vec![Span::raw(format!("{indent}  "))];
                    spans.extend(line.spans);
                    self.lines.push(Line::from(spans));
                }
            }
            None => {
                for line in code.lines() {
                    self.lines.push(Line::from(vec![
                        Span::raw(format!("{indent}  ")),
                        Span::styled(line.to_string(), self.styles.code),
                    ]));
                }
            }
        }
        self.blank_line();
    }

    fn current_style(&self) -> Style {
        let mut style = self.styles.body;
        for s in &self.style_stack {
            style = style.patch(*s);
        }
        if self.blockquote_depth > 0 {
            style = style.patch(self.styles.quote);
        }
        style
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }
}
