//! Markdown to HTML conversion using pulldown-cmark.
//!
//! Input must already be escaped with [`escape_html`]. Entities in ordinary
//! text are decoded by the parser and escaped again by the HTML writer, so
//! the output never contains markup that came from the message itself. Code
//! spans and code blocks keep entities verbatim, so they are unescaped here
//! before being escaped once more by the writer or the highlighter.

use std::sync::OnceLock;

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use super::emoji::replace_shortcodes;
use super::escape::{escape_html, unescape_html};
use super::highlight::highlight_code_block;

/// Attributes added to every link opened from the transcript.
pub const EXTERNAL_LINK_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer""#;

fn bare_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s<>"'`]+"#).expect("url pattern is valid"))
}

/// Convert escaped Markdown to HTML.
pub fn markdown_to_html(escaped: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(escaped, options);

    let mut writer = EventRewriter::default();
    for event in parser {
        writer.handle_event(event);
    }
    writer.flush_text();

    let mut out = String::new();
    html::push_html(&mut out, writer.events.into_iter());
    out
}

/// Rewrites parser events into safe, enriched events.
#[derive(Default)]
struct EventRewriter<'a> {
    /// Output events.
    events: Vec<Event<'a>>,
    /// Adjacent text events are merged so URLs split at entities stay whole.
    pending_text: String,
    /// Open code block: (info string, accumulated code).
    code_block: Option<(String, String)>,
    /// Nesting depth of links; text inside links is not autolinked.
    link_depth: usize,
}

impl<'a> EventRewriter<'a> {
    fn handle_event(&mut self, event: Event<'a>) {
        if self.code_block.is_some() {
            self.handle_code_block_event(event);
            return;
        }

        match event {
            Event::Text(text) => {
                self.pending_text.push_str(&text);
            }
            // Raw HTML never reaches the output as markup.
            Event::Html(raw) | Event::InlineHtml(raw) => {
                self.pending_text.push_str(&raw);
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush_text();
                let info = match kind {
                    CodeBlockKind::Fenced(info) => info.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((info, String::new()));
            }
            Event::Code(code) => {
                self.flush_text();
                self.events.push(Event::Code(unescape_html(&code).into()));
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                self.flush_text();
                self.link_depth += 1;
                self.events.push(Event::Start(Tag::Link {
                    link_type,
                    dest_url: safe_destination(&dest_url),
                    title,
                    id,
                }));
            }
            Event::End(TagEnd::Link) => {
                self.flush_text();
                self.link_depth = self.link_depth.saturating_sub(1);
                self.events.push(Event::End(TagEnd::Link));
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                self.flush_text();
                self.events.push(Event::Start(Tag::Image {
                    link_type,
                    dest_url: safe_destination(&dest_url),
                    title,
                    id,
                }));
            }
            other => {
                self.flush_text();
                self.events.push(other);
            }
        }
    }

    fn handle_code_block_event(&mut self, event: Event<'a>) {
        match event {
            Event::Text(text) => {
                if let Some((_, code)) = self.code_block.as_mut() {
                    code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((info, code)) = self.code_block.take() {
                    let html = highlight_code_block(&unescape_html(&code), &info);
                    self.events.push(Event::Html(html.into()));
                }
            }
            _ => {}
        }
    }

    /// Emit merged text with bare URLs linked and shortcodes replaced
    /// outside them.
    fn flush_text(&mut self) {
        if self.pending_text.is_empty() {
            return;
        }

        let text = std::mem::take(&mut self.pending_text);
        if self.link_depth > 0 {
            self.push_text(&text);
            return;
        }

        let mut last = 0;
        for m in bare_url_regex().find_iter(&text) {
            let url = trim_url(m.as_str());
            if !has_host(url) {
                continue;
            }

            if m.start() > last {
                self.push_text(&text[last..m.start()]);
            }
            self.events.push(Event::Html(
                format!("<a href=\"{}\" {EXTERNAL_LINK_ATTRS}>", escape_html(url)).into(),
            ));
            self.events.push(Event::Text(url.to_string().into()));
            self.events.push(Event::Html("</a>".into()));
            last = m.start() + url.len();
        }

        if last < text.len() {
            self.push_text(&text[last..]);
        }
    }

    fn push_text(&mut self, text: &str) {
        let text = replace_shortcodes(text).into_owned();
        self.events.push(Event::Text(text.into()));
    }
}

/// Drop trailing punctuation from a matched URL.
///
/// A closing bracket stays when it balances an opening one inside the URL.
fn trim_url(candidate: &str) -> &str {
    let mut url = candidate;
    while let Some(last) = url.chars().next_back() {
        let strip = match last {
            '.' | ',' | ';' | ':' | '!' | '?' => true,
            ')' => unbalanced(url, '(', ')'),
            ']' => unbalanced(url, '[', ']'),
            '}' => unbalanced(url, '{', '}'),
            _ => false,
        };
        if !strip {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

fn unbalanced(url: &str, open: char, close: char) -> bool {
    url.matches(close).count() > url.matches(open).count()
}

fn has_host(url: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|host| !host.is_empty()))
        .unwrap_or(false)
}

/// Keep http(s), mailto, and relative destinations; neutralise the rest.
fn safe_destination(dest: &str) -> CowStr<'static> {
    let safe = match url::Url::parse(dest.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "mailto"),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    };

    if safe {
        CowStr::from(dest.to_string())
    } else {
        CowStr::Borrowed("#")
    }
}
