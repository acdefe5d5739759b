//! Message rendering.
//!
//! Converts a [`Message`] into a sanitized HTML fragment:
//!
//! ```text
//! <div class="chat-message bot-message">
//!   <div class="thinking-log">…steps…</div>      (bot, when enabled)
//!   <div class="message-content">…text…</div>
//!   <div class="sources">…links…</div>          (when sources exist)
//! </div>
//! ```
//!
//! All message text is escaped before any Markdown interpretation.

mod emoji;
mod escape;
mod highlight;
mod markdown;

use std::fmt::Write;

pub use emoji::replace_shortcodes;
pub use escape::{escape_html, unescape_html};
pub use highlight::{find_syntax, highlight_code_block, syntax_set, CLASS_PREFIX};
pub use markdown::{markdown_to_html, EXTERNAL_LINK_ATTRS};

use crate::config::WidgetConfig;
use crate::message::{Message, Role, Step};

/// Rendering switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Interpret bot text as Markdown.
    pub markdown: bool,
    /// Show the thinking log before bot text.
    pub thinking_log: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            markdown: true,
            thinking_log: true,
        }
    }
}

impl From<&WidgetConfig> for RenderOptions {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            markdown: config.enable_markdown,
            thinking_log: config.enable_thinking_log,
        }
    }
}

/// Renders messages into HTML fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    /// Create a renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Active options.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render a whole transcript entry for a message.
    pub fn render_message(&self, message: &Message) -> String {
        let mut html = format!(
            "<div class=\"chat-message {}\">\n",
            message.role.css_class()
        );

        if message.role == Role::Bot && self.options.thinking_log && !message.step_log.is_empty() {
            html.push_str(&render_step_log(&message.step_log));
        }

        html.push_str("<div class=\"message-content\">");
        html.push_str(&self.render_text(message.role, &message.text));
        html.push_str("</div>\n");

        if !message.sources.is_empty() {
            html.push_str(&render_sources(&message.sources));
        }

        html.push_str("</div>\n");
        html
    }

    /// Render the message body. User text is never interpreted as Markdown.
    pub fn render_text(&self, role: Role, text: &str) -> String {
        let escaped = escape_html(text);
        if role == Role::Bot && self.options.markdown {
            markdown_to_html(&escaped)
        } else {
            format!("<p class=\"plain\">{}</p>", escaped.replace('\n', "<br>"))
        }
    }
}

/// Render thinking-log steps in input order.
pub fn render_step_log(steps: &[Step]) -> String {
    let mut html = String::from("<div class=\"thinking-log\">\n");
    for step in steps {
        let _ = writeln!(
            html,
            "<div class=\"thinking-step phase-{}\"><span class=\"step-icon\">{}</span>\
             <span class=\"step-caption\">{}</span>\
             <span class=\"step-message\">{}</span></div>",
            step.phase.as_str(),
            step.phase.icon(),
            escape_html(&step.caption()),
            escape_html(&step.description),
        );
    }
    html.push_str("</div>\n");
    html
}

/// Hostname of an absolute http(s) URL.
pub fn source_hostname(source: &str) -> Option<String> {
    let url = url::Url::parse(source.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str().map(str::to_string)
}

/// Render sources as links labelled by hostname, in input order.
///
/// Anything that is not an absolute http(s) URL is shown as plain text.
pub fn render_sources(sources: &[String]) -> String {
    let mut html = String::from("<div class=\"sources\">\n");
    for source in sources {
        match source_hostname(source) {
            Some(host) => {
                let _ = writeln!(
                    html,
                    "<a class=\"source-link\" href=\"{}\" {EXTERNAL_LINK_ATTRS}>🔗 {}</a>",
                    escape_html(source.trim()),
                    escape_html(&host),
                );
            }
            None => {
                let _ = writeln!(
                    html,
                    "<span class=\"source-text\">🔗 {}</span>",
                    escape_html(source)
                );
            }
        }
    }
    html.push_str("</div>\n");
    html
}

/// Markup of the loading placeholder.
pub fn render_placeholder(progress: Option<&str>) -> String {
    let mut html = String::from(
        "<div class=\"loading-indicator\">\
         <div class=\"loading-dot\"></div>\
         <div class=\"loading-dot\" style=\"animation-delay: 0.2s\"></div>\
         <div class=\"loading-dot\" style=\"animation-delay: 0.4s\"></div>",
    );
    if let Some(progress) = progress {
        let _ = write!(
            html,
            "<span class=\"loading-progress\">{}</span>",
            escape_html(progress)
        );
    }
    html.push_str("</div>\n");
    html
}

/// Markup of the error surface.
pub fn render_error(message: &str) -> String {
    format!(
        "<div class=\"error-message\" role=\"alert\">{}</div>\n",
        escape_html(message)
    )
}
