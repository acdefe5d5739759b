//! Syntax highlighting for fenced code blocks.
//!
//! Highlighting emits CSS classes (`hl-keyword`, `hl-string`, ...) rather
//! than inline colors so the same markup works under both themes.

use std::sync::OnceLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::escape::escape_html;

/// Prefix of every class emitted by the highlighter.
pub const CLASS_PREFIX: &str = "hl-";

/// Syntax definitions, loaded once.
pub fn syntax_set() -> &'static SyntaxSet {
    static SET: OnceLock<SyntaxSet> = OnceLock::new();
    SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Resolve a fence info string (`rust`, `py title="x"`) to a syntax.
pub fn find_syntax(info: &str) -> Option<&'static SyntaxReference> {
    let token = info.split_whitespace().next()?;
    syntax_set().find_syntax_by_token(token)
}

/// Render a code block as HTML.
///
/// Unknown or missing languages produce an escaped, unhighlighted block.
pub fn highlight_code_block(code: &str, info: &str) -> String {
    let lang = info.split_whitespace().next().unwrap_or("");

    let body = find_syntax(info)
        .and_then(|syntax| classed_html(code, syntax))
        .unwrap_or_else(|| escape_html(code));

    if lang.is_empty() {
        format!("<pre class=\"code-block\"><code>{body}</code></pre>\n")
    } else {
        format!(
            "<pre class=\"code-block\"><code class=\"language-{}\">{body}</code></pre>\n",
            escape_html(lang)
        )
    }
}

fn classed_html(code: &str, syntax: &SyntaxReference) -> Option<String> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        syntax_set(),
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );

    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .ok()?;
    }

    Some(generator.finalize())
}
