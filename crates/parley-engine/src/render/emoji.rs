//! Emoji shortcodes (`:rocket:` and friends).

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

fn shortcode_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":([a-z0-9_+\-]+):").expect("shortcode pattern is valid"))
}

/// Look up the emoji for a shortcode name (without colons).
pub fn lookup(name: &str) -> Option<&'static str> {
    let emoji = match name {
        "smile" => "😄",
        "grin" => "😁",
        "joy" => "😂",
        "wink" => "😉",
        "thinking" => "🤔",
        "wave" => "👋",
        "clap" => "👏",
        "+1" | "thumbsup" => "👍",
        "-1" | "thumbsdown" => "👎",
        "heart" => "❤️",
        "star" => "⭐",
        "sparkles" => "✨",
        "fire" => "🔥",
        "rocket" => "🚀",
        "tada" => "🎉",
        "eyes" => "👀",
        "bulb" => "💡",
        "memo" => "📝",
        "book" => "📖",
        "link" => "🔗",
        "mag" => "🔍",
        "warning" => "⚠️",
        "x" => "❌",
        "white_check_mark" | "check" => "✅",
        "question" => "❓",
        "100" => "💯",
        "globe_with_meridians" => "🌐",
        _ => return None,
    };
    Some(emoji)
}

/// Replace known shortcodes; unknown ones (and things like `12:30:45`) stay.
pub fn replace_shortcodes(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }

    shortcode_regex().replace_all(text, |caps: &Captures<'_>| {
        lookup(&caps[1]).map_or_else(|| caps[0].to_string(), str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_shortcodes() {
        assert_eq!(replace_shortcodes("Ship it :rocket:"), "Ship it 🚀");
        assert_eq!(replace_shortcodes(":+1: :tada:"), "👍 🎉");
    }

    #[test]
    fn test_unknown_shortcodes_untouched() {
        assert_eq!(replace_shortcodes("at 12:30:45"), "at 12:30:45");
        assert_eq!(replace_shortcodes(":nope:"), ":nope:");
    }

    #[test]
    fn test_no_colon_borrows() {
        assert!(matches!(replace_shortcodes("plain"), Cow::Borrowed(_)));
    }
}
