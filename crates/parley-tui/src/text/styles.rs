//! Span styles for bot replies, derived from the active palette.

use pulldown_cmark::HeadingLevel;
use ratatui::style::{Color, Modifier, Style};

use crate::theme::Palette;

#[derive(Debug, Clone)]
pub struct ReplyStyles {
    pub body: Style,
    /// H1, H2, then everything deeper.
    headings: [Style; 3],
    pub emphasis: Style,
    pub strong: Style,
    pub struck: Style,
    /// Inline code and unhighlighted code blocks.
    pub code: Style,
    pub link: Style,
    /// Destination printed after a link's text.
    pub link_target: Style,
    /// List bullets, numbers and task boxes.
    pub marker: Style,
    pub quote: Style,
    /// Table separators and horizontal rules.
    pub rule: Style,
}

impl ReplyStyles {
    pub fn new(palette: &Palette) -> Self {
        let fg = |color: Color| Style::default().fg(color);
        let bold = |color: Color| fg(color).add_modifier(Modifier::BOLD);

        Self {
            body: fg(palette.text),
            headings: [
                bold(palette.primary),
                bold(palette.text),
                bold(palette.subtext),
            ],
            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            struck: Style::default().add_modifier(Modifier::CROSSED_OUT),
            code: fg(palette.secondary).bg(palette.surface),
            link: fg(palette.info).add_modifier(Modifier::UNDERLINED),
            link_target: fg(palette.muted),
            marker: fg(palette.muted),
            quote: fg(palette.subtext).add_modifier(Modifier::ITALIC),
            rule: fg(palette.border),
        }
    }

    pub fn heading(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.headings[0],
            HeadingLevel::H2 => self.headings[1],
            _ => self.headings[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_follow_palette() {
        let palette = Palette::mocha();
        let styles = ReplyStyles::new(&palette);
        assert_eq!(styles.heading(HeadingLevel::H1).fg, Some(palette.primary));
        assert_eq!(styles.heading(HeadingLevel::H5), styles.heading(HeadingLevel::H3));
        assert!(styles
            .heading(HeadingLevel::H2)
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_light_and_dark_differ() {
        let light = ReplyStyles::new(&Palette::latte());
        let dark = ReplyStyles::new(&Palette::mocha());
        assert_ne!(light.body, dark.body);
        assert!(dark.link.add_modifier.contains(Modifier::UNDERLINED));
    }
}
