//! Width-aware wrapping for ratatui Lines.

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use textwrap::{Options, WrapAlgorithm};
use unicode_width::UnicodeWidthStr;

/// Visual width of a line in terminal cells.
pub fn display_width(line: &Line<'_>) -> usize {
    line.spans.iter().map(|s| s.content.width()).sum()
}

/// Wrap every line to `width` columns, keeping span styles.
///
/// textwrap picks the break points; whitespace it drops at a break is
/// dropped here too.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if display_width(&line) <= width {
        return vec![line];
    }

    let styled: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();
    let plain: String = styled.iter().map(|(ch, _)| ch).collect();

    let options = Options::new(width).wrap_algorithm(WrapAlgorithm::FirstFit);
    let mut source = styled.into_iter().peekable();
    let mut result = Vec::new();

    for piece in textwrap::wrap(&plain, options) {
        let Some(first) = piece.chars().next() else {
            continue;
        };
        while source
            .peek()
            .is_some_and(|&(ch, _)| ch != first && ch.is_whitespace())
        {
            source.next();
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        for _ in piece.chars() {
            let Some((ch, style)) = source.next() else {
                break;
            };
            match spans.last_mut() {
                Some(last) if last.style == style => last.content.to_mut().push(ch),
                _ => spans.push(Span::styled(ch.to_string(), style)),
            }
        }
        result.push(Line::from(spans));
    }

    if result.is_empty() {
        result.push(Line::default());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_short_line_untouched() {
        let wrapped = wrap_lines(vec![Line::from("Short")], 20);
        assert_eq!(wrapped.len(), 1);
        assert_eq!(text_of(&wrapped[0]), "Short");
    }

    #[test]
    fn test_breaks_at_whitespace() {
        let wrapped = wrap_lines(vec![Line::from("alpha beta gamma")], 11);
        let texts: Vec<String> = wrapped.iter().map(text_of).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_styles_survive_wrapping() {
        let red = Style::default().fg(Color::Red);
        let blue = Style::default().fg(Color::Blue);
        let line = Line::from(vec![
            Span::styled("aaaa bbbb ", red),
            Span::styled("cccc dddd", blue),
        ]);
        let wrapped = wrap_lines(vec![line], 9);

        assert_eq!(wrapped.len(), 2);
        assert_eq!(text_of(&wrapped[0]), "aaaa bbbb");
        assert_eq!(wrapped[0].spans[0].style, red);
        assert_eq!(text_of(&wrapped[1]), "cccc dddd");
        assert_eq!(wrapped[1].spans[0].style, blue);
    }

    #[test]
    fn test_style_change_mid_line() {
        let red = Style::default().fg(Color::Red);
        let blue = Style::default().fg(Color::Blue);
        let line = Line::from(vec![
            Span::styled("one ", red),
            Span::styled("two", blue),
            Span::styled(" three four", red),
        ]);
        let wrapped = wrap_lines(vec![line], 13);

        assert_eq!(text_of(&wrapped[0]), "one two three");
        assert_eq!(wrapped[0].spans.len(), 3);
        assert_eq!(wrapped[0].spans[1].content, "two");
        assert_eq!(wrapped[0].spans[1].style, blue);
        assert_eq!(text_of(&wrapped[1]), "four");
    }

    #[test]
    fn test_long_word_is_split() {
        let wrapped = wrap_lines(vec![Line::from("abcdefghij")], 4);
        let texts: Vec<String> = wrapped.iter().map(text_of).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wide_characters_fit_width() {
        let line = Line::from(vec![
            Span::styled("Hello 🎉 ", Style::default().fg(Color::Red)),
            Span::styled("你好世界", Style::default().fg(Color::Blue)),
        ]);
        let wrapped = wrap_lines(vec![line], 8);
        let all: String = wrapped.iter().map(text_of).collect();
        assert!(all.contains("🎉"));
        assert!(all.contains("你好"));
        assert!(wrapped.iter().all(|l| display_width(l) <= 8));
    }
}
