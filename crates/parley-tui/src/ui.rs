//! Screen layout.
//!
//! ```text
//! ┌ parley ───────────── 🌙 ┐
//! │ transcript              │
//! └─────────────────────────┘
//! ┌──────────────── [ Send ] ┐
//! │ > input                  │
//! └──────────────────────────┘
//!  footer hints / status
//! ```

use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::widgets::{transcript_lines, InputBar, TranscriptView};

/// Draw the whole screen.
pub fn draw(frame: &mut Frame<'_>, app: &App) {
    let [transcript_area, input_area, footer_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(InputBar::height(&app.input)),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let lines = transcript_lines(
        app.widget.transcript(),
        app.render_options(),
        &app.palette,
        app.tick,
    );
    let icon = if app.widget.config().enable_theme_toggle {
        app.widget.theme_icon()
    } else {
        ""
    };
    frame.render_widget(
        TranscriptView::new(lines, &app.palette)
            .theme_icon(icon)
            .scroll_back(app.scroll_back),
        transcript_area,
    );

    frame.render_widget(
        InputBar::new(&app.input, &app.palette)
            .send_label(app.widget.send_label())
            .locked(app.widget.controls_locked()),
        input_area,
    );

    frame.render_widget(
        Paragraph::new(Line::from(app.footer()))
            .style(Style::default().fg(app.palette.muted).bg(app.palette.base)),
        footer_area,
    );
}
