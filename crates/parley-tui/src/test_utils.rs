//! Helpers for rendering tests.

use std::path::Path;

use parley_engine::{ChatWidget, MemoryStore, WidgetConfig};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

use crate::app::App;
use crate::ui::draw;

/// App over an in-memory store with the default configuration.
pub fn create_test_app() -> App {
    create_test_app_in(&std::env::temp_dir())
}

/// Same as [`create_test_app`], exporting into `data_dir`.
pub fn create_test_app_in(data_dir: &Path) -> App {
    let widget = ChatWidget::new(WidgetConfig::default(), Box::new(MemoryStore::new()))
        .expect("widget initializes");
    App::new(widget, data_dir.to_path_buf())
}

/// Draw the app on a test terminal and return the screen text.
pub fn render_app_to_string(app: &App, width: u16, height: u16) -> String {
    let mut terminal =
        Terminal::new(TestBackend::new(width, height)).expect("Failed to create test terminal");
    terminal
        .draw(|frame| draw(frame, app))
        .expect("Failed to draw");
    buffer_to_string(terminal.backend().buffer())
}

/// Convert a buffer to text, one row per line, trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", Style::default());
        buffer.set_string(0, 1, "World", Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }
}
