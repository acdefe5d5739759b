//! Widgets composing the chat screen.

mod input_bar;
mod text_input;
mod transcript_view;

pub use input_bar::InputBar;
pub use text_input::TextInputState;
pub use transcript_view::{transcript_lines, TranscriptView};
