//! Text rendering utilities.
//!
//! This module provides:
//! - [`render_markdown`]: bot replies to styled ratatui Lines, with
//!   syntect-highlighted code blocks
//! - [`wrap_lines`]: width-aware wrapping that keeps span styles

mod highlight;
mod markdown;
mod styles;
mod wrap;

pub use markdown::render_markdown;
pub use wrap::wrap_lines;
