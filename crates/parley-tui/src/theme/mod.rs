//! Terminal palettes for the light and dark themes.

mod colors;

pub use colors::Palette;
