//! Catppuccin palettes: Latte for the light theme, Mocha for the dark one.

use parley_engine::{Phase, ThemePreference};
use ratatui::style::Color;

/// Colors used by every widget.
#[derive(Debug, Clone)]
pub struct Palette {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub secondary: Color,

    // Semantic
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Message roles
    pub user: Color,
    pub bot: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,

    /// Name of the syntect theme used for code blocks.
    pub code_theme: &'static str,
}

impl Default for Palette {
    fn default() -> Self {
        Self::latte()
    }
}

impl Palette {
    /// Palette matching a theme preference.
    pub fn for_preference(preference: ThemePreference) -> Self {
        match preference {
            ThemePreference::Light => Self::latte(),
            ThemePreference::Dark => Self::mocha(),
        }
    }

    /// Catppuccin Mocha (dark).
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            primary: Color::Rgb(180, 190, 254),   // #b4befe (lavender)
            secondary: Color::Rgb(148, 226, 213), // #94e2d5 (teal)

            success: Color::Rgb(166, 227, 161), // #a6e3a1 (green)
            warning: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
            error: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
            info: Color::Rgb(137, 180, 250),    // #89b4fa (blue)

            user: Color::Rgb(250, 179, 135), // #fab387 (peach)
            bot: Color::Rgb(137, 180, 250),  // #89b4fa (blue)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe

            code_theme: "base16-ocean.dark",
        }
    }

    /// Catppuccin Latte (light).
    pub fn latte() -> Self {
        Self {
            base: Color::Rgb(239, 241, 245),    // #eff1f5
            surface: Color::Rgb(230, 233, 239), // #e6e9ef

            text: Color::Rgb(76, 79, 105),    // #4c4f69
            subtext: Color::Rgb(92, 95, 119), // #5c5f77
            muted: Color::Rgb(140, 143, 161), // #8c8fa1

            primary: Color::Rgb(114, 135, 253),  // #7287fd (lavender)
            secondary: Color::Rgb(23, 146, 153), // #179299 (teal)

            success: Color::Rgb(64, 160, 43),  // #40a02b (green)
            warning: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
            error: Color::Rgb(210, 15, 57),    // #d20f39 (red)
            info: Color::Rgb(30, 102, 245),    // #1e66f5 (blue)

            user: Color::Rgb(254, 100, 11), // #fe640b (peach)
            bot: Color::Rgb(30, 102, 245),  // #1e66f5 (blue)

            border: Color::Rgb(188, 192, 204),         // #bcc0cc
            border_focused: Color::Rgb(114, 135, 253), // #7287fd

            code_theme: "InspiredGitHub",
        }
    }

    /// Color of a thinking-log step.
    pub fn phase(&self, phase: Phase) -> Color {
        match phase {
            Phase::Planning => self.primary,
            Phase::Searching => self.info,
            Phase::Analyzing => self.warning,
            Phase::Finalizing => self.success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_is_latte() {
        let palette = Palette::for_preference(ThemePreference::Light);
        assert!(matches!(palette.base, Color::Rgb(239, 241, 245)));
    }

    #[test]
    fn test_dark_is_mocha() {
        let palette = Palette::for_preference(ThemePreference::Dark);
        assert!(matches!(palette.base, Color::Rgb(30, 30, 46)));
    }

    #[test]
    fn test_phases_have_distinct_colors() {
        let palette = Palette::mocha();
        assert_ne!(palette.phase(Phase::Planning), palette.phase(Phase::Finalizing));
        assert_ne!(palette.phase(Phase::Searching), palette.phase(Phase::Analyzing));
    }
}
