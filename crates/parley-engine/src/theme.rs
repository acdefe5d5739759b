//! Light/dark theme preference.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::KeyValueStore;

/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "theme";

/// Document-wide theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    /// Marker applied to the document (`data-theme` value).
    pub fn marker(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a persisted marker.
    pub fn from_marker(value: &str) -> Option<Self> {
        match value.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon of the toggle control: what clicking it switches to.
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Self::Light => "🌙",
            Self::Dark => "☀️",
        }
    }
}

/// Owns the active theme and keeps it persisted.
#[derive(Debug, Clone, Copy)]
pub struct ThemeController {
    preference: ThemePreference,
    toggle_enabled: bool,
}

impl ThemeController {
    /// Read the persisted preference, defaulting to light.
    pub fn initialize(store: &dyn KeyValueStore, toggle_enabled: bool) -> Self {
        let preference = match store.get(THEME_KEY) {
            Ok(Some(value)) => ThemePreference::from_marker(&value).unwrap_or_else(|| {
                warn!(value = %value, "Unknown theme preference, using light");
                ThemePreference::Light
            }),
            Ok(None) => ThemePreference::Light,
            Err(e) => {
                warn!(error = %e, "Could not read theme preference, using light");
                ThemePreference::Light
            }
        };

        Self {
            preference,
            toggle_enabled,
        }
    }

    /// Active theme.
    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    /// Document marker of the active theme.
    pub fn marker(&self) -> &'static str {
        self.preference.marker()
    }

    /// Current toggle icon.
    pub fn icon(&self) -> &'static str {
        self.preference.toggle_icon()
    }

    /// Whether toggling is allowed.
    pub fn toggle_enabled(&self) -> bool {
        self.toggle_enabled
    }

    /// Flip the theme and persist it. A no-op when toggling is disabled.
    pub fn toggle(&mut self, store: &mut dyn KeyValueStore) -> ThemePreference {
        if !self.toggle_enabled {
            return self.preference;
        }

        self.preference = self.preference.flipped();
        if let Err(e) = store.set(THEME_KEY, self.preference.marker()) {
            warn!(error = %e, "Could not persist theme preference");
        }
        info!(theme = self.preference.marker(), "Theme changed");
        self.preference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults_to_light() {
        let store = MemoryStore::new();
        let theme = ThemeController::initialize(&store, true);
        assert_eq!(theme.preference(), ThemePreference::Light);
        assert_eq!(theme.marker(), "light");
        assert_eq!(theme.icon(), "🌙");
    }

    #[test]
    fn test_reads_persisted_value() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "dark").unwrap();
        let theme = ThemeController::initialize(&store, true);
        assert_eq!(theme.preference(), ThemePreference::Dark);
        assert_eq!(theme.icon(), "☀️");
    }

    #[test]
    fn test_toggle_twice_restores_and_persists() {
        let mut store = MemoryStore::new();
        let mut theme = ThemeController::initialize(&store, true);

        assert_eq!(theme.toggle(&mut store), ThemePreference::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        assert_eq!(theme.toggle(&mut store), ThemePreference::Light);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(theme.icon(), "🌙");
    }

    #[test]
    fn test_toggle_disabled_is_noop() {
        let mut store = MemoryStore::new();
        let mut theme = ThemeController::initialize(&store, false);
        assert_eq!(theme.toggle(&mut store), ThemePreference::Light);
        assert_eq!(store.get(THEME_KEY).unwrap(), None);
    }

    #[test]
    fn test_garbage_value_falls_back() {
        let mut store = MemoryStore::new();
        store.set(THEME_KEY, "purple").unwrap();
        let theme = ThemeController::initialize(&store, true);
        assert_eq!(theme.preference(), ThemePreference::Light);
    }
}
