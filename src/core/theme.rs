//! Dark / light preference, persisted under a single store key.

use crate::page::store::KeyValueStore;

/// Store key holding the preference.
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Only the exact string `"light"` selects light mode; anything else,
    /// including a missing value, falls back to dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// The current theme plus the store it is persisted in.
pub struct ThemeState<S> {
    store: S,
    current: Theme,
}

impl<S: KeyValueStore> ThemeState<S> {
    /// Read the persisted preference once.
    pub fn load(store: S) -> Self {
        let current = Theme::from_stored(store.get(THEME_KEY).as_deref());
        tracing::debug!(theme = current.as_str(), "theme loaded");
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Flip and persist synchronously.  A failed write is logged; the
    /// in-memory theme still flips.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        if let Err(err) = self.store.set(THEME_KEY, self.current.as_str()) {
            tracing::warn!(%err, "failed to persist theme preference");
        }
        self.current
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
