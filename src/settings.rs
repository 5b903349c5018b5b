//! Display theme preference, persisted in the settings store.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::store::SettingsStore;

/// Well-known keys in the settings table.
pub mod settings_keys {
    /// Display theme (`"light"` or `"dark"`).
    pub const THEME: &str = "theme";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// The active theme plus the store it is written back to.
pub struct ThemeSettings {
    store: Arc<dyn SettingsStore>,
    current: Theme,
}

impl ThemeSettings {
    /// Resolve the theme once at startup.
    ///
    /// A stored preference wins; otherwise `system_default` is used. A
    /// missing, unreadable or unrecognized value is never an error.
    pub async fn load(store: Arc<dyn SettingsStore>, system_default: Theme) -> Self {
        let stored = match store.get_setting(settings_keys::THEME).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read theme preference: {}", e);
                None
            }
        };

        let current = stored
            .and_then(|v| serde_json::from_value::<Theme>(v).ok())
            .unwrap_or(system_default);
        debug!(theme = %current, "Theme resolved");

        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switch theme and persist it. The in-memory value changes even if
    /// the write fails.
    pub async fn set(&mut self, theme: Theme) -> Result<(), DatabaseError> {
        self.current = theme;
        let value = serde_json::to_value(theme)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.store.set_setting(settings_keys::THEME, &value).await?;
        debug!(theme = %theme, "Theme persisted");
        Ok(())
    }

    /// Flip between light and dark, returning the new theme.
    pub async fn toggle(&mut self) -> Result<Theme, DatabaseError> {
        let next = self.current.toggled();
        self.set(next).await?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LibSqlBackend;

    async fn store() -> Arc<dyn SettingsStore> {
        Arc::new(LibSqlBackend::new_memory().await.unwrap())
    }

    #[test]
    fn theme_parses_and_serializes_lowercase() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("blue".parse::<Theme>().is_err());
        assert_eq!(serde_json::to_value(Theme::Light).unwrap(), "light");
    }

    #[tokio::test]
    async fn falls_back_to_system_default() {
        let settings = ThemeSettings::load(store().await, Theme::Dark).await;
        assert_eq!(settings.current(), Theme::Dark);
    }

    #[tokio::test]
    async fn stored_preference_wins() {
        let store = store().await;
        store
            .set_setting(settings_keys::THEME, &serde_json::json!("dark"))
            .await
            .unwrap();
        let settings = ThemeSettings::load(store, Theme::Light).await;
        assert_eq!(settings.current(), Theme::Dark);
    }

    #[tokio::test]
    async fn garbage_value_is_ignored() {
        let store = store().await;
        store
            .set_setting(settings_keys::THEME, &serde_json::json!("sepia"))
            .await
            .unwrap();
        let settings = ThemeSettings::load(store, Theme::Light).await;
        assert_eq!(settings.current(), Theme::Light);
    }

    #[tokio::test]
    async fn toggle_persists_every_change() {
        let store = store().await;
        let mut settings = ThemeSettings::load(store.clone(), Theme::Light).await;

        assert_eq!(settings.toggle().await.unwrap(), Theme::Dark);
        let stored = store.get_setting(settings_keys::THEME).await.unwrap();
        assert_eq!(stored, Some(serde_json::json!("dark")));

        assert_eq!(settings.toggle().await.unwrap(), Theme::Light);
        let reloaded = ThemeSettings::load(store, Theme::Dark).await;
        assert_eq!(reloaded.current(), Theme::Light);
    }
}
