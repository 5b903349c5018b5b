//! `SettingsStore` trait — async key-value preferences.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// JSON-valued settings for the single local user.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a setting. `None` when never written.
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, DatabaseError>;

    /// Insert or overwrite a setting.
    async fn set_setting(&self, key: &str, value: &serde_json::Value) -> Result<(), DatabaseError>;
}
