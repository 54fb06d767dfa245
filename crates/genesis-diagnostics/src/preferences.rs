//! User preferences consumed by the checks
//!
//! Loaded once at startup and handed to whoever needs them; changes are
//! written back with an explicit [`Preferences::save`].

use genesis_store::{RecordStore, RecordStoreExt, Setting, StoreResult};
use serde::{Deserialize, Serialize};

/// Settings key of the AI proxy toggle
pub const PROXY_ENABLED_KEY: &str = "proxy_enabled";

/// Explicit preference values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Route AI requests through the international proxy
    pub proxy_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            proxy_enabled: true,
        }
    }
}

impl Preferences {
    /// Read preferences from the settings table
    ///
    /// Missing or unreadable values fall back to their defaults, and so does
    /// everything when the store cannot be read at all.
    pub async fn load<S: RecordStore + ?Sized>(store: &S) -> Self {
        let mut preferences = Self::default();
        let stored = match store.table::<Setting>().get(PROXY_ENABLED_KEY).await {
            Ok(stored) => stored,
            Err(e) if e.is_missing_table() => None,
            Err(e) => {
                tracing::warn!(error = %e, "preferences unreadable, using defaults");
                None
            }
        };

        if let Some(setting) = stored.filter(|s| !s.is_blank()) {
            match setting.decode::<bool>() {
                Ok(enabled) => preferences.proxy_enabled = enabled,
                Err(e) => tracing::warn!(key = PROXY_ENABLED_KEY, error = %e, "ignoring unreadable preference"),
            }
        }
        preferences
    }

    /// Persist preferences to the settings table
    ///
    /// # Errors
    /// Propagates the store failure.
    pub async fn save<S: RecordStore + ?Sized>(&self, store: &S) -> StoreResult<()> {
        store
            .table::<Setting>()
            .put(&Setting::raw(PROXY_ENABLED_KEY, self.proxy_enabled))
            .await?;
        tracing::debug!(proxy_enabled = self.proxy_enabled, "preferences saved");
        Ok(())
    }

    /// With the proxy toggle
    #[inline]
    #[must_use]
    pub fn with_proxy_enabled(mut self, enabled: bool) -> Self {
        self.proxy_enabled = enabled;
        self
    }
}
