//! In-memory settings store.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use roomshare_core::error::Result;
use roomshare_core::host::{RoomshareSettings, SettingsStore};
use roomshare_core::types::EventId;

/// In-memory [`SettingsStore`] returning defaults for unseen events.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<HashMap<EventId, RoomshareSettings>>,
}

impl InMemorySettingsStore {
    /// Creates an empty settings store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn settings(&self, event: EventId) -> Result<RoomshareSettings> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .get(&event)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_settings(&self, event: EventId, settings: RoomshareSettings) -> Result<()> {
        self.inner.write().unwrap().insert(event, settings);
        Ok(())
    }
}
