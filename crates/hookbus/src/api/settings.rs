//! Settings storage available to components during lifecycle hooks.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use hookbus_core::HookResult;

/// Key-value settings storage partitioned by owner (component id).
#[async_trait]
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    /// Gets a value.
    async fn get(&self, owner: &str, key: &str) -> HookResult<Option<serde_json::Value>>;
    /// Sets a value.
    async fn set(&self, owner: &str, key: &str, value: serde_json::Value) -> HookResult<()>;
    /// Deletes a value. Returns whether it existed.
    async fn remove(&self, owner: &str, key: &str) -> HookResult<bool>;
    /// Deletes every value of an owner. Returns how many were removed.
    async fn remove_all(&self, owner: &str) -> HookResult<usize>;
}

/// In-process settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    /// (owner, key) → value.
    values: DashMap<(String, String), serde_json::Value>,
}

impl MemorySettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored values across all owners.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, owner: &str, key: &str) -> HookResult<Option<serde_json::Value>> {
        Ok(self
            .values
            .get(&(owner.to_string(), key.to_string()))
            .map(|v| v.value().clone()))
    }

    async fn set(&self, owner: &str, key: &str, value: serde_json::Value) -> HookResult<()> {
        self.values
            .insert((owner.to_string(), key.to_string()), value);
        Ok(())
    }

    async fn remove(&self, owner: &str, key: &str) -> HookResult<bool> {
        Ok(self
            .values
            .remove(&(owner.to_string(), key.to_string()))
            .is_some())
    }

    async fn remove_all(&self, owner: &str) -> HookResult<usize> {
        let before = self.values.len();
        self.values.retain(|(o, _), _| o != owner);
        Ok(before - self.values.len())
    }
}

/// Settings accessor scoped to one component.
#[derive(Debug, Clone)]
pub struct ComponentSettings {
    /// Component that owns these settings.
    owner: String,
    /// Backing store.
    store: Arc<dyn SettingsStore>,
}

impl ComponentSettings {
    /// Creates a scoped accessor.
    pub fn new(store: Arc<dyn SettingsStore>, owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            store,
        }
    }

    /// Returns the owning component id.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Gets and deserializes a value.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> HookResult<Option<T>> {
        match self.store.get(&self.owner, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Serializes and stores a value.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> HookResult<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(&self.owner, key, value).await
    }

    /// Deletes a value.
    pub async fn remove(&self, key: &str) -> HookResult<bool> {
        self.store.remove(&self.owner, key).await
    }

    /// Deletes every value of this component.
    pub async fn clear(&self) -> HookResult<usize> {
        self.store.remove_all(&self.owner).await
    }
}
