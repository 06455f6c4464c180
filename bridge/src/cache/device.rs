//! Device status cache
//!
//! Keyed by device number. A secondary index maps host device ids to device
//! numbers so disconnect events, which only carry the host id, can find the
//! entry to clear. Both maps are split into shards, each behind its own
//! `RwLock`; a mutation of one key holds only that key's shard.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::errors::BridgeError;
use crate::models::device::{DeviceIdentity, DeviceStatus};

const DEFAULT_SHARDS: usize = 16;

/// Device cache entry
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCacheEntry {
    pub device_number: String,
    pub device_id: Option<String>,
    pub identity: Option<DeviceIdentity>,
    pub status: Option<DeviceStatus>,
    pub updated_at: DateTime<Utc>,
}

impl DeviceCacheEntry {
    fn new(device_number: &str) -> Self {
        Self {
            device_number: device_number.to_string(),
            device_id: None,
            identity: None,
            status: None,
            updated_at: Utc::now(),
        }
    }
}

type Shard<V> = RwLock<HashMap<String, V>>;

/// In-memory sharded device cache
pub struct DeviceCache {
    entries: Vec<Shard<DeviceCacheEntry>>,
    ids: Vec<Shard<String>>,
    hasher: RandomState,
}

impl DeviceCache {
    /// Create a cache with the given number of shards (at least one)
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            entries: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
            ids: (0..shards).map(|_| RwLock::new(HashMap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        (self.hasher.hash_one(key) as usize) % self.entries.len()
    }

    fn entry_shard(&self, device_number: &str) -> &Shard<DeviceCacheEntry> {
        &self.entries[self.shard_index(device_number)]
    }

    fn id_shard(&self, device_id: &str) -> &Shard<String> {
        &self.ids[self.shard_index(device_id)]
    }

    /// Record the identity of a host device
    pub fn register(&self, device_id: &str, identity: DeviceIdentity) {
        let device_number = identity.device_number.clone();
        let previous_id = {
            let mut entries = self
                .entry_shard(&device_number)
                .write()
                .unwrap_or_else(|e| e.into_inner());
            let entry = entries
                .entry(device_number.clone())
                .or_insert_with(|| DeviceCacheEntry::new(&device_number));
            entry.identity = Some(identity);
            entry.updated_at = Utc::now();
            entry.device_id.replace(device_id.to_string())
        };

        // A number re-registered under a new id must not stay reachable
        // through the old one.
        if let Some(previous_id) = previous_id.filter(|id| id != device_id) {
            let mut ids = self
                .id_shard(&previous_id)
                .write()
                .unwrap_or_else(|e| e.into_inner());
            if ids.get(&previous_id).map(String::as_str) == Some(device_number.as_str()) {
                ids.remove(&previous_id);
            }
        }

        let mut ids = self
            .id_shard(device_id)
            .write()
            .unwrap_or_else(|e| e.into_inner());
        ids.insert(device_id.to_string(), device_number);
    }

    /// Look up the identity registered for a host device id
    pub fn get_by_id(&self, device_id: &str) -> Result<DeviceIdentity, BridgeError> {
        let device_number = self
            .number_for(device_id)
            .ok_or_else(|| BridgeError::NotFound(format!("device {}", device_id)))?;

        let entries = self
            .entry_shard(&device_number)
            .read()
            .unwrap_or_else(|e| e.into_inner());
        entries
            .get(&device_number)
            .and_then(|entry| entry.identity.clone())
            .ok_or_else(|| BridgeError::NotFound(format!("device {}", device_id)))
    }

    /// Device number registered for a host device id
    pub fn number_for(&self, device_id: &str) -> Option<String> {
        let ids = self
            .id_shard(device_id)
            .read()
            .unwrap_or_else(|e| e.into_inner());
        ids.get(device_id).cloned()
    }

    /// Record the last-known status of a device
    pub fn set_status(&self, device_number: &str, status: DeviceStatus) {
        let mut entries = self
            .entry_shard(device_number)
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let entry = entries
            .entry(device_number.to_string())
            .or_insert_with(|| DeviceCacheEntry::new(device_number));
        entry.status = Some(status);
        entry.updated_at = Utc::now();
    }

    /// Last-known status of a device
    pub fn status(&self, device_number: &str) -> Option<DeviceStatus> {
        self.get(device_number).and_then(|entry| entry.status)
    }

    /// Snapshot of a cache entry
    pub fn get(&self, device_number: &str) -> Option<DeviceCacheEntry> {
        let entries = self
            .entry_shard(device_number)
            .read()
            .unwrap_or_else(|e| e.into_inner());
        entries.get(device_number).cloned()
    }

    /// Drop the entry for a device number. Clearing a missing entry is a no-op.
    pub fn clear_by_number(&self, device_number: &str) {
        let removed = {
            let mut entries = self
                .entry_shard(device_number)
                .write()
                .unwrap_or_else(|e| e.into_inner());
            entries.remove(device_number)
        };

        if let Some(device_id) = removed.and_then(|entry| entry.device_id) {
            let mut ids = self
                .id_shard(&device_id)
                .write()
                .unwrap_or_else(|e| e.into_inner());
            // The id may have been re-registered to another number meanwhile.
            if ids.get(&device_id).map(String::as_str) == Some(device_number) {
                ids.remove(&device_id);
            }
        }
    }

    /// Number of cached devices
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .map(|shard| shard.read().unwrap_or_else(|e| e.into_inner()).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DeviceCache {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}
