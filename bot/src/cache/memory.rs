//! In-memory caches backed by `DashMap` for lock-free concurrent access.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use super::{ChannelCache, GuildCache};
use crate::models::{Channel, Guild};

/// Thread-safe guild snapshot store.
///
/// Snapshots are replaced wholesale, so readers never see a half-applied
/// update.
#[derive(Debug, Default)]
pub struct MemoryGuildCache {
    guilds: DashMap<Uuid, Arc<Guild>>,
}

impl MemoryGuildCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the snapshot for a guild.
    pub fn upsert(&self, guild: Guild) {
        self.guilds.insert(guild.id, Arc::new(guild));
    }

    pub fn remove(&self, guild_id: Uuid) {
        self.guilds.remove(&guild_id);
    }
}

impl GuildCache for MemoryGuildCache {
    fn guild(&self, guild_id: Uuid) -> Option<Arc<Guild>> {
        self.guilds.get(&guild_id).map(|g| Arc::clone(g.value()))
    }
}

/// Thread-safe channel store.
#[derive(Debug, Default)]
pub struct MemoryChannelCache {
    channels: DashMap<Uuid, Channel>,
}

impl MemoryChannelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Keys under which `channel_id` is reachable.
    #[must_use]
    pub fn keys_for(&self, channel_id: Uuid) -> Vec<Uuid> {
        self.channels
            .iter()
            .filter(|entry| entry.value().id == channel_id)
            .map(|entry| *entry.key())
            .collect()
    }
}

impl ChannelCache for MemoryChannelCache {
    fn get(&self, key: Uuid) -> Option<Channel> {
        self.channels.get(&key).map(|c| c.value().clone())
    }

    fn set(&self, key: Uuid, channel: Channel) {
        self.channels.insert(key, channel);
    }

    fn delete(&self, key: Uuid) {
        self.channels.remove(&key);
    }
}
