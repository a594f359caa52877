//! Entity cache seams.
//!
//! The cache is populated by the gateway event stream, which lives outside
//! this crate. Member operations only read guild snapshots; the DM resolver is
//! the single writer of channel entries on this side.

pub mod memory;

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Channel, Guild};

pub use memory::{MemoryChannelCache, MemoryGuildCache};

/// Read-only access to cached guild state.
pub trait GuildCache: Send + Sync {
    /// Snapshot of a guild, `None` if it is not cached.
    fn guild(&self, guild_id: Uuid) -> Option<Arc<Guild>>;
}

/// Key-value channel store.
///
/// Keys are either channel ids (entries written by the event stream) or user
/// ids (DM entries written by the resolver).
pub trait ChannelCache: Send + Sync {
    fn get(&self, key: Uuid) -> Option<Channel>;
    fn set(&self, key: Uuid, channel: Channel);
    fn delete(&self, key: Uuid);
}

impl<T: GuildCache + ?Sized> GuildCache for Arc<T> {
    fn guild(&self, guild_id: Uuid) -> Option<Arc<Guild>> {
        (**self).guild(guild_id)
    }
}

impl<T: ChannelCache + ?Sized> ChannelCache for Arc<T> {
    fn get(&self, key: Uuid) -> Option<Channel> {
        (**self).get(key)
    }

    fn set(&self, key: Uuid, channel: Channel) {
        (**self).set(key, channel);
    }

    fn delete(&self, key: Uuid) {
        (**self).delete(key);
    }
}
