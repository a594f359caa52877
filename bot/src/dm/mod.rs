//! Direct message channel resolution and sending.
//!
//! Channels opened here are cached under the recipient's user id. The gateway
//! caches the same channel under its own id when `CHANNEL_CREATE` arrives, so
//! every resolution drops that entry and keeps a single one keyed by user.

use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::cache::ChannelCache;
use crate::models::{Channel, Message};
use crate::transport::{Transport, TransportError};

/// Maximum message length, in characters.
pub const MAX_MESSAGE_LENGTH: u64 = 4000;

/// Body of `POST /api/messages/channel/{channel_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct CreateMessageRequest {
    #[validate(length(min = 1, max = MAX_MESSAGE_LENGTH))]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DmError {
    #[error("Invalid message content: {0}")]
    InvalidContent(String),

    #[error(transparent)]
    Remote(#[from] TransportError),
}

type Slots = DashMap<Uuid, Arc<Mutex<()>>>;

/// A caller's claim on a user's in-flight slot.
///
/// Removes the slot from the registry on drop once no other caller holds it,
/// including when the resolving future is cancelled.
struct InFlight<'a> {
    slots: &'a Slots,
    user_id: Uuid,
    slot: Arc<Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn claim(slots: &'a Slots, user_id: Uuid) -> Self {
        let slot = Arc::clone(slots.entry(user_id).or_default().value());
        Self {
            slots,
            user_id,
            slot,
        }
    }

    async fn lock(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.slot).lock_owned().await
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Registry plus this claim
        self.slots
            .remove_if(&self.user_id, |_, slot| Arc::strong_count(slot) <= 2);
    }
}

/// Resolves and caches DM channels, one creation per user at a time.
pub struct DmResolver<T, C> {
    transport: Arc<T>,
    channels: C,
    in_flight: Slots,
}

impl<T: Transport, C: ChannelCache> DmResolver<T, C> {
    pub fn new(transport: Arc<T>, channels: C) -> Self {
        Self {
            transport,
            channels,
            in_flight: DashMap::new(),
        }
    }

    /// DM channel with `user_id`, creating it on a cache miss.
    ///
    /// Concurrent calls for the same user issue a single creation request;
    /// late callers wait for it and are served from the cache. A failed
    /// creation caches nothing.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, user_id: Uuid) -> Result<Channel, DmError> {
        if let Some(channel) = self.channels.get(user_id) {
            debug!(channel_id = %channel.id, "DM channel cache hit");
            return Ok(channel);
        }

        let claim = InFlight::claim(&self.in_flight, user_id);
        let _permit = claim.lock().await;

        if let Some(channel) = self.channels.get(user_id) {
            debug!(channel_id = %channel.id, "DM channel resolved by concurrent caller");
            return Ok(channel);
        }

        let channel = self
            .transport
            .create_dm_channel(user_id)
            .await
            .map_err(|e| {
                error!("Failed to open DM channel: {}", e);
                DmError::Remote(e)
            })?;

        self.channels.delete(channel.id);
        self.channels.set(user_id, channel.clone());

        info!(channel_id = %channel.id, "DM channel opened");
        Ok(channel)
    }

    /// Send `content` to `user_id` over their DM channel.
    ///
    /// A channel the server no longer knows is evicted so the next call opens
    /// a fresh one.
    #[tracing::instrument(skip(self, content), fields(content_len = content.len()))]
    pub async fn send_dm(&self, user_id: Uuid, content: &str) -> Result<Message, DmError> {
        let request = CreateMessageRequest {
            content: content.to_string(),
        };
        request.validate().map_err(|e| {
            warn!("Refusing DM: {}", e);
            DmError::InvalidContent(e.to_string())
        })?;

        let channel = self.resolve(user_id).await?;

        match self.transport.create_message(channel.id, &request).await {
            Ok(message) => {
                debug!(message_id = %message.id, "DM sent");
                Ok(message)
            }
            Err(TransportError::NotFound) => {
                warn!(channel_id = %channel.id, "DM channel gone, evicting");
                self.channels.delete(user_id);
                Err(DmError::Remote(TransportError::NotFound))
            }
            Err(e) => {
                error!("Failed to send DM: {}", e);
                Err(DmError::Remote(e))
            }
        }
    }
}
