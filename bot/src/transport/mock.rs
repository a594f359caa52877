//! Recording transport for unit testing without a Kaiku server.
//!
//! Enabled with the `test-support` feature:
//!
//! ```toml
//! [dev-dependencies]
//! vc-bot = { path = "...", features = ["test-support"] }
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use super::{Transport, TransportError};
use crate::dm::CreateMessageRequest;
use crate::members::EditMemberRequest;
use crate::models::{Channel, ChannelType, Message};

/// A remote call captured by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    AddMemberRole {
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<String>,
    },
    RemoveMemberRole {
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<String>,
    },
    KickMember {
        guild_id: Uuid,
        user_id: Uuid,
        reason: Option<String>,
    },
    EditMember {
        guild_id: Uuid,
        user_id: Uuid,
        request: EditMemberRequest,
    },
    CreateDmChannel {
        user_id: Uuid,
    },
    CreateMessage {
        channel_id: Uuid,
        content: String,
    },
}

type ChannelHook = Arc<dyn Fn(&Channel) + Send + Sync>;

/// Records every call and answers from in-memory state.
///
/// DM channels are stable per user, like the real server. Queued failures are
/// returned by the next calls in FIFO order.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    failures: Arc<Mutex<VecDeque<TransportError>>>,
    dm_channels: Arc<Mutex<HashMap<Uuid, Channel>>>,
    on_dm_created: Option<ChannelHook>,
    latency: Option<Duration>,
}

impl RecordingTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` with every channel returned from `create_dm_channel`, before
    /// the caller sees it. Used to mimic the gateway's `CHANNEL_CREATE` write.
    #[must_use]
    pub fn on_dm_created(mut self, hook: impl Fn(&Channel) + Send + Sync + 'static) -> Self {
        self.on_dm_created = Some(Arc::new(hook));
        self
    }

    /// Delay every call, so concurrent callers overlap.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next(&self, error: TransportError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn dm_creations(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, TransportCall::CreateDmChannel { .. }))
            .count()
    }

    async fn record(&self, call: TransportCall) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Transport for RecordingTransport {
    async fn add_member_role(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::AddMemberRole {
            guild_id,
            user_id,
            role_id,
            reason: reason.map(str::to_string),
        })
        .await
    }

    async fn remove_member_role(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::RemoveMemberRole {
            guild_id,
            user_id,
            role_id,
            reason: reason.map(str::to_string),
        })
        .await
    }

    async fn kick_member(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::KickMember {
            guild_id,
            user_id,
            reason: reason.map(str::to_string),
        })
        .await
    }

    async fn edit_member(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        request: &EditMemberRequest,
    ) -> Result<(), TransportError> {
        self.record(TransportCall::EditMember {
            guild_id,
            user_id,
            request: request.clone(),
        })
        .await
    }

    async fn create_dm_channel(&self, user_id: Uuid) -> Result<Channel, TransportError> {
        self.record(TransportCall::CreateDmChannel { user_id })
            .await?;

        let channel = self
            .dm_channels
            .lock()
            .unwrap()
            .entry(user_id)
            .or_insert_with(|| Channel {
                id: Uuid::now_v7(),
                name: format!("dm-{user_id}"),
                channel_type: ChannelType::Dm,
                guild_id: None,
                recipient_ids: vec![user_id],
                created_at: Utc::now(),
            })
            .clone();

        if let Some(hook) = &self.on_dm_created {
            hook(&channel);
        }
        Ok(channel)
    }

    async fn create_message(
        &self,
        channel_id: Uuid,
        request: &CreateMessageRequest,
    ) -> Result<Message, TransportError> {
        self.record(TransportCall::CreateMessage {
            channel_id,
            content: request.content.clone(),
        })
        .await?;

        Ok(Message {
            id: Uuid::now_v7(),
            channel_id,
            content: request.content.clone(),
            created_at: Utc::now(),
        })
    }
}
