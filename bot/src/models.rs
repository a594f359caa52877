//! Cached entity snapshots and API payloads.
//!
//! Guild, role and member data is owned by the entity cache and kept fresh by
//! the gateway event stream; this crate only reads it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::GuildPermissions;

/// Guild role with permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub guild_id: Uuid,
    pub name: String,
    #[serde(with = "crate::permissions::guild::wire")]
    pub permissions: GuildPermissions,
    /// Ordinal rank; higher outranks lower.
    pub position: i32,
    /// The implicit @everyone role every member holds.
    #[serde(default)]
    pub is_default: bool,
}

/// Guild member as seen by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: Uuid,
    pub guild_id: Uuid,
    /// Assigned roles, excluding @everyone.
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
    pub nickname: Option<String>,
    #[serde(default)]
    pub muted: bool,
    #[serde(default)]
    pub deafened: bool,
    pub voice_channel_id: Option<Uuid>,
}

/// Snapshot of a guild with its roles and resident members.
#[derive(Debug, Clone, Default)]
pub struct Guild {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub roles: HashMap<Uuid, Role>,
    pub members: HashMap<Uuid, Member>,
}

impl Guild {
    #[must_use]
    pub fn new(id: Uuid, owner_id: Uuid) -> Self {
        Self {
            id,
            owner_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.id, role);
        self
    }

    #[must_use]
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.insert(member.user_id, member);
        self
    }

    #[must_use]
    pub fn role(&self, role_id: Uuid) -> Option<&Role> {
        self.roles.get(&role_id)
    }

    #[must_use]
    pub fn member(&self, user_id: Uuid) -> Option<&Member> {
        self.members.get(&user_id)
    }

    /// The @everyone role, if cached.
    #[must_use]
    pub fn default_role(&self) -> Option<&Role> {
        self.roles.values().find(|r| r.is_default)
    }

    #[must_use]
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Roles assigned to a member that are present in the cache.
    pub fn member_roles(&self, user_id: Uuid) -> impl Iterator<Item = &Role> {
        self.member(user_id)
            .into_iter()
            .flat_map(|m| m.role_ids.iter())
            .filter_map(|id| self.roles.get(id))
            .filter(|r| !r.is_default)
    }
}

/// Channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Text,
    Voice,
    Dm,
}

/// Channel descriptor returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub channel_type: ChannelType,
    pub guild_id: Option<Uuid>,
    /// DM participants other than the bot.
    #[serde(default)]
    pub recipient_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Message returned after a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
