//! Member mutation request types.

use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::permissions::Capability;

/// Maximum nickname length, in characters.
pub const MAX_NICKNAME_LENGTH: u64 = 32;

/// Partial member edit. Only the fields that are set are validated, checked
/// and sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Validate)]
pub struct EditMemberRequest {
    /// New nickname; an empty string clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_NICKNAME_LENGTH))]
    pub nick: Option<String>,

    /// Full replacement role list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Uuid>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mute: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaf: Option<bool>,

    /// Voice channel to move the member into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<Uuid>,

    /// Audit log reason, sent as a header rather than in the body.
    #[serde(skip)]
    pub reason: Option<String>,
}

impl EditMemberRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn nick(mut self, nick: impl Into<String>) -> Self {
        self.nick = Some(nick.into());
        self
    }

    #[must_use]
    pub fn roles(mut self, roles: Vec<Uuid>) -> Self {
        self.roles = Some(roles);
        self
    }

    #[must_use]
    pub const fn mute(mut self, mute: bool) -> Self {
        self.mute = Some(mute);
        self
    }

    #[must_use]
    pub const fn deaf(mut self, deaf: bool) -> Self {
        self.deaf = Some(deaf);
        self
    }

    #[must_use]
    pub const fn channel_id(mut self, channel_id: Uuid) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True when no editable field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nick.is_none()
            && self.roles.is_none()
            && self.mute.is_none()
            && self.deaf.is_none()
            && self.channel_id.is_none()
    }

    /// Capabilities needed for the fields present, in check order.
    #[must_use]
    pub fn required_capabilities(&self) -> Vec<Capability> {
        [
            (self.nick.is_some(), Capability::ManageNicknames),
            (self.roles.is_some(), Capability::ManageRoles),
            (self.mute.is_some(), Capability::MuteMembers),
            (self.deaf.is_some(), Capability::DeafenMembers),
            (self.channel_id.is_some(), Capability::MoveMembers),
        ]
        .into_iter()
        .filter_map(|(present, cap)| present.then_some(cap))
        .collect()
    }
}
