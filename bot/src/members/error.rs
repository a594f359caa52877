//! Member operation errors.

use thiserror::Error;
use uuid::Uuid;

use crate::permissions::Capability;
use crate::transport::TransportError;

/// Why a member operation did not happen.
///
/// Every variant except `Remote` is raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberError {
    /// The bot's highest role does not outrank the target.
    #[error("Cannot act on position {target_position} (bot position: {agent_position})")]
    HierarchyTooLow {
        agent_position: i32,
        target_position: i32,
    },

    #[error("Missing capability: {0}")]
    MissingCapability(Capability),

    #[error("Nickname is {length} characters (max 32)")]
    InvalidNickname { length: usize },

    /// Guild is not in the cache, so nothing can be proven.
    #[error("Guild not cached: {0}")]
    UnknownGuild(Uuid),

    #[error("Role not found: {0}")]
    UnknownRole(Uuid),

    #[error("Cannot moderate guild owner")]
    CannotModerateOwner,

    #[error("Edit request has no fields")]
    EmptyEdit,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request was sent and failed remotely. A `Rejected` here means the
    /// platform's own checks refused it.
    #[error(transparent)]
    Remote(#[from] TransportError),
}

impl MemberError {
    /// Whether the operation was refused locally, without a request.
    #[must_use]
    pub const fn is_client_side(&self) -> bool {
        !matches!(self, Self::Remote(_))
    }

    /// Stable snake_case kind for logs and metrics labels.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::HierarchyTooLow { .. } => "hierarchy_too_low",
            Self::MissingCapability(_) => "missing_capability",
            Self::InvalidNickname { .. } => "invalid_nickname",
            Self::UnknownGuild(_) => "unknown_guild",
            Self::UnknownRole(_) => "unknown_role",
            Self::CannotModerateOwner => "cannot_moderate_owner",
            Self::EmptyEdit => "empty_edit",
            Self::Validation(_) => "validation",
            Self::Remote(TransportError::Rejected { .. }) => "remote_rejected",
            Self::Remote(_) => "remote",
        }
    }
}
