//! Member mutation orchestrator.
//!
//! Every operation runs validate → authorize → dispatch and stops at the
//! first failing step. Authorization reads a cached guild snapshot only; a
//! request is sent to the API only once every check has passed.

pub mod error;
pub mod types;

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;
use validator::Validate;

use crate::agent::AgentContext;
use crate::cache::GuildCache;
use crate::models::Guild;
use crate::permissions::{has_capability, member_rank, rank_of, Capability, Ranked};
use crate::transport::{Transport, TransportError};

pub use error::MemberError;
pub use types::{EditMemberRequest, MAX_NICKNAME_LENGTH};

/// Checks and dispatches role, kick and edit operations on guild members.
pub struct MemberManager<T, G> {
    transport: Arc<T>,
    guilds: G,
}

impl<T: Transport, G: GuildCache> MemberManager<T, G> {
    pub const fn new(transport: Arc<T>, guilds: G) -> Self {
        Self { transport, guilds }
    }

    /// Give `role_id` to a member.
    ///
    /// Requires the bot to outrank the role and hold `MANAGE_ROLES`.
    #[tracing::instrument(skip(self, agent), fields(bot_id = %agent.user_id))]
    pub async fn assign_role(
        &self,
        agent: &AgentContext,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), MemberError> {
        self.authorize_role_change(agent, guild_id, role_id)?;

        debug!("Dispatching role assignment");
        self.transport
            .add_member_role(guild_id, user_id, role_id, reason)
            .await
            .map_err(remote_failure)
    }

    /// Take `role_id` away from a member.
    ///
    /// Same requirements as [`Self::assign_role`].
    #[tracing::instrument(skip(self, agent), fields(bot_id = %agent.user_id))]
    pub async fn revoke_role(
        &self,
        agent: &AgentContext,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), MemberError> {
        self.authorize_role_change(agent, guild_id, role_id)?;

        debug!("Dispatching role removal");
        self.transport
            .remove_member_role(guild_id, user_id, role_id, reason)
            .await
            .map_err(remote_failure)
    }

    /// Remove a member from the guild.
    ///
    /// The owner can never be kicked. Otherwise the bot must strictly outrank
    /// the member's highest role (equal rank blocks) and hold `KICK_MEMBERS`.
    #[tracing::instrument(skip(self, agent), fields(bot_id = %agent.user_id))]
    pub async fn kick(
        &self,
        agent: &AgentContext,
        guild_id: Uuid,
        user_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), MemberError> {
        {
            let guild = self.snapshot(guild_id)?;
            if guild.is_owner(user_id) {
                return Err(refuse(&guild, agent, MemberError::CannotModerateOwner));
            }
            require_outranks(&guild, agent, Ranked::Member(user_id))?;
            require_capability(&guild, agent, Capability::KickMembers)?;
        }

        debug!("Dispatching kick");
        self.transport
            .kick_member(guild_id, user_id, reason)
            .await
            .map_err(remote_failure)
    }

    /// Patch a member's nickname, roles, voice state or voice channel.
    ///
    /// The whole request is validated first. The bot must then strictly
    /// outrank the member (the owner is never editable) and every role in a
    /// `roles` list, and hold the capability of each present field. Nothing is
    /// sent unless every check passes.
    #[tracing::instrument(skip(self, agent), fields(bot_id = %agent.user_id))]
    pub async fn edit_member(
        &self,
        agent: &AgentContext,
        guild_id: Uuid,
        user_id: Uuid,
        request: &EditMemberRequest,
    ) -> Result<(), MemberError> {
        if request.is_empty() {
            return Err(MemberError::EmptyEdit);
        }
        validate_edit(request)?;

        {
            let guild = self.snapshot(guild_id)?;
            if guild.is_owner(user_id) {
                return Err(refuse(&guild, agent, MemberError::CannotModerateOwner));
            }
            require_outranks(&guild, agent, Ranked::Member(user_id))?;
            for &role_id in request.roles.iter().flatten() {
                require_assignable(&guild, agent, role_id)?;
            }
            for capability in request.required_capabilities() {
                require_capability(&guild, agent, capability)?;
            }
        }

        debug!("Dispatching member edit");
        self.transport
            .edit_member(guild_id, user_id, request)
            .await
            .map_err(remote_failure)
    }

    fn authorize_role_change(
        &self,
        agent: &AgentContext,
        guild_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), MemberError> {
        let guild = self.snapshot(guild_id)?;
        require_assignable(&guild, agent, role_id)?;
        require_capability(&guild, agent, Capability::ManageRoles)
    }

    fn snapshot(&self, guild_id: Uuid) -> Result<Arc<Guild>, MemberError> {
        self.guilds.guild(guild_id).ok_or_else(|| {
            warn!(%guild_id, "Guild not cached, refusing member operation");
            MemberError::UnknownGuild(guild_id)
        })
    }
}

/// Reject nicknames over the limit before anything else is looked at.
fn validate_edit(request: &EditMemberRequest) -> Result<(), MemberError> {
    let Err(errors) = request.validate() else {
        return Ok(());
    };

    if errors.field_errors().contains_key("nick") {
        let length = request.nick.as_deref().map_or(0, |n| n.chars().count());
        warn!(length, "Nickname too long");
        return Err(MemberError::InvalidNickname { length });
    }
    Err(MemberError::Validation(errors.to_string()))
}

/// The role is cached, is not @everyone, and sits below the bot.
fn require_assignable(
    guild: &Guild,
    agent: &AgentContext,
    role_id: Uuid,
) -> Result<(), MemberError> {
    let role = guild
        .role(role_id)
        .ok_or_else(|| refuse(guild, agent, MemberError::UnknownRole(role_id)))?;
    if role.is_default {
        return Err(refuse(
            guild,
            agent,
            MemberError::Validation("Cannot assign or remove the @everyone role".into()),
        ));
    }
    require_outranks(guild, agent, Ranked::Role(role_id))
}

fn require_outranks(
    guild: &Guild,
    agent: &AgentContext,
    target: Ranked,
) -> Result<(), MemberError> {
    let target_rank = match target {
        Ranked::Role(role_id) => rank_of(guild, target)
            .ok_or_else(|| refuse(guild, agent, MemberError::UnknownRole(role_id)))?,
        Ranked::Member(user_id) => member_rank(guild, user_id),
    };
    let agent_rank = member_rank(guild, agent.user_id);
    if agent_rank > target_rank {
        return Ok(());
    }

    let err = MemberError::HierarchyTooLow {
        agent_position: agent_rank.position(),
        target_position: target_rank.position(),
    };
    Err(refuse(guild, agent, err))
}

fn require_capability(
    guild: &Guild,
    agent: &AgentContext,
    capability: Capability,
) -> Result<(), MemberError> {
    if has_capability(Some(guild), agent, capability.permission()) {
        Ok(())
    } else {
        Err(refuse(guild, agent, MemberError::MissingCapability(capability)))
    }
}

fn refuse(guild: &Guild, agent: &AgentContext, err: MemberError) -> MemberError {
    warn!(
        guild_id = %guild.id,
        bot_id = %agent.user_id,
        kind = err.kind(),
        "Member operation refused: {}",
        err
    );
    err
}

fn remote_failure(err: TransportError) -> MemberError {
    error!("Member operation failed remotely: {}", err);
    MemberError::Remote(err)
}
