//! Permission resolution logic.
//!
//! Computes the agent's effective permissions and compares role ranks over a
//! cached guild snapshot. Everything here is synchronous and side-effect free;
//! missing cache data always resolves to "not allowed".

use uuid::Uuid;

use super::guild::GuildPermissions;
use crate::agent::AgentContext;
use crate::models::{Guild, Role};

/// Compute guild permissions for a user.
///
/// Resolution order:
/// 1. Guild owner has all permissions
/// 2. Non-resident users have none (`None`)
/// 3. Start with @everyone role permissions
/// 4. Add permissions from every assigned role
#[must_use]
pub fn compute_guild_permissions(guild: &Guild, user_id: Uuid) -> Option<GuildPermissions> {
    if guild.is_owner(user_id) {
        return Some(GuildPermissions::all());
    }

    guild.member(user_id)?;

    let everyone = guild
        .default_role()
        .map(|r| r.permissions)
        .unwrap_or_default();

    Some(
        guild
            .member_roles(user_id)
            .fold(everyone, |acc, role| acc | role.permissions),
    )
}

/// Whether the agent holds every bit of `required` in this guild.
///
/// Fails closed when the guild is not cached or the agent is not a member.
#[must_use]
pub fn has_capability(
    guild: Option<&Guild>,
    agent: &AgentContext,
    required: GuildPermissions,
) -> bool {
    guild
        .and_then(|g| compute_guild_permissions(g, agent.user_id))
        .is_some_and(|perms| perms.has(required))
}

/// The role with the highest position among a user's assigned roles.
///
/// `None` when the user holds no role beyond @everyone or is not cached.
/// Ties are broken by role id so the result is stable.
#[must_use]
pub fn highest_role(guild: &Guild, user_id: Uuid) -> Option<&Role> {
    guild
        .member_roles(user_id)
        .max_by_key(|r| (r.position, r.id))
}

/// Something that carries a rank in the role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranked {
    Role(Uuid),
    Member(Uuid),
}

/// Place in the role hierarchy.
///
/// The owner sits above every role position, `i32::MAX` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    Position(i32),
    Owner,
}

impl Rank {
    /// Numeric position for reporting. The owner reports as `i32::MAX`.
    #[must_use]
    pub const fn position(self) -> i32 {
        match self {
            Self::Position(position) => position,
            Self::Owner => i32::MAX,
        }
    }
}

/// Rank of a member: owner, else their highest role, else the @everyone
/// position (0 if that role is not cached).
#[must_use]
pub fn member_rank(guild: &Guild, user_id: Uuid) -> Rank {
    if guild.is_owner(user_id) {
        return Rank::Owner;
    }
    Rank::Position(
        highest_role(guild, user_id)
            .or_else(|| guild.default_role())
            .map_or(0, |r| r.position),
    )
}

/// Rank of a role or member, `None` for a role that is not cached.
#[must_use]
pub fn rank_of(guild: &Guild, ranked: Ranked) -> Option<Rank> {
    match ranked {
        Ranked::Role(role_id) => guild.role(role_id).map(|r| Rank::Position(r.position)),
        Ranked::Member(user_id) => Some(member_rank(guild, user_id)),
    }
}

/// Strict rank comparison: equal positions are not higher, and an unknown
/// rank on either side is never higher.
#[must_use]
pub fn is_higher_position(guild: &Guild, a: Ranked, b: Ranked) -> bool {
    match (rank_of(guild, a), rank_of(guild, b)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Member;

    struct Fixture {
        guild: Guild,
        owner_id: Uuid,
    }

    fn role(guild_id: Uuid, position: i32, permissions: GuildPermissions) -> Role {
        Role {
            id: Uuid::now_v7(),
            guild_id,
            name: format!("role-{position}"),
            permissions,
            position,
            is_default: false,
        }
    }

    fn member(guild_id: Uuid, user_id: Uuid, role_ids: Vec<Uuid>) -> Member {
        Member {
            user_id,
            guild_id,
            role_ids,
            nickname: None,
            muted: false,
            deafened: false,
            voice_channel_id: None,
        }
    }

    fn fixture() -> Fixture {
        let guild_id = Uuid::now_v7();
        let owner_id = Uuid::now_v7();
        let everyone = Role {
            is_default: true,
            ..role(guild_id, 0, GuildPermissions::SEND_MESSAGES)
        };
        Fixture {
            guild: Guild::new(guild_id, owner_id).with_role(everyone),
            owner_id,
        }
    }

    #[test]
    fn test_owner_has_all_permissions() {
        let f = fixture();
        let perms = compute_guild_permissions(&f.guild, f.owner_id);
        assert_eq!(perms, Some(GuildPermissions::all()));
    }

    #[test]
    fn test_non_member_has_no_permissions() {
        let f = fixture();
        assert_eq!(compute_guild_permissions(&f.guild, Uuid::now_v7()), None);
    }

    #[test]
    fn test_everyone_and_role_permissions_combined() {
        let f = fixture();
        let user_id = Uuid::now_v7();
        let mod_role = role(
            f.guild.id,
            5,
            GuildPermissions::KICK_MEMBERS | GuildPermissions::VOICE_MUTE_OTHERS,
        );
        let helper = role(f.guild.id, 2, GuildPermissions::MANAGE_NICKNAMES);
        let guild = f
            .guild
            .clone()
            .with_member(member(f.guild.id, user_id, vec![mod_role.id, helper.id]))
            .with_role(mod_role)
            .with_role(helper);

        let perms = compute_guild_permissions(&guild, user_id).unwrap();
        assert!(perms.has(GuildPermissions::SEND_MESSAGES)); // from everyone
        assert!(perms.has(GuildPermissions::KICK_MEMBERS));
        assert!(perms.has(GuildPermissions::MANAGE_NICKNAMES));
        assert!(!perms.has(GuildPermissions::MANAGE_ROLES));
    }

    #[test]
    fn test_has_capability_fails_closed_without_guild() {
        let agent = AgentContext::new(Uuid::now_v7());
        assert!(!has_capability(None, &agent, GuildPermissions::empty()));
    }

    #[test]
    fn test_has_capability_requires_every_bit() {
        let f = fixture();
        let bot = Uuid::now_v7();
        let kicker = role(f.guild.id, 3, GuildPermissions::KICK_MEMBERS);
        let guild = f
            .guild
            .clone()
            .with_member(member(f.guild.id, bot, vec![kicker.id]))
            .with_role(kicker);
        let agent = AgentContext::new(bot);

        assert!(has_capability(Some(&guild), &agent, GuildPermissions::KICK_MEMBERS));
        assert!(!has_capability(
            Some(&guild),
            &agent,
            GuildPermissions::KICK_MEMBERS | GuildPermissions::MANAGE_ROLES
        ));
    }

    #[test]
    fn test_highest_role_picks_max_position() {
        let f = fixture();
        let user_id = Uuid::now_v7();
        let low = role(f.guild.id, 1, GuildPermissions::empty());
        let high = role(f.guild.id, 9, GuildPermissions::empty());
        let guild = f
            .guild
            .clone()
            .with_member(member(f.guild.id, user_id, vec![low.id, high.id]))
            .with_role(low)
            .with_role(high.clone());

        assert_eq!(highest_role(&guild, user_id), Some(&high));
    }

    #[test]
    fn test_highest_role_absent_for_roleless_member() {
        let f = fixture();
        let user_id = Uuid::now_v7();
        let guild = f
            .guild
            .clone()
            .with_member(member(f.guild.id, user_id, Vec::new()));

        assert_eq!(highest_role(&guild, user_id), None);
        assert_eq!(rank_of(&guild, Ranked::Member(user_id)), Some(Rank::Position(0)));
    }

    #[test]
    fn test_uncached_member_ranks_at_everyone() {
        let f = fixture();
        assert_eq!(rank_of(&f.guild, Ranked::Member(Uuid::now_v7())), Some(Rank::Position(0)));
    }

    #[test]
    fn test_unknown_role_has_no_rank() {
        let f = fixture();
        let unknown = Uuid::now_v7();
        assert_eq!(rank_of(&f.guild, Ranked::Role(unknown)), None);
        assert!(!is_higher_position(
            &f.guild,
            Ranked::Member(f.owner_id),
            Ranked::Role(unknown)
        ));
    }

    #[test]
    fn test_equal_positions_are_not_higher() {
        let f = fixture();
        let a = role(f.guild.id, 5, GuildPermissions::empty());
        let b = role(f.guild.id, 5, GuildPermissions::empty());
        let guild = f.guild.clone().with_role(a.clone()).with_role(b.clone());

        assert!(!is_higher_position(&guild, Ranked::Role(a.id), Ranked::Role(b.id)));
        assert!(!is_higher_position(&guild, Ranked::Role(b.id), Ranked::Role(a.id)));
    }

    #[test]
    fn test_higher_member_outranks_lower_role() {
        let f = fixture();
        let user_id = Uuid::now_v7();
        let high = role(f.guild.id, 10, GuildPermissions::empty());
        let target = role(f.guild.id, 3, GuildPermissions::empty());
        let guild = f
            .guild
            .clone()
            .with_member(member(f.guild.id, user_id, vec![high.id]))
            .with_role(high)
            .with_role(target.clone());

        assert!(is_higher_position(
            &guild,
            Ranked::Member(user_id),
            Ranked::Role(target.id)
        ));
        assert!(!is_higher_position(
            &guild,
            Ranked::Role(target.id),
            Ranked::Member(user_id)
        ));
    }

    #[test]
    fn test_owner_outranks_every_member() {
        let f = fixture();
        let user_id = Uuid::now_v7();
        let top = role(f.guild.id, i32::MAX - 1, GuildPermissions::empty());
        let guild = f
            .guild
            .clone()
            .with_member(member(f.guild.id, user_id, vec![top.id]))
            .with_role(top);

        assert!(is_higher_position(
            &guild,
            Ranked::Member(f.owner_id),
            Ranked::Member(user_id)
        ));
        assert!(!is_higher_position(
            &guild,
            Ranked::Member(f.owner_id),
            Ranked::Member(f.owner_id)
        ));
    }

    #[test]
    fn test_owner_outranks_role_at_max_position() {
        let f = fixture();
        let top = role(f.guild.id, i32::MAX, GuildPermissions::empty());
        let guild = f.guild.clone().with_role(top.clone());

        assert!(is_higher_position(
            &guild,
            Ranked::Member(f.owner_id),
            Ranked::Role(top.id)
        ));
        assert_eq!(member_rank(&guild, f.owner_id).position(), i32::MAX);
    }
}
