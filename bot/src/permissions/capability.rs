//! Capabilities required by member operations.

use std::fmt;

use super::guild::GuildPermissions;

/// A single capability a member operation can require.
///
/// Each maps onto exactly one permission bit, so a denial can name what is
/// missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageRoles,
    KickMembers,
    ManageNicknames,
    MuteMembers,
    DeafenMembers,
    MoveMembers,
}

impl Capability {
    #[must_use]
    pub const fn permission(self) -> GuildPermissions {
        match self {
            Self::ManageRoles => GuildPermissions::MANAGE_ROLES,
            Self::KickMembers => GuildPermissions::KICK_MEMBERS,
            Self::ManageNicknames => GuildPermissions::MANAGE_NICKNAMES,
            Self::MuteMembers => GuildPermissions::VOICE_MUTE_OTHERS,
            Self::DeafenMembers => GuildPermissions::VOICE_DEAFEN_OTHERS,
            Self::MoveMembers => GuildPermissions::VOICE_MOVE_MEMBERS,
        }
    }

    /// Stable snake_case name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageRoles => "manage_roles",
            Self::KickMembers => "kick_members",
            Self::ManageNicknames => "manage_nicknames",
            Self::MuteMembers => "mute_members",
            Self::DeafenMembers => "deafen_members",
            Self::MoveMembers => "move_members",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_capability_maps_to_a_distinct_bit() {
        let caps = [
            Capability::ManageRoles,
            Capability::KickMembers,
            Capability::ManageNicknames,
            Capability::MuteMembers,
            Capability::DeafenMembers,
            Capability::MoveMembers,
        ];

        let mut seen = GuildPermissions::empty();
        for cap in caps {
            let bit = cap.permission();
            assert_eq!(bit.bits().count_ones(), 1, "{cap} should be a single bit");
            assert!(!seen.intersects(bit), "{cap} shares a bit");
            seen |= bit;
        }
    }

    #[test]
    fn test_display_uses_snake_case() {
        assert_eq!(Capability::MuteMembers.to_string(), "mute_members");
        assert_eq!(Capability::ManageNicknames.to_string(), "manage_nicknames");
    }
}
