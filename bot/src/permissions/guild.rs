//! Guild-level permissions using bitflags.
//!
//! The bit layout matches the server's `guild_roles.permissions` column, so
//! values received over the API can be used as-is:
//! - Content (bits 0-4): Message and media permissions
//! - Voice (bits 5-9): Voice channel permissions
//! - Moderation (bits 10-13): Member management permissions
//! - Guild Management (bits 14-18): Administrative permissions
//! - Invites (bits 19-20)
//! - Misc (bits 21-24): Pages, screen share, mentions, channel visibility
//! - Nicknames (bit 25): Editing other members' nicknames

use bitflags::bitflags;

bitflags! {
    /// Guild permissions represented as a 64-bit bitfield.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GuildPermissions: u64 {
        // === Content (bits 0-4) ===
        const SEND_MESSAGES      = 1 << 0;
        const EMBED_LINKS        = 1 << 1;
        const ATTACH_FILES       = 1 << 2;
        const USE_EMOJI          = 1 << 3;
        const ADD_REACTIONS      = 1 << 4;

        // === Voice (bits 5-9) ===
        const VOICE_CONNECT      = 1 << 5;
        const VOICE_SPEAK        = 1 << 6;
        /// Server-mute other members in voice channels
        const VOICE_MUTE_OTHERS  = 1 << 7;
        /// Server-deafen other members in voice channels
        const VOICE_DEAFEN_OTHERS = 1 << 8;
        /// Move members between voice channels
        const VOICE_MOVE_MEMBERS = 1 << 9;

        // === Moderation (bits 10-13) ===
        const MANAGE_MESSAGES    = 1 << 10;
        const TIMEOUT_MEMBERS    = 1 << 11;
        /// Remove members from the guild
        const KICK_MEMBERS       = 1 << 12;
        const BAN_MEMBERS        = 1 << 13;

        // === Guild Management (bits 14-18) ===
        const MANAGE_CHANNELS    = 1 << 14;
        /// Create, edit, delete, assign and revoke roles below your own
        const MANAGE_ROLES       = 1 << 15;
        const VIEW_AUDIT_LOG     = 1 << 16;
        const MANAGE_GUILD       = 1 << 17;
        const TRANSFER_OWNERSHIP = 1 << 18;

        // === Invites (bits 19-20) ===
        const CREATE_INVITE      = 1 << 19;
        const MANAGE_INVITES     = 1 << 20;

        // === Misc (bits 21-24) ===
        const MANAGE_PAGES       = 1 << 21;
        const SCREEN_SHARE       = 1 << 22;
        const MENTION_EVERYONE   = 1 << 23;
        const VIEW_CHANNEL       = 1 << 24;

        // === Nicknames (bit 25) ===
        /// Change the nickname of other members
        const MANAGE_NICKNAMES   = 1 << 25;
    }
}

impl GuildPermissions {
    /// Build a permission set from the raw wire value.
    ///
    /// Unknown bits are dropped so newer servers don't break older bots.
    #[must_use]
    pub const fn from_wire(value: u64) -> Self {
        Self::from_bits_truncate(value)
    }

    /// Check if this permission set includes every bit of `permission`.
    #[must_use]
    pub const fn has(self, permission: Self) -> bool {
        self.contains(permission)
    }

    /// Bits of `required` that this set does not hold.
    #[must_use]
    pub const fn missing(self, required: Self) -> Self {
        required.difference(self)
    }
}

impl Default for GuildPermissions {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<u64> for GuildPermissions {
    fn from(value: u64) -> Self {
        Self::from_wire(value)
    }
}

/// Serde adapter that keeps permissions as a plain integer on the wire.
///
/// Use with `#[serde(with = "crate::permissions::guild::wire")]`.
pub mod wire {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::GuildPermissions;

    pub fn serialize<S: Serializer>(perms: &GuildPermissions, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(perms.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<GuildPermissions, D::Error> {
        u64::deserialize(d).map(GuildPermissions::from_wire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_moderation_bits() {
        assert_eq!(GuildPermissions::VOICE_MUTE_OTHERS.bits(), 1 << 7);
        assert_eq!(GuildPermissions::VOICE_DEAFEN_OTHERS.bits(), 1 << 8);
        assert_eq!(GuildPermissions::VOICE_MOVE_MEMBERS.bits(), 1 << 9);
    }

    #[test]
    fn test_member_management_bits() {
        assert_eq!(GuildPermissions::KICK_MEMBERS.bits(), 1 << 12);
        assert_eq!(GuildPermissions::MANAGE_ROLES.bits(), 1 << 15);
        assert_eq!(GuildPermissions::MANAGE_NICKNAMES.bits(), 1 << 25);
    }

    #[test]
    fn test_from_wire_truncates_unknown_bits() {
        let perms = GuildPermissions::from_wire((1 << 12) | (1 << 63));
        assert_eq!(perms, GuildPermissions::KICK_MEMBERS);
    }

    #[test]
    fn test_has_requires_all_bits() {
        let perms = GuildPermissions::KICK_MEMBERS | GuildPermissions::MANAGE_ROLES;

        assert!(perms.has(GuildPermissions::KICK_MEMBERS));
        assert!(perms.has(GuildPermissions::KICK_MEMBERS | GuildPermissions::MANAGE_ROLES));
        assert!(!perms.has(GuildPermissions::KICK_MEMBERS | GuildPermissions::BAN_MEMBERS));
        assert!(perms.has(GuildPermissions::empty()));
    }

    #[test]
    fn test_missing_reports_only_absent_bits() {
        let perms = GuildPermissions::MANAGE_NICKNAMES;
        let required = GuildPermissions::MANAGE_NICKNAMES | GuildPermissions::VOICE_MUTE_OTHERS;

        assert_eq!(perms.missing(required), GuildPermissions::VOICE_MUTE_OTHERS);
        assert!(perms.missing(GuildPermissions::MANAGE_NICKNAMES).is_empty());
    }

    #[test]
    fn test_no_bit_overlaps() {
        let combined: u64 = GuildPermissions::all()
            .iter()
            .fold(0, |acc, p| acc | p.bits());
        let sum: u64 = GuildPermissions::all().iter().map(|p| p.bits()).sum();

        assert_eq!(combined, sum, "Some permissions share the same bit!");
    }

    #[test]
    fn test_wire_serializes_as_integer() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "crate::permissions::guild::wire")]
            permissions: GuildPermissions,
        }

        let holder = Holder {
            permissions: GuildPermissions::SEND_MESSAGES | GuildPermissions::KICK_MEMBERS,
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"permissions":4097}"#);

        let parsed: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.permissions, holder.permissions);
    }
}
