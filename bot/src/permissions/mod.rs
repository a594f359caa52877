//! Permission gate and role hierarchy comparator.
//!
//! Pure predicates over a cached guild snapshot, evaluated before any
//! member mutation is dispatched.

pub mod capability;
pub mod guild;
pub mod resolver;

pub use capability::Capability;
pub use guild::GuildPermissions;
pub use resolver::{
    compute_guild_permissions, has_capability, highest_role, is_higher_position, member_rank,
    rank_of, Rank, Ranked,
};
