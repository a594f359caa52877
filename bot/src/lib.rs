//! `VoiceChat` Bot
//!
//! Member moderation and direct messages for Kaiku bot accounts.
//! Every mutation is checked against the cached guild state (capabilities and
//! role hierarchy) before it is sent to the API.

pub mod agent;
pub mod cache;
pub mod config;
pub mod dm;
pub mod members;
pub mod models;
pub mod permissions;
pub mod telemetry;
pub mod transport;

pub use agent::AgentContext;
pub use dm::{DmError, DmResolver};
pub use members::{EditMemberRequest, MemberError, MemberManager};
