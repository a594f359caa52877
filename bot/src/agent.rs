//! Identity of the acting bot.

use uuid::Uuid;

use crate::config::BotConfig;

/// The bot on whose behalf checks and mutations run.
///
/// Passed explicitly into every permission check and member operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentContext {
    pub user_id: Uuid,
}

impl AgentContext {
    #[must_use]
    pub const fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl From<&BotConfig> for AgentContext {
    fn from(config: &BotConfig) -> Self {
        Self::new(config.bot_user_id)
    }
}
