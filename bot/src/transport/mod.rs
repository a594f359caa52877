//! Remote request transport.
//!
//! One trait method per remote call the bot issues. Implementations report
//! HTTP-level outcomes as [`TransportError`]; callers pass those through
//! without reinterpreting them. Retries and backoff are not handled here.

pub mod http;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::dm::CreateMessageRequest;
use crate::members::EditMemberRequest;
use crate::models::{Channel, Message};

pub use http::HttpTransport;

/// Errors reported by the remote API or the network below it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The platform refused the request (401/403), e.g. its own hierarchy
    /// enforcement disagreeing with a stale cache.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Resource not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited { retry_after: Option<Duration> },

    /// Connect failure, timeout or other transport-level error.
    #[error("API unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected response ({status}): {body}")]
    Unexpected { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Decode(String),
}

/// Remote calls issued by the member orchestrator and the DM resolver.
///
/// `reason` is forwarded to the guild audit log unchanged.
pub trait Transport: Send + Sync {
    /// `PUT /api/guilds/{guild_id}/members/{user_id}/roles/{role_id}`
    fn add_member_role(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// `DELETE /api/guilds/{guild_id}/members/{user_id}/roles/{role_id}`
    fn remove_member_role(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// `DELETE /api/guilds/{guild_id}/members/{user_id}`
    fn kick_member(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        reason: Option<&str>,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// `PATCH /api/guilds/{guild_id}/members/{user_id}` with only the fields
    /// present in `request`.
    fn edit_member(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        request: &EditMemberRequest,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// `POST /api/dm`. The server returns the existing channel when one
    /// already exists for the user.
    fn create_dm_channel(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Channel, TransportError>> + Send;

    /// `POST /api/messages/channel/{channel_id}`
    fn create_message(
        &self,
        channel_id: Uuid,
        request: &CreateMessageRequest,
    ) -> impl Future<Output = Result<Message, TransportError>> + Send;
}
