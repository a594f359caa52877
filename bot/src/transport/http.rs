//! HTTP transport backed by `reqwest`.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use super::{Transport, TransportError};
use crate::config::BotConfig;
use crate::dm::CreateMessageRequest;
use crate::members::EditMemberRequest;
use crate::models::{Channel, Message};

/// Header carrying the audit log reason for moderation requests.
pub const AUDIT_LOG_REASON_HEADER: &str = "X-Audit-Log-Reason";

#[derive(Debug, Serialize)]
struct CreateDmBody {
    participant_ids: [Uuid; 1],
}

/// Kaiku REST API client authenticated as a bot.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    api_url: String,
}

impl HttpTransport {
    pub fn new(config: &BotConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bot {}", config.bot_token))
            .map_err(|e| TransportError::Unreachable(format!("Invalid bot token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(format!("HTTP client setup failed: {e}")))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn member_url(&self, guild_id: Uuid, user_id: Uuid) -> String {
        format!("{}/api/guilds/{guild_id}/members/{user_id}", self.api_url)
    }

    fn member_role_url(&self, guild_id: Uuid, user_id: Uuid, role_id: Uuid) -> String {
        format!("{}/roles/{role_id}", self.member_url(guild_id, user_id))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            TransportError::Unreachable(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response.text().await.unwrap_or_default();
        error!("Request failed: {} - {}", status, body);
        Err(classify_status(status, retry_after, body))
    }
}

/// Attach the audit log reason, URL-encoded so any UTF-8 survives the header.
fn with_reason(request: RequestBuilder, reason: Option<&str>) -> RequestBuilder {
    match reason {
        Some(reason) => request.header(
            AUDIT_LOG_REASON_HEADER,
            url::form_urlencoded::byte_serialize(reason.as_bytes()).collect::<String>(),
        ),
        None => request,
    }
}

/// `Retry-After` in (possibly fractional) seconds.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Map a non-success status onto a transport error.
fn classify_status(status: StatusCode, retry_after: Option<Duration>, body: String) -> TransportError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => TransportError::Rejected {
            status: status.as_u16(),
            message: extract_message(&body).unwrap_or(body),
        },
        StatusCode::NOT_FOUND => TransportError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => TransportError::RateLimited { retry_after },
        _ => TransportError::Unexpected {
            status: status.as_u16(),
            body,
        },
    }
}

/// Pull `message` out of the server's `{"error": ..., "message": ...}` body.
fn extract_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

impl Transport for HttpTransport {
    async fn add_member_role(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!("Assigning role {} to {} in guild {}", role_id, user_id, guild_id);
        let request = self.http.put(self.member_role_url(guild_id, user_id, role_id));
        self.send(with_reason(request, reason)).await?;
        Ok(())
    }

    async fn remove_member_role(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!("Removing role {} from {} in guild {}", role_id, user_id, guild_id);
        let request = self
            .http
            .delete(self.member_role_url(guild_id, user_id, role_id));
        self.send(with_reason(request, reason)).await?;
        Ok(())
    }

    async fn kick_member(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        reason: Option<&str>,
    ) -> Result<(), TransportError> {
        debug!("Kicking {} from guild {}", user_id, guild_id);
        let request = self.http.delete(self.member_url(guild_id, user_id));
        self.send(with_reason(request, reason)).await?;
        Ok(())
    }

    async fn edit_member(
        &self,
        guild_id: Uuid,
        user_id: Uuid,
        request: &EditMemberRequest,
    ) -> Result<(), TransportError> {
        debug!("Editing member {} in guild {}", user_id, guild_id);
        let builder = self
            .http
            .patch(self.member_url(guild_id, user_id))
            .json(request);
        self.send(with_reason(builder, request.reason.as_deref()))
            .await?;
        Ok(())
    }

    async fn create_dm_channel(&self, user_id: Uuid) -> Result<Channel, TransportError> {
        debug!("Opening DM channel with {}", user_id);
        let request = self
            .http
            .post(format!("{}/api/dm", self.api_url))
            .json(&CreateDmBody {
                participant_ids: [user_id],
            });

        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn create_message(
        &self,
        channel_id: Uuid,
        request: &CreateMessageRequest,
    ) -> Result<Message, TransportError> {
        debug!("Sending message to channel {}", channel_id);
        let builder = self
            .http
            .post(format!("{}/api/messages/channel/{channel_id}", self.api_url))
            .json(request);

        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> HttpTransport {
        let config = BotConfig {
            api_url: "https://chat.example.com/".into(),
            ..BotConfig::default_for_test()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_member_urls() {
        let t = transport();
        let guild_id = Uuid::now_v7();
        let user_id = Uuid::now_v7();
        let role_id = Uuid::now_v7();

        assert_eq!(
            t.member_url(guild_id, user_id),
            format!("https://chat.example.com/api/guilds/{guild_id}/members/{user_id}")
        );
        assert_eq!(
            t.member_role_url(guild_id, user_id, role_id),
            format!("https://chat.example.com/api/guilds/{guild_id}/members/{user_id}/roles/{role_id}")
        );
    }

    #[test]
    fn test_reason_header_is_encoded() {
        let t = transport();
        let request = with_reason(t.http.delete("https://chat.example.com/x"), Some("spam & abuse ✓"))
            .build()
            .unwrap();

        let value = request.headers().get(AUDIT_LOG_REASON_HEADER).unwrap();
        assert_eq!(value.to_str().unwrap(), "spam+%26+abuse+%E2%9C%93");
    }

    #[test]
    fn test_no_reason_no_header() {
        let t = transport();
        let request = with_reason(t.http.delete("https://chat.example.com/x"), None)
            .build()
            .unwrap();
        assert!(request.headers().get(AUDIT_LOG_REASON_HEADER).is_none());
    }

    #[test]
    fn test_classify_forbidden_uses_server_message() {
        let body = r#"{"error":"role_hierarchy","message":"Cannot modify role at position 3"}"#;
        let err = classify_status(StatusCode::FORBIDDEN, None, body.to_string());
        assert_eq!(
            err,
            TransportError::Rejected {
                status: 403,
                message: "Cannot modify role at position 3".into(),
            }
        );
    }

    #[test]
    fn test_classify_not_found_and_rate_limit() {
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND, None, String::new()),
            TransportError::NotFound
        );
        assert_eq!(
            classify_status(
                StatusCode::TOO_MANY_REQUESTS,
                Some(Duration::from_millis(1500)),
                String::new()
            ),
            TransportError::RateLimited {
                retry_after: Some(Duration::from_millis(1500))
            }
        );
    }

    #[test]
    fn test_classify_other_status_keeps_body() {
        let err = classify_status(StatusCode::BAD_GATEWAY, None, "upstream down".into());
        assert_eq!(
            err,
            TransportError::Unexpected {
                status: 502,
                body: "upstream down".into(),
            }
        );
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("2"), Some(Duration::from_secs(2)));
        assert_eq!(parse_retry_after(" 0.5 "), Some(Duration::from_millis(500)));
        assert_eq!(parse_retry_after("-1"), None);
        assert_eq!(parse_retry_after("soon"), None);
    }

    #[test]
    fn test_edit_body_contains_only_present_fields() {
        let request = EditMemberRequest::new().nick("ok").mute(true).reason("cleanup");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, serde_json::json!({"nick": "ok", "mute": true}));
    }
}
