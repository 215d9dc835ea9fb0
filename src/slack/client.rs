use crate::config::SlackConfig;
use crate::error::{Result, SlackNotifError};
use crate::metadata::{ChannelInfo, DirectoryClient, Identity, UserLookup};
use reqwest::StatusCode;
use serde::Deserialize;
use slack_morphism::errors::SlackClientError;
use slack_morphism::prelude::*;
use std::sync::Arc;

const RTM_CONNECT_URL: &str = "https://slack.com/api/rtm.connect";

/// Error code Slack returns for an unknown user
const USER_NOT_FOUND: &str = "user_not_found";

#[derive(Debug, Deserialize)]
struct RtmConnectResponse {
    ok: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
    http: reqwest::Client,
    config: SlackConfig,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| SlackNotifError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.api_token.clone().into())
            .with_cookie(config.cookie.clone().into());

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SlackNotifError::SlackApi(e.to_string()))?;

        Ok(Self {
            client,
            token,
            http,
            config,
        })
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Identifier of the user who owns the token
    pub async fn token_owner_id(&self) -> Result<String> {
        let session = self.client.open_session(&self.token);

        let response = session
            .auth_test()
            .await
            .map_err(|e| SlackNotifError::SlackApi(format!("auth.test failed: {}", e)))?;

        tracing::debug!(user_id = %response.user_id, "Resolved token owner");
        Ok(response.user_id.to_string())
    }

    /// Open an RTM session and return its websocket url
    pub async fn rtm_connect(&self) -> Result<String> {
        tracing::debug!("Requesting RTM websocket url");

        let response = self
            .http
            .get(RTM_CONNECT_URL)
            .bearer_auth(&self.config.api_token)
            .header(reqwest::header::COOKIE, &self.config.cookie)
            .send()
            .await
            .map_err(|e| SlackNotifError::SlackApi(format!("rtm.connect failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            return Err(SlackNotifError::SlackApi(format!(
                "received {} from rtm.connect",
                response.status()
            )));
        }

        let body: RtmConnectResponse = response
            .json()
            .await
            .map_err(|e| SlackNotifError::SlackApi(format!("rtm.connect body: {}", e)))?;

        parse_rtm_connect(body)
    }
}

fn parse_rtm_connect(body: RtmConnectResponse) -> Result<String> {
    if !body.ok {
        return Err(SlackNotifError::SlackApi(format!(
            "rtm.connect response not ok: {}",
            body.error.unwrap_or_else(|| "unknown_error".to_string())
        )));
    }

    body.url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| SlackNotifError::SlackApi("rtm.connect returned no url".to_string()))
}

fn is_user_not_found(err: &SlackClientError) -> bool {
    matches!(err, SlackClientError::ApiError(api) if api.code == USER_NOT_FOUND)
}

impl DirectoryClient for SlackClient {
    async fn fetch_user(&self, user_id: &str) -> Result<UserLookup> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        let user = match session.users_info(&request).await {
            Ok(response) => response.user,
            Err(e) if is_user_not_found(&e) => return Ok(UserLookup::NotFound),
            Err(e) => return Err(SlackNotifError::directory(user_id, e)),
        };

        let raw = serde_json::to_value(&user)?;
        let identity = Identity::new(user.id.to_string(), user.name).with_raw(raw);

        Ok(UserLookup::Found(identity))
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelInfo> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiConversationsInfoRequest::new(SlackChannelId(channel_id.to_string()));

        let response = session
            .conversations_info(&request)
            .await
            .map_err(|e| SlackNotifError::directory(channel_id, e))?;

        let channel = response.channel;

        Ok(ChannelInfo {
            id: channel.id.to_string(),
            name: channel.name,
            is_direct_message: channel.flags.is_im.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> RtmConnectResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_rtm_connect_ok() {
        let url = parse_rtm_connect(body(
            r#"{"ok":true,"url":"wss://wss-primary.slack.com/websocket/abc","team":{"id":"T1"}}"#,
        ))
        .unwrap();
        assert_eq!(url, "wss://wss-primary.slack.com/websocket/abc");
    }

    #[test]
    fn test_rtm_connect_not_ok() {
        let err = parse_rtm_connect(body(r#"{"ok":false,"error":"invalid_auth"}"#)).unwrap_err();
        assert!(matches!(err, SlackNotifError::SlackApi(ref m) if m.contains("invalid_auth")));
    }

    #[test]
    fn test_rtm_connect_missing_url() {
        let err = parse_rtm_connect(body(r#"{"ok":true}"#)).unwrap_err();
        assert!(matches!(err, SlackNotifError::SlackApi(_)));
    }

    #[test]
    fn test_client_keeps_credentials() {
        // Initialize crypto provider for rustls
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let config = SlackConfig {
            api_token: "xoxc-test".to_string(),
            cookie: "d=xoxd-test".to_string(),
        };
        let client = SlackClient::new(config).unwrap();

        assert_eq!(client.config().api_token, "xoxc-test");
        assert_eq!(client.config().cookie, "d=xoxd-test");
    }
}
