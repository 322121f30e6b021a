//! HeyGen session management API client.
//!
//! Thin request/response wrapper over the three session lifecycle calls:
//! create (`/v1/streaming.new`), activate (`/v1/streaming.start`) and
//! release (`/v1/streaming.stop`). Authentication is an `x-api-key` header.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::config::HeyGenConfig;
use super::messages::{ApiEnvelope, HeyGenSession, NewSessionRequest, SessionIdRequest};
use crate::core::avatar::base::{AvatarError, AvatarResult};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Session management client for the HeyGen streaming API.
pub struct HeyGenApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HeyGenApi {
    /// Create an API client with the given key, base URL and connect timeout.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        connect_timeout: Duration,
    ) -> AvatarResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| AvatarError::InvalidConfiguration(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url,
        })
    }

    /// Create an API client from a [`HeyGenConfig`].
    pub fn from_config(config: &HeyGenConfig) -> AvatarResult<Self> {
        Self::new(
            &config.api_key,
            &config.api_base_url,
            Duration::from_secs(config.connection_timeout_seconds),
        )
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<ApiEnvelope<T>, String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "HeyGen API request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {body}"));
        }

        response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| format!("invalid response body: {e}"))
    }

    /// Create a new avatar session.
    ///
    /// The returned session is created but not yet active; callers must
    /// follow up with [`start_session`](Self::start_session) before opening
    /// the realtime channel.
    pub async fn new_session(&self, request: NewSessionRequest) -> AvatarResult<HeyGenSession> {
        let envelope: ApiEnvelope<HeyGenSession> = self
            .post("/v1/streaming.new", &request)
            .await
            .map_err(AvatarError::SessionCreationFailed)?;

        envelope.data.ok_or_else(|| {
            AvatarError::SessionCreationFailed(format!(
                "response missing session data (message: {:?})",
                envelope.message
            ))
        })
    }

    /// Activate a created session server-side.
    pub async fn start_session(&self, session_id: &str) -> AvatarResult<()> {
        let request = SessionIdRequest {
            session_id: session_id.to_string(),
        };
        self.post::<serde_json::Value>("/v1/streaming.start", &request)
            .await
            .map_err(AvatarError::SessionStartFailed)?;
        Ok(())
    }

    /// Release a session's server-side resources.
    ///
    /// Invoked on teardown paths; callers there log the error instead of
    /// propagating it so shutdown is never blocked on the avatar service.
    pub async fn close_session(&self, session_id: &str) -> AvatarResult<()> {
        let request = SessionIdRequest {
            session_id: session_id.to_string(),
        };
        self.post::<serde_json::Value>("/v1/streaming.stop", &request)
            .await
            .map_err(AvatarError::SessionCloseFailed)?;
        Ok(())
    }

    /// Base URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
