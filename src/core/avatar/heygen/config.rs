//! HeyGen streaming avatar configuration.

use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Base URL for the HeyGen session management API.
pub const HEYGEN_API_BASE_URL: &str = "https://api.heygen.com";

/// Sample rate the HeyGen realtime endpoint expects for buffered audio
/// (PCM 16-bit signed little-endian, mono).
pub const HEYGEN_SAMPLE_RATE: u32 = 24000;

/// Default interactive avatar identity.
pub const DEFAULT_AVATAR_NAME: &str = "Shawn_Therapist_public";

/// Default streaming avatar protocol version.
pub const DEFAULT_AVATAR_VERSION: &str = "v2";

/// Default connection timeout in seconds (HTTP and WebSocket).
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the HeyGen avatar client.
///
/// # Example
///
/// ```rust
/// use avatar_gateway::core::avatar::heygen::HeyGenConfig;
///
/// let config = HeyGenConfig::new("your-api-key")
///     .with_avatar("Katya_Chair_Sitting_public", "v2");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeyGenConfig {
    /// API key for the HeyGen session API.
    pub api_key: String,

    /// Interactive avatar name used at session creation.
    pub avatar_name: String,

    /// Streaming protocol version used at session creation.
    pub avatar_version: String,

    /// Session API base URL. Overridable for testing against a mock server.
    pub api_base_url: String,

    /// Connection timeout in seconds for session API calls and the realtime
    /// channel handshake.
    pub connection_timeout_seconds: u64,

    /// Input sample rate override. When unset, the pipeline-provided
    /// stream parameter is used.
    pub audio_in_sample_rate: Option<u32>,

    /// Output sample rate override. When unset, the pipeline-provided
    /// stream parameter is used.
    pub audio_out_sample_rate: Option<u32>,
}

impl Default for HeyGenConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            avatar_name: DEFAULT_AVATAR_NAME.to_string(),
            avatar_version: DEFAULT_AVATAR_VERSION.to_string(),
            api_base_url: HEYGEN_API_BASE_URL.to_string(),
            connection_timeout_seconds: DEFAULT_CONNECTION_TIMEOUT_SECS,
            audio_in_sample_rate: None,
            audio_out_sample_rate: None,
        }
    }
}

impl HeyGenConfig {
    /// Create a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the avatar identity used at session creation.
    pub fn with_avatar(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.avatar_name = name.into();
        self.avatar_version = version.into();
        self
    }

    /// Set the session API base URL.
    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    /// Set the connection timeout.
    pub fn with_connection_timeout(mut self, seconds: u64) -> Self {
        self.connection_timeout_seconds = seconds;
        self
    }

    /// Force the pipeline input sample rate instead of the stream default.
    pub fn with_audio_in_sample_rate(mut self, rate: u32) -> Self {
        self.audio_in_sample_rate = Some(rate);
        self
    }

    /// Force the pipeline output sample rate instead of the stream default.
    pub fn with_audio_out_sample_rate(mut self, rate: u32) -> Self {
        self.audio_out_sample_rate = Some(rate);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("API key is required".to_string());
        }
        if self.avatar_name.is_empty() {
            return Err("avatar name is required".to_string());
        }
        if self.avatar_version.is_empty() {
            return Err("avatar version is required".to_string());
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(format!("invalid API base URL: {}", self.api_base_url));
        }
        if self.connection_timeout_seconds == 0 {
            return Err("connection timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}
