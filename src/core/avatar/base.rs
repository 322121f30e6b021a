//! Base types for real-time avatar media clients.
//!
//! This module defines the error taxonomy, connection state, callback types
//! and the pipeline-facing trait shared by avatar providers.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during avatar operations.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Remote session creation failed
    #[error("Session creation failed: {0}")]
    SessionCreationFailed(String),

    /// Remote session activation failed
    #[error("Session start failed: {0}")]
    SessionStartFailed(String),

    /// Remote session release failed
    #[error("Session close failed: {0}")]
    SessionCloseFailed(String),

    /// Session state error (e.g. realtime traffic before setup)
    #[error("Session error: {0}")]
    SessionError(String),

    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Audio resampling/conversion error
    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Not connected
    #[error("Not connected")]
    NotConnected,
}

/// Result type for avatar operations.
pub type AvatarResult<T> = Result<T, AvatarError>;

// =============================================================================
// Connection State
// =============================================================================

/// Connection state of the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the provider
    #[default]
    Disconnected,
    /// Currently connecting
    Connecting,
    /// Connected and ready
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
        }
    }
}

// =============================================================================
// Stream Parameters
// =============================================================================

/// Audio stream parameters handed down by the surrounding pipeline when it
/// starts. Explicit per-client configuration overrides these defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamParams {
    /// Pipeline input (microphone side) sample rate in Hz
    pub audio_in_sample_rate: u32,
    /// Pipeline output (TTS side) sample rate in Hz
    pub audio_out_sample_rate: u32,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            audio_in_sample_rate: 16000,
            audio_out_sample_rate: 24000,
        }
    }
}

// =============================================================================
// Status Events
// =============================================================================

/// A status notification received from the avatar service, forwarded upward
/// to the surrounding pipeline without further interpretation.
#[derive(Debug, Clone)]
pub struct AgentStatusEvent {
    /// Wire discriminator of the event (e.g. `agent.status`)
    pub event_type: String,
    /// Free-form event payload
    pub payload: serde_json::Value,
}

/// Callback type for agent status events.
pub type AgentStatusCallback =
    Arc<dyn Fn(AgentStatusEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

// =============================================================================
// Pipeline Hooks
// =============================================================================

/// Lifecycle and media hooks a pipeline invokes on an avatar client.
///
/// The surrounding pipeline drives the client exclusively through this trait,
/// which keeps the client decoupled from any specific event-bus or frame
/// mechanism. Implementations are not designed for concurrent overlapping
/// `on_audio` calls; callers serialize their invocations.
#[async_trait]
pub trait AvatarMediaSink: Send + Sync {
    /// Pipeline started: adopt stream parameters and open the media channel.
    async fn on_start(&mut self, params: StreamParams) -> AvatarResult<()>;

    /// Pipeline stopping: tear down channel and remote session.
    async fn on_stop(&mut self) -> AvatarResult<()>;

    /// One chunk of outbound speech audio.
    ///
    /// `event_id` identifies the logical utterance this chunk belongs to;
    /// `finish` marks its last chunk.
    async fn on_audio(
        &mut self,
        audio: &[u8],
        sample_rate: u32,
        event_id: &str,
        finish: bool,
    ) -> AvatarResult<()>;

    /// User interrupted the bot: stop current avatar activity.
    async fn on_interrupt(&mut self) -> AvatarResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Disconnected.to_string(), "Disconnected");
        assert_eq!(ConnectionState::Connecting.to_string(), "Connecting");
        assert_eq!(ConnectionState::Connected.to_string(), "Connected");
    }

    #[test]
    fn test_connection_state_default() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_error_display() {
        let err = AvatarError::SessionCreationFailed("boom".to_string());
        assert!(err.to_string().contains("Session creation failed"));

        let err = AvatarError::NotConnected;
        assert_eq!(err.to_string(), "Not connected");
    }

    #[test]
    fn test_stream_params_default() {
        let params = StreamParams::default();
        assert_eq!(params.audio_in_sample_rate, 16000);
        assert_eq!(params.audio_out_sample_rate, 24000);
    }
}
