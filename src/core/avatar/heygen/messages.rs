//! HeyGen wire message types.
//!
//! Two surfaces live here:
//!
//! - The session management REST API (`/v1/streaming.new`, `.start`, `.stop`)
//!   request/response types.
//! - The realtime WebSocket protocol: JSON objects with a `type`
//!   discriminator and a per-message `event_id`.
//!
//! # Realtime Protocol Overview
//!
//! Client events (sent to server):
//! - `agent.interrupt` - stop current avatar action, return to idle
//! - `agent.start_listening` - play listening animation
//! - `agent.stop_listening` - stop listening animation
//! - `agent.audio_buffer_append` - append base64 PCM to the server buffer
//! - `agent.audio_buffer_clear` - discard the server buffer
//! - `agent.audio_buffer_commit` - flush the server buffer for playback
//!
//! Server events (received from server):
//! - `agent.status` - avatar status notification
//!
//! Every outbound message carries a fresh transport-level `event_id` (UUID
//! v4); the logical utterance id supplied by the pipeline is tracked by the
//! client, not written to the wire.

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Session API
// =============================================================================

/// Request body for `/v1/streaming.new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionRequest {
    /// Interactive avatar name
    #[serde(rename = "avatarName")]
    pub avatar_name: String,
    /// Streaming protocol version
    pub version: String,
}

/// A live avatar session returned by `/v1/streaming.new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeyGenSession {
    /// Server-assigned session identifier
    pub session_id: String,
    /// WebSocket URI for the realtime control channel
    pub realtime_endpoint: String,
    /// Media server URL (unused by this client, kept for diagnostics)
    #[serde(default)]
    pub url: Option<String>,
    /// Media access token (unused by this client, kept for diagnostics)
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Request body for `/v1/streaming.start` and `/v1/streaming.stop`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionIdRequest {
    /// Target session
    pub session_id: String,
}

/// Response envelope wrapping all session API payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct ApiEnvelope<T> {
    /// Provider status code
    #[serde(default)]
    pub code: Option<i64>,
    /// Human-readable status message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload, absent on some failures
    #[serde(default)]
    pub data: Option<T>,
}

// =============================================================================
// Realtime Client Events (sent to server)
// =============================================================================

/// Placeholder audio payload carried by commit messages.
const COMMIT_AUDIO_PLACEHOLDER: &[u8] = b"\x00";

/// Client events sent over the realtime channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Stop the avatar's current task and return to idle
    #[serde(rename = "agent.interrupt")]
    Interrupt {
        /// Transport message id
        event_id: String,
    },

    /// Trigger the avatar's listening animation
    #[serde(rename = "agent.start_listening")]
    StartListening {
        /// Transport message id
        event_id: String,
    },

    /// Stop the listening animation
    #[serde(rename = "agent.stop_listening")]
    StopListening {
        /// Transport message id
        event_id: String,
    },

    /// Append audio to the server-side buffer
    #[serde(rename = "agent.audio_buffer_append")]
    AudioBufferAppend {
        /// Transport message id
        event_id: String,
        /// Base64-encoded PCM 16-bit audio
        audio: String,
    },

    /// Discard the server-side buffer without playing it
    #[serde(rename = "agent.audio_buffer_clear")]
    AudioBufferClear {
        /// Transport message id
        event_id: String,
    },

    /// Flush the server-side buffer for playback
    #[serde(rename = "agent.audio_buffer_commit")]
    AudioBufferCommit {
        /// Transport message id
        event_id: String,
        /// Single-null-byte placeholder the endpoint requires
        audio: String,
    },
}

fn new_event_id() -> String {
    Uuid::new_v4().to_string()
}

impl ClientEvent {
    /// Build an interrupt event with a fresh transport id.
    pub fn interrupt() -> Self {
        ClientEvent::Interrupt {
            event_id: new_event_id(),
        }
    }

    /// Build a start-listening event with a fresh transport id.
    pub fn start_listening() -> Self {
        ClientEvent::StartListening {
            event_id: new_event_id(),
        }
    }

    /// Build a stop-listening event with a fresh transport id.
    pub fn stop_listening() -> Self {
        ClientEvent::StopListening {
            event_id: new_event_id(),
        }
    }

    /// Build an audio append event from raw PCM bytes.
    pub fn audio_buffer_append(audio: &[u8]) -> Self {
        ClientEvent::AudioBufferAppend {
            event_id: new_event_id(),
            audio: BASE64_STANDARD.encode(audio),
        }
    }

    /// Build a buffer clear event with a fresh transport id.
    pub fn audio_buffer_clear() -> Self {
        ClientEvent::AudioBufferClear {
            event_id: new_event_id(),
        }
    }

    /// Build a buffer commit event with a fresh transport id.
    pub fn audio_buffer_commit() -> Self {
        ClientEvent::AudioBufferCommit {
            event_id: new_event_id(),
            audio: BASE64_STANDARD.encode(COMMIT_AUDIO_PLACEHOLDER),
        }
    }

    /// Wire discriminator of this event, for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::Interrupt { .. } => "agent.interrupt",
            ClientEvent::StartListening { .. } => "agent.start_listening",
            ClientEvent::StopListening { .. } => "agent.stop_listening",
            ClientEvent::AudioBufferAppend { .. } => "agent.audio_buffer_append",
            ClientEvent::AudioBufferClear { .. } => "agent.audio_buffer_clear",
            ClientEvent::AudioBufferCommit { .. } => "agent.audio_buffer_commit",
        }
    }

    /// Transport message id of this event.
    pub fn event_id(&self) -> &str {
        match self {
            ClientEvent::Interrupt { event_id }
            | ClientEvent::StartListening { event_id }
            | ClientEvent::StopListening { event_id }
            | ClientEvent::AudioBufferAppend { event_id, .. }
            | ClientEvent::AudioBufferClear { event_id }
            | ClientEvent::AudioBufferCommit { event_id, .. } => event_id,
        }
    }
}

// =============================================================================
// Realtime Server Events (received from server)
// =============================================================================

/// Payload of an `agent.status` notification. The field set is not part of
/// any published contract, so everything is captured loosely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStatusMessage {
    /// Transport message id, when present
    #[serde(default)]
    pub event_id: Option<String>,
    /// Remaining free-form fields
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Server events received over the realtime channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Avatar status notification
    #[serde(rename = "agent.status")]
    AgentStatus(AgentStatusMessage),

    /// Unknown message type (for forward compatibility).
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Serialization Helpers
// =============================================================================

/// Serialize a client event to its JSON wire form.
pub fn serialize_client_event(event: &ClientEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

/// Deserialize a server event from its JSON wire form.
pub fn deserialize_server_event(json: &str) -> Result<ServerEvent, serde_json::Error> {
    serde_json::from_str(json)
}
