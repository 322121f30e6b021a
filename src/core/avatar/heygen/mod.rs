//! HeyGen streaming avatar integration.
//!
//! This module provides a real-time media client for HeyGen's interactive
//! avatar service with support for:
//!
//! - Session lifecycle over the REST API (create, start, close)
//! - A persistent WebSocket control channel with a supervised receive loop
//! - Outbound audio resampling to the service's fixed 24 kHz rate
//! - Duration-based buffering with commit/clear flush policy
//! - Avatar control messages (interrupt, listening animations)
//!
//! # Architecture
//!
//! The module is organized into focused submodules:
//!
//! - [`config`]: Configuration types and service constants
//! - [`messages`]: Session API and realtime wire message types
//! - `api`: The `HeyGenApi` session management client
//! - `channel`: The `RealtimeChannel` WebSocket connection
//! - `client`: The `HeyGenClient` orchestrator the pipeline drives
//!
//! # Audio Format
//!
//! The realtime endpoint consumes PCM 16-bit signed little-endian mono audio
//! at 24 kHz, base64-encoded into `agent.audio_buffer_append` messages.
//! Incoming pipeline audio at any other rate is stream-resampled first.
//!
//! # Lifecycle
//!
//! ```text
//! setup()  -> create + start session         (UNINITIALIZED -> SESSION_READY)
//! start()  -> connect realtime channel       (SESSION_READY -> CONNECTED)
//! ...        send_audio / interrupt / listening toggles
//! stop()   -> disconnect + close session     (-> TORN_DOWN, idempotent)
//! ```

mod api;
mod channel;
mod client;
pub mod config;
pub mod messages;

#[cfg(test)]
mod tests;

// Re-export public types
pub use api::HeyGenApi;
pub use channel::RealtimeChannel;
pub use client::{HeyGenClient, MAX_BUFFER_DURATION_MS, MIN_COMMIT_DURATION_MS};
pub use config::{
    DEFAULT_AVATAR_NAME, DEFAULT_AVATAR_VERSION, HEYGEN_API_BASE_URL, HEYGEN_SAMPLE_RATE,
    HeyGenConfig,
};
pub use messages::{
    AgentStatusMessage, ClientEvent, HeyGenSession, NewSessionRequest, ServerEvent,
    deserialize_server_event, serialize_client_event,
};
