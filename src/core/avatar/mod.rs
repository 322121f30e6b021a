//! Real-time avatar media clients.
//!
//! An avatar provider renders a talking video persona for a voice bot. The
//! client here manages the remote session's lifecycle, streams buffered
//! audio to it over a persistent channel and forwards its status events
//! upward. The conversational pipeline (STT -> LLM -> TTS) stays outside
//! this module and drives a client through the [`AvatarMediaSink`] trait.
//!
//! # Supported Providers
//!
//! - **HeyGen** - interactive streaming avatars ([`heygen`])
//!
//! # Example
//!
//! ```rust,ignore
//! use avatar_gateway::core::avatar::{AvatarMediaSink, StreamParams};
//! use avatar_gateway::core::avatar::heygen::{HeyGenClient, HeyGenConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = HeyGenClient::new(HeyGenConfig::new("your-api-key"))?;
//!     client.setup().await?;
//!     client.on_start(StreamParams::default()).await?;
//!     client.on_audio(&chunk, 16000, "utt-1", false).await?;
//!     client.on_stop().await?;
//!     Ok(())
//! }
//! ```

mod base;
pub mod heygen;

pub use base::{
    AgentStatusCallback, AgentStatusEvent, AvatarError, AvatarMediaSink, AvatarResult,
    ConnectionState, StreamParams,
};
pub use heygen::{HeyGenApi, HeyGenClient, HeyGenConfig, HeyGenSession, RealtimeChannel};
