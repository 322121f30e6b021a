pub mod audio;
pub mod avatar;

// Re-export commonly used types for convenience
pub use audio::{StreamResampler, duration_ms, f32_to_pcm16, pcm16_to_f32};

pub use avatar::{
    AgentStatusCallback, AgentStatusEvent, AvatarError, AvatarMediaSink, AvatarResult,
    ConnectionState, HeyGenApi, HeyGenClient, HeyGenConfig, HeyGenSession, RealtimeChannel,
    StreamParams,
};
