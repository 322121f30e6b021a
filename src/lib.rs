//! Real-time avatar media gateway.
//!
//! Building blocks for voice bots that render a live video avatar: session
//! management against the avatar provider's REST API, streaming audio
//! resampling and buffering, and a persistent WebSocket channel for control
//! messages and status events.

pub mod core;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::*;
pub use crate::utils::Watchdog;
