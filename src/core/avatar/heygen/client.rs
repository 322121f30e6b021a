//! HeyGen avatar client orchestrator.
//!
//! Composes the session API, the realtime channel and the audio pipeline
//! pieces (resampler + buffer accumulator) behind the lifecycle surface the
//! surrounding pipeline drives: `setup`, `start`, `send_audio`, `interrupt`,
//! listening toggles, `stop`.
//!
//! # Example
//!
//! ```rust,ignore
//! use avatar_gateway::core::avatar::heygen::{HeyGenClient, HeyGenConfig};
//! use avatar_gateway::core::avatar::StreamParams;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = HeyGenClient::new(HeyGenConfig::new("your-api-key"))?;
//!     client.setup().await?;
//!     client.start(StreamParams::default()).await?;
//!
//!     // Pipeline delivers TTS audio chunks:
//!     client.send_audio(&audio, 16000, "utterance-1", false).await?;
//!     client.send_audio(&tail, 16000, "utterance-1", true).await?;
//!
//!     client.stop().await;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};

use super::api::HeyGenApi;
use super::channel::RealtimeChannel;
use super::config::{HEYGEN_SAMPLE_RATE, HeyGenConfig};
use super::messages::{ClientEvent, HeyGenSession, NewSessionRequest};
use crate::core::audio::{StreamResampler, duration_ms};
use crate::core::avatar::base::{
    AgentStatusCallback, AvatarError, AvatarMediaSink, AvatarResult, ConnectionState, StreamParams,
};

// =============================================================================
// Flush Policy
// =============================================================================

/// Buffers shorter than this at utterance end are discarded instead of
/// played; such a short tail would only produce a jarring blip.
pub const MIN_COMMIT_DURATION_MS: f64 = 80.0;

/// Buffered audio is committed for playback once it exceeds this, bounding
/// added latency while keeping per-message overhead down.
pub const MAX_BUFFER_DURATION_MS: f64 = 1000.0;

/// Outcome of the flush decision after appending a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushAction {
    /// Keep accumulating
    None,
    /// Flush the remote buffer for playback
    Commit,
    /// Discard the remote buffer
    Clear,
}

/// Tracks how much avatar-rate audio has been appended since the last flush.
///
/// The counter is an explicit field mutated only here; it is reset to zero
/// after every commit or clear and never goes negative.
#[derive(Debug, Default)]
pub(crate) struct AudioBufferAccumulator {
    buffered_ms: f64,
}

impl AudioBufferAccumulator {
    /// Record an appended chunk's duration.
    pub(crate) fn append(&mut self, chunk_ms: f64) {
        self.buffered_ms += chunk_ms;
    }

    /// Decide what to do with the remote buffer after an append.
    ///
    /// The arms are exclusive: a sub-threshold `finish` buffer is cleared,
    /// never cleared and then also committed.
    pub(crate) fn decide(&self, finish: bool) -> FlushAction {
        if finish && self.buffered_ms < MIN_COMMIT_DURATION_MS {
            FlushAction::Clear
        } else if finish || self.buffered_ms > MAX_BUFFER_DURATION_MS {
            FlushAction::Commit
        } else {
            FlushAction::None
        }
    }

    /// Reset after a commit or clear.
    pub(crate) fn reset(&mut self) {
        self.buffered_ms = 0.0;
    }

    /// Accumulated duration since the last flush, in milliseconds.
    pub(crate) fn buffered_ms(&self) -> f64 {
        self.buffered_ms
    }
}

// =============================================================================
// HeyGen Client
// =============================================================================

/// Real-time HeyGen avatar media client.
///
/// One client owns at most one live avatar session and one realtime channel.
/// Lifecycle methods are invoked sequentially by a single caller; the only
/// concurrent activity is the channel's background receive task, which never
/// mutates session or channel identity.
pub struct HeyGenClient {
    api: HeyGenApi,
    config: HeyGenConfig,
    session: Option<HeyGenSession>,
    channel: RealtimeChannel,
    resampler: StreamResampler,
    accumulator: AudioBufferAccumulator,
    in_sample_rate: u32,
    out_sample_rate: u32,
    last_utterance_id: Option<String>,
}

impl HeyGenClient {
    /// Create a client from configuration. Fails on invalid configuration.
    pub fn new(config: HeyGenConfig) -> AvatarResult<Self> {
        config
            .validate()
            .map_err(AvatarError::InvalidConfiguration)?;

        let api = HeyGenApi::from_config(&config)?;
        let channel = RealtimeChannel::new(Duration::from_secs(config.connection_timeout_seconds));

        Ok(Self {
            api,
            config,
            session: None,
            channel,
            resampler: StreamResampler::new(),
            accumulator: AudioBufferAccumulator::default(),
            in_sample_rate: 0,
            out_sample_rate: 0,
            last_utterance_id: None,
        })
    }

    /// Register the callback invoked for avatar status notifications.
    pub fn on_agent_status(&mut self, callback: AgentStatusCallback) {
        self.channel.on_agent_status(callback);
    }

    async fn initialize(&mut self) -> AvatarResult<()> {
        let session = self
            .api
            .new_session(NewSessionRequest {
                avatar_name: self.config.avatar_name.clone(),
                version: self.config.avatar_version.clone(),
            })
            .await?;
        debug!(
            session_id = %session.session_id,
            endpoint = %session.realtime_endpoint,
            "created avatar session"
        );

        // Record the session before activation so a failed start still gets
        // closed by the cleanup path.
        let session_id = session.session_id.clone();
        self.session = Some(session);

        self.api.start_session(&session_id).await?;
        info!("avatar session started");
        Ok(())
    }

    /// Create and activate the remote session.
    ///
    /// Idempotent: a second call while a session exists is a logged no-op.
    /// On any failure the client runs full cleanup (closing a
    /// partially-created session) before propagating the error.
    pub async fn setup(&mut self) -> AvatarResult<()> {
        if self.session.is_some() {
            debug!("avatar session already initialized");
            return Ok(());
        }

        match self.initialize().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("failed to set up avatar client: {e}");
                self.cleanup().await;
                Err(e)
            }
        }
    }

    /// Adopt stream parameters and open the realtime channel.
    ///
    /// Explicit config sample rates take precedence over the pipeline
    /// defaults carried by `params`. Channel connection failures are logged
    /// and absorbed; a missing session is an error.
    pub async fn start(&mut self, params: StreamParams) -> AvatarResult<()> {
        info!("avatar client starting");
        self.in_sample_rate = self
            .config
            .audio_in_sample_rate
            .unwrap_or(params.audio_in_sample_rate);
        self.out_sample_rate = self
            .config
            .audio_out_sample_rate
            .unwrap_or(params.audio_out_sample_rate);

        let endpoint = match self.session.as_ref() {
            Some(session) => session.realtime_endpoint.clone(),
            None => {
                return Err(AvatarError::SessionError(
                    "start called before setup".to_string(),
                ));
            }
        };

        self.channel.connect(&endpoint).await;
        Ok(())
    }

    /// Stop the avatar's current task and return it to idle.
    ///
    /// Fire-and-forget: failures are logged, never propagated.
    pub async fn interrupt(&mut self) {
        if let Err(e) = self.channel.send(ClientEvent::interrupt()).await {
            warn!("failed to send interrupt: {e}");
        }
    }

    /// Trigger the avatar's listening animation.
    pub async fn start_agent_listening(&mut self) {
        if let Err(e) = self.channel.send(ClientEvent::start_listening()).await {
            warn!("failed to send start-listening: {e}");
        }
    }

    /// Stop the listening animation.
    pub async fn stop_agent_listening(&mut self) {
        if let Err(e) = self.channel.send(ClientEvent::stop_listening()).await {
            warn!("failed to send stop-listening: {e}");
        }
    }

    /// Resample one chunk to the avatar rate, append it to the remote buffer
    /// and apply the flush policy.
    ///
    /// `event_id` is the logical utterance id from the pipeline; each wire
    /// message still carries its own fresh transport id. Send failures on
    /// this path propagate so the caller can stop streaming.
    pub async fn send_audio(
        &mut self,
        audio: &[u8],
        sample_rate: u32,
        event_id: &str,
        finish: bool,
    ) -> AvatarResult<()> {
        let resampled = self
            .resampler
            .resample(audio, sample_rate, HEYGEN_SAMPLE_RATE)?;
        self.last_utterance_id = Some(event_id.to_string());

        if !resampled.is_empty() {
            self.accumulator
                .append(duration_ms(resampled.len(), HEYGEN_SAMPLE_RATE));
            self.channel
                .send(ClientEvent::audio_buffer_append(&resampled))
                .await?;
        } else {
            trace!(
                utterance_id = event_id,
                "chunk below resampler frame size, queued"
            );
        }

        match self.accumulator.decide(finish) {
            FlushAction::Clear => {
                debug!(
                    utterance_id = event_id,
                    buffered_ms = self.accumulator.buffered_ms(),
                    "discarding sub-threshold audio buffer"
                );
                self.channel.send(ClientEvent::audio_buffer_clear()).await?;
                self.accumulator.reset();
            }
            FlushAction::Commit => {
                info!(
                    utterance_id = event_id,
                    "committing audio buffer: {:.2}ms",
                    self.accumulator.buffered_ms()
                );
                self.channel
                    .send(ClientEvent::audio_buffer_commit())
                    .await?;
                self.accumulator.reset();
            }
            FlushAction::None => {}
        }

        Ok(())
    }

    /// Disconnect the channel and release the remote session.
    ///
    /// Fully idempotent; a second call performs no further remote work.
    pub async fn stop(&mut self) {
        info!("avatar client stopping");
        self.channel.disconnect().await;
        self.cleanup().await;
    }

    /// Close the session if one is open and reset all transient state.
    ///
    /// Never fails: teardown errors are logged so pipeline shutdown is not
    /// blocked by avatar-service failures. Safe to call when nothing was
    /// ever set up.
    pub async fn cleanup(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = self.api.close_session(&session.session_id).await {
                warn!("failed to close avatar session: {e}");
            }
        }
        self.accumulator.reset();
        self.resampler.reset();
        self.last_utterance_id = None;
    }

    /// The input sample rate in Hz adopted at `start`.
    pub fn in_sample_rate(&self) -> u32 {
        self.in_sample_rate
    }

    /// The output sample rate in Hz adopted at `start`.
    pub fn out_sample_rate(&self) -> u32 {
        self.out_sample_rate
    }

    /// Current realtime channel state.
    pub fn connection_state(&self) -> ConnectionState {
        self.channel.state()
    }

    /// Session identifier of the live session, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    /// Logical utterance id of the most recent `send_audio` call.
    pub fn last_utterance_id(&self) -> Option<&str> {
        self.last_utterance_id.as_deref()
    }

    /// Accumulated un-flushed audio duration in milliseconds.
    pub fn buffered_audio_duration_ms(&self) -> f64 {
        self.accumulator.buffered_ms()
    }
}

#[async_trait]
impl AvatarMediaSink for HeyGenClient {
    async fn on_start(&mut self, params: StreamParams) -> AvatarResult<()> {
        self.start(params).await
    }

    async fn on_stop(&mut self) -> AvatarResult<()> {
        self.stop().await;
        Ok(())
    }

    async fn on_audio(
        &mut self,
        audio: &[u8],
        sample_rate: u32,
        event_id: &str,
        finish: bool,
    ) -> AvatarResult<()> {
        self.send_audio(audio, sample_rate, event_id, finish).await
    }

    async fn on_interrupt(&mut self) -> AvatarResult<()> {
        self.interrupt().await;
        Ok(())
    }
}
