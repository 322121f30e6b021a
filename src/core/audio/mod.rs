//! PCM audio helpers and stream resampling.
//!
//! All audio handled by this crate is PCM 16-bit signed little-endian, mono.
//! The [`StreamResampler`] converts a continuous stream of arbitrarily-sized
//! chunks between sample rates while keeping the interpolation filter state
//! alive across calls, so chunk boundaries do not produce audible
//! discontinuities.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use tracing::trace;

use crate::core::avatar::{AvatarError, AvatarResult};

/// Bytes per PCM 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Number of input frames fed to the inner resampler per processing step.
///
/// At 24 kHz this is ~21 ms of audio, small enough that the FIFO never holds
/// back a meaningful amount of speech between calls.
const RESAMPLER_CHUNK_SIZE: usize = 512;

/// Converts PCM 16-bit little-endian bytes to normalized f32 samples.
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|chunk| {
            let v = i16::from_le_bytes([chunk[0], chunk[1]]);
            (v as f32 / 32768.0).clamp(-1.0, 1.0)
        })
        .collect()
}

/// Converts normalized f32 samples to PCM 16-bit little-endian bytes.
pub fn f32_to_pcm16(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&sample| {
            let v = (sample * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
            v.to_le_bytes()
        })
        .collect()
}

/// Duration in milliseconds of a PCM 16-bit mono byte buffer.
pub fn duration_ms(byte_len: usize, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    let num_samples = byte_len as f64 / BYTES_PER_SAMPLE as f64;
    num_samples / sample_rate as f64 * 1000.0
}

/// Stateful sample-rate converter for a continuous PCM stream.
///
/// The inner `rubato` resampler consumes fixed-size input frames, so incoming
/// chunks are queued in a FIFO and processed whole frames at a time; any
/// remainder stays queued for the next call. The inner resampler is only
/// rebuilt when the `(source, target)` rate pair changes, which preserves
/// filter state across calls on a steady stream.
pub struct StreamResampler {
    inner: Option<FastFixedIn<f32>>,
    rates: Option<(u32, u32)>,
    pending: Vec<f32>,
    chunk_size: usize,
}

impl StreamResampler {
    /// Create a resampler with the default processing chunk size.
    pub fn new() -> Self {
        Self {
            inner: None,
            rates: None,
            pending: Vec::new(),
            chunk_size: RESAMPLER_CHUNK_SIZE,
        }
    }

    /// Convert a PCM 16-bit chunk from `source_rate` to `target_rate`.
    ///
    /// Equal rates pass the input through untouched. Otherwise the returned
    /// buffer holds as many converted samples as whole internal frames were
    /// available; the tail remains queued and is emitted by later calls.
    pub fn resample(
        &mut self,
        audio: &[u8],
        source_rate: u32,
        target_rate: u32,
    ) -> AvatarResult<Vec<u8>> {
        if source_rate == 0 || target_rate == 0 {
            return Err(AvatarError::InvalidConfiguration(format!(
                "invalid sample rates: {source_rate} -> {target_rate}"
            )));
        }
        if source_rate == target_rate || audio.is_empty() {
            return Ok(audio.to_vec());
        }

        if self.rates != Some((source_rate, target_rate)) {
            let ratio = target_rate as f64 / source_rate as f64;
            let resampler =
                FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Cubic, self.chunk_size, 1)
                    .map_err(|e| AvatarError::AudioProcessingError(e.to_string()))?;
            self.inner = Some(resampler);
            self.rates = Some((source_rate, target_rate));
            self.pending.clear();
        }

        self.pending.extend(pcm16_to_f32(audio));

        let Some(resampler) = self.inner.as_mut() else {
            return Ok(Vec::new());
        };

        let mut output: Vec<f32> = Vec::new();
        while self.pending.len() >= self.chunk_size {
            let frame: Vec<f32> = self.pending.drain(..self.chunk_size).collect();
            let produced = resampler
                .process(&[frame], None)
                .map_err(|e| AvatarError::AudioProcessingError(e.to_string()))?;
            output.extend_from_slice(&produced[0]);
        }

        trace!(
            queued = self.pending.len(),
            produced = output.len(),
            "resampled audio chunk"
        );
        Ok(f32_to_pcm16(&output))
    }

    /// Drop all queued samples and filter state.
    pub fn reset(&mut self) {
        self.inner = None;
        self.rates = None;
        self.pending.clear();
    }

    /// Number of input samples queued waiting for a whole processing frame.
    pub fn queued_samples(&self) -> usize {
        self.pending.len()
    }
}

impl Default for StreamResampler {
    fn default() -> Self {
        Self::new()
    }
}
