//! Speech synthesis contract: adapter trait, prosody settings, error taxonomy.

pub mod edge;

pub use edge::EdgeSpeechClient;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Prosody parameters in the signed-delta vocabulary the speech service
/// expects, e.g. `rate = "+0%"`, `volume = "-80%"`, `pitch = "+5Hz"`.
///
/// Built once per job from linear inputs and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    pub rate: String,
    pub volume: String,
    pub pitch: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self::new(1.0, 100.0, 0.0)
    }
}

impl AudioSettings {
    /// Map linear controls to service delta strings.
    ///
    /// * `rate_factor` - speaking rate multiplier in [0.25, 4.0]
    /// * `volume_pct` - volume percentage in [20, 200]
    /// * `pitch_hz` - pitch shift in [-20, +20] Hz
    ///
    /// Out-of-range values are clamped, never rejected.
    pub fn new(rate_factor: f32, volume_pct: f32, pitch_hz: f32) -> Self {
        let rate_pct = (rate_factor * 100.0).clamp(10.0, 400.0);
        Self {
            rate: pct_delta(rate_pct, -90, 200),
            volume: pct_delta(volume_pct, -90, 100),
            pitch: hz_delta(pitch_hz),
        }
    }
}

/// Format a percentage as a signed delta from 100%, clamped.
fn pct_delta(value_pct: f32, min: i32, max: i32) -> String {
    let delta = (value_pct - 100.0).round() as i32;
    format!("{:+}%", delta.clamp(min, max))
}

/// Format a pitch shift as a signed Hz delta, clamped to +/-20.
fn hz_delta(hz: f32) -> String {
    let hz = hz.round() as i32;
    format!("{:+}Hz", hz.clamp(-20, 20))
}

/// Failures a synthesis backend must classify its errors into.
///
/// The pipeline does not retry; any variant aborts the running job.
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("connection to speech service failed: {0}")]
    Connection(String),

    #[error("speech service error: {0}")]
    Protocol(String),

    #[error("invalid synthesis argument: {0}")]
    InvalidArgument(String),

    #[error("failed to write audio chunk: {0}")]
    Io(#[from] std::io::Error),
}

/// Speech synthesis backend - turns one chunk of text into an MP3 file.
///
/// Implementations must write a complete, correctly terminated MP3 container
/// to `output_path`; the pipeline concatenates those containers byte-wise and
/// never parses them.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &AudioSettings,
        output_path: &Path,
    ) -> Result<(), SynthesisError>;
}
