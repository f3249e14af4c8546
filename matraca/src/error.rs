//! Error taxonomy for the narration pipeline.

use crate::tts::SynthesisError;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can end a narration job.
///
/// Validation variants are returned synchronously from job submission, before
/// any backend call. Synthesis and concatenation variants surface through the
/// job's single terminal error event.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("input text is empty")]
    EmptyText,

    #[error("input text exceeds the {max} character limit (got {len})")]
    TextTooLong { len: usize, max: usize },

    #[error("voice selection did not resolve to a service voice")]
    UnresolvedVoice,

    #[error("no speakable content after chunking")]
    NoContent,

    #[error("another narration job is already running")]
    Busy,

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("no audio segments to concatenate")]
    NoSegments,

    #[error("could not read audio segment {}: {source}", path.display())]
    SegmentRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("audio segment is empty: {}", .0.display())]
    EmptySegment(PathBuf),

    #[error("merged audio file is empty")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Whether this error is caught at submission time, before a worker is
    /// spawned or any artifact is created.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PipelineError::EmptyText
                | PipelineError::TextTooLong { .. }
                | PipelineError::UnresolvedVoice
                | PipelineError::NoContent
                | PipelineError::Busy
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
