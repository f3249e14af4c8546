//! Narration pipeline: chunking, sequential synthesis, final assembly.
//!
//! One [`Narrator`] owns a synthesis backend and runs at most one job at a
//! time. A job moves through chunking, per-chunk synthesis, and concatenation
//! on a background task, reporting through an ordered event channel; every
//! intermediate artifact lives in a job-scoped temp directory that is removed
//! on success and failure alike.

mod events;

pub use events::{JobEvent, JobRequest};

use crate::audio;
use crate::config;
use crate::error::{PipelineError, Result};
use crate::text::{self, TextChunk};
use crate::tts::{AudioSettings, SpeechSynthesizer};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::Builder;
use tokio::sync::mpsc;

/// How many characters of the input a preview narrates.
const PREVIEW_CHARS: usize = 450;

/// Event buffer length before the worker awaits the consumer.
const EVENT_BUFFER: usize = 64;

/// Releases the single-job slot when the job ends, on every exit path.
struct JobGuard(Arc<AtomicBool>);

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates narration jobs over a synthesis backend.
pub struct Narrator {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    max_input_chars: usize,
    chunk_chars: usize,
    busy: Arc<AtomicBool>,
}

impl Narrator {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self::with_limits(
            synthesizer,
            config::MAX_INPUT_CHARS,
            text::DEFAULT_CHUNK_CHARS,
        )
    }

    pub fn with_limits(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        max_input_chars: usize,
        chunk_chars: usize,
    ) -> Self {
        Self {
            synthesizer,
            max_input_chars,
            chunk_chars,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Submit a narration job.
    ///
    /// Validation failures (empty or overlong text, unresolved voice, no
    /// speakable content, a job already running) are returned directly and
    /// nothing is spawned. Otherwise the returned receiver yields status and
    /// progress events in order, ending with exactly one [`JobEvent::Done`]
    /// or [`JobEvent::Error`].
    pub fn submit(&self, request: JobRequest) -> Result<mpsc::Receiver<JobEvent>> {
        let guard = self.acquire()?;
        self.validate(&request.text, &request.voice_id)?;

        let chunks = text::split_text(&request.text, self.chunk_chars);
        if chunks.is_empty() {
            return Err(PipelineError::NoContent);
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let synthesizer = Arc::clone(&self.synthesizer);
        tokio::spawn(async move {
            let _guard = guard;
            match run_job(synthesizer.as_ref(), &chunks, &request, &tx).await {
                Ok(path) => {
                    let _ = tx.send(JobEvent::Done(path)).await;
                }
                Err(e) => {
                    warn!("narration job failed: {e}");
                    let _ = tx
                        .send(JobEvent::Error(format!("failed to generate audio: {e}")))
                        .await;
                }
            }
        });
        Ok(rx)
    }

    /// Narrate just the head of the input and hand the artifact to the caller.
    ///
    /// Takes the first [`PREVIEW_CHARS`] characters as a single chunk and
    /// synthesizes it into a kept temporary file; `Done` carries that file's
    /// path. The caller owns the file - nothing is renamed to a destination.
    pub fn preview(
        &self,
        text: &str,
        voice_id: &str,
        settings: &AudioSettings,
    ) -> Result<mpsc::Receiver<JobEvent>> {
        let guard = self.acquire()?;
        self.validate(text, voice_id)?;

        let head: String = text.trim().chars().take(PREVIEW_CHARS).collect();
        let Some(chunk) = text::split_text(&head, self.chunk_chars).into_iter().next() else {
            return Err(PipelineError::NoContent);
        };

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let synthesizer = Arc::clone(&self.synthesizer);
        let voice_id = voice_id.to_string();
        let settings = settings.clone();
        tokio::spawn(async move {
            let _guard = guard;
            match run_preview(synthesizer.as_ref(), &chunk, &voice_id, &settings, &tx).await {
                Ok(path) => {
                    let _ = tx.send(JobEvent::Done(path)).await;
                }
                Err(e) => {
                    warn!("preview failed: {e}");
                    let _ = tx
                        .send(JobEvent::Error(format!("failed to generate preview: {e}")))
                        .await;
                }
            }
        });
        Ok(rx)
    }

    /// Claim the single-job slot or report that one is already running.
    fn acquire(&self) -> Result<JobGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PipelineError::Busy);
        }
        Ok(JobGuard(Arc::clone(&self.busy)))
    }

    fn validate(&self, text: &str, voice_id: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText);
        }
        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(PipelineError::TextTooLong {
                len,
                max: self.max_input_chars,
            });
        }
        if voice_id.trim().is_empty() {
            return Err(PipelineError::UnresolvedVoice);
        }
        Ok(())
    }
}

/// Synthesize every chunk in order, then merge into the destination.
async fn run_job(
    synthesizer: &dyn SpeechSynthesizer,
    chunks: &[TextChunk],
    request: &JobRequest,
    tx: &mpsc::Sender<JobEvent>,
) -> Result<PathBuf> {
    let total = chunks.len();
    send(tx, JobEvent::Status(format!("Starting: {total} chunk(s)"))).await;
    send(tx, JobEvent::Progress(0.0)).await;

    // All per-chunk artifacts live here; dropping the handle removes the
    // directory on every exit path.
    let workdir = Builder::new().prefix("matraca_chunks_").tempdir()?;
    let mut segments = Vec::with_capacity(total);

    for chunk in chunks {
        send(
            tx,
            JobEvent::Status(format!("Converting chunk {}/{total}", chunk.index)),
        )
        .await;
        let segment = workdir.path().join(format!("chunk_{:04}.mp3", chunk.index));
        synthesizer
            .synthesize(&chunk.content, &request.voice_id, &request.settings, &segment)
            .await?;
        segments.push(segment);
        send(tx, JobEvent::Progress(chunk.index as f32 / total as f32)).await;
    }

    send(tx, JobEvent::Status("Merging chunks into one file".to_string())).await;
    audio::concatenate_mp3(&segments, &request.destination)?;
    info!(
        "narration complete: {} chunk(s) -> {}",
        total,
        request.destination.display()
    );
    Ok(request.destination.clone())
}

/// Synthesize a single preview chunk into a kept temporary file.
async fn run_preview(
    synthesizer: &dyn SpeechSynthesizer,
    chunk: &TextChunk,
    voice_id: &str,
    settings: &AudioSettings,
    tx: &mpsc::Sender<JobEvent>,
) -> Result<PathBuf> {
    send(tx, JobEvent::Status("Generating preview".to_string())).await;

    let file = Builder::new()
        .prefix("matraca_preview_")
        .suffix(".mp3")
        .tempfile()?;
    synthesizer
        .synthesize(&chunk.content, voice_id, settings, file.path())
        .await?;

    // The artifact outlives the job: the caller plays and disposes of it.
    let path = file
        .into_temp_path()
        .keep()
        .map_err(|e| PipelineError::Io(e.error))?;
    send(tx, JobEvent::Progress(1.0)).await;
    Ok(path)
}

async fn send(tx: &mpsc::Sender<JobEvent>, event: JobEvent) {
    // A dropped receiver only means nobody is listening anymore.
    let _ = tx.send(event).await;
}
