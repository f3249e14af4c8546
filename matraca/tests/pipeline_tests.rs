//! End-to-end orchestration tests driving `Narrator` with a scripted
//! synthesis backend.

use async_trait::async_trait;
use matraca::error::PipelineError;
use matraca::pipeline::{JobEvent, JobRequest, Narrator};
use matraca::text;
use matraca::tts::{AudioSettings, SpeechSynthesizer, SynthesisError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::Receiver;
use tokio::sync::Semaphore;

/// ID3v2 header stub with synchsafe size zero, as the service emits on every
/// chunk response.
const ID3V2_STUB: [u8; 10] = [b'I', b'D', b'3', 4, 0, 0, 0, 0, 0, 0];

/// Audio payload bytes each mock synthesis writes after the header.
const MOCK_FRAME_BYTES: usize = 90;

/// A scripted synthesizer: writes a fixed-size fake MP3 per call and can be
/// told to fail one specific call with a transport error.
struct MockSynthesizer {
    calls: AtomicUsize,
    max_text_chars: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl MockSynthesizer {
    fn always_succeeds() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            max_text_chars: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    /// Fail the n-th synthesize call (1-based).
    fn fails_on_call(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            ..Self::always_succeeds()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn max_text_chars(&self) -> usize {
        self.max_text_chars.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        _voice_id: &str,
        _settings: &AudioSettings,
        output_path: &Path,
    ) -> Result<(), SynthesisError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_text_chars
            .fetch_max(text.chars().count(), Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(SynthesisError::Connection(
                "connection reset by peer".to_string(),
            ));
        }
        let mut bytes = ID3V2_STUB.to_vec();
        bytes.resize(bytes.len() + MOCK_FRAME_BYTES, 0xAD);
        tokio::fs::write(output_path, bytes).await?;
        Ok(())
    }
}

/// Wraps a mock so every call must first take a permit, letting tests hold a
/// job open while probing the busy guard.
struct GatedSynthesizer {
    gate: Arc<Semaphore>,
    inner: MockSynthesizer,
}

#[async_trait]
impl SpeechSynthesizer for GatedSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &AudioSettings,
        output_path: &Path,
    ) -> Result<(), SynthesisError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| SynthesisError::Connection("gate closed".to_string()))?;
        self.inner
            .synthesize(text, voice_id, settings, output_path)
            .await
    }
}

async fn collect_events(mut rx: Receiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

/// Text that splits into at least three chunks at a 200-character ceiling.
fn multi_chunk_text() -> (String, usize) {
    let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
    let total = text::split_text(&text, 200).len();
    assert!(total >= 3, "fixture must span several chunks, got {total}");
    (text, total)
}

fn request(text: String, destination: PathBuf) -> JobRequest {
    JobRequest {
        text,
        voice_id: "en-US-GuyNeural".to_string(),
        settings: AudioSettings::default(),
        destination,
    }
}

#[tokio::test]
async fn test_job_success_events_and_merged_output() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("narration.mp3");
    let (text, total) = multi_chunk_text();

    let mock = Arc::new(MockSynthesizer::always_succeeds());
    let narrator = Narrator::with_limits(mock.clone(), 120_000, 200);

    let rx = narrator.submit(request(text, destination.clone())).unwrap();
    let events = collect_events(rx).await;

    // The terminal event is last, and there is exactly one.
    let terminal: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminal.len(), 1);
    assert_eq!(events.last(), Some(&JobEvent::Done(destination.clone())));

    // Progress fractions never decrease and finish at 1.0.
    let fractions: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Progress(f) => Some(*f),
            _ => None,
        })
        .collect();
    assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(fractions.last(), Some(&1.0));

    // Every chunk was synthesized exactly once, in one in-flight call each.
    assert_eq!(mock.call_count(), total);

    // Header dedup: only the first segment's ID3v2 header survives.
    let expected = (ID3V2_STUB.len() + MOCK_FRAME_BYTES) + (total - 1) * MOCK_FRAME_BYTES;
    assert_eq!(
        std::fs::metadata(&destination).unwrap().len(),
        expected as u64
    );
}

#[tokio::test]
async fn test_synthesis_failure_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("narration.mp3");
    let (text, total) = multi_chunk_text();
    assert!(total >= 3);

    let mock = Arc::new(MockSynthesizer::fails_on_call(2));
    let narrator = Narrator::with_limits(mock.clone(), 120_000, 200);

    let rx = narrator.submit(request(text, destination.clone())).unwrap();
    let events = collect_events(rx).await;

    // One terminal error event, and it ends the stream.
    let errors: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, JobEvent::Error(_)))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(events.last().unwrap().is_terminal());
    assert!(!events.iter().any(|e| matches!(e, JobEvent::Done(_))));

    // Chunk 3 was never attempted and no partial output exists.
    assert_eq!(mock.call_count(), 2);
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_validation_rejects_before_any_backend_call() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockSynthesizer::always_succeeds());
    let narrator = Narrator::with_limits(mock.clone(), 100, 50);

    let empty = narrator.submit(request(String::new(), dir.path().join("a.mp3")));
    assert!(matches!(empty, Err(PipelineError::EmptyText)));

    let blank = narrator.submit(request("   \n ".to_string(), dir.path().join("b.mp3")));
    assert!(matches!(blank, Err(PipelineError::EmptyText)));

    let long = narrator.submit(request("x".repeat(101), dir.path().join("c.mp3")));
    assert!(matches!(
        long,
        Err(PipelineError::TextTooLong { len: 101, max: 100 })
    ));

    let mut no_voice = request("hello".to_string(), dir.path().join("d.mp3"));
    no_voice.voice_id = String::new();
    assert!(matches!(
        narrator.submit(no_voice),
        Err(PipelineError::UnresolvedVoice)
    ));

    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_second_submission_rejected_while_running() {
    let dir = TempDir::new().unwrap();
    let (text, total) = multi_chunk_text();

    let gate = Arc::new(Semaphore::new(0));
    let narrator = Narrator::with_limits(
        Arc::new(GatedSynthesizer {
            gate: Arc::clone(&gate),
            inner: MockSynthesizer::always_succeeds(),
        }),
        120_000,
        200,
    );

    let first = narrator
        .submit(request(text.clone(), dir.path().join("first.mp3")))
        .unwrap();

    // The slot is held until the first job reaches a terminal state.
    let second = narrator.submit(request(text.clone(), dir.path().join("second.mp3")));
    assert!(matches!(second, Err(PipelineError::Busy)));

    gate.add_permits(total);
    let events = collect_events(first).await;
    assert!(matches!(events.last(), Some(JobEvent::Done(_))));

    // Once the stream is drained the slot is free again.
    gate.add_permits(total);
    let third = narrator
        .submit(request(text, dir.path().join("third.mp3")))
        .unwrap();
    let events = collect_events(third).await;
    assert!(matches!(events.last(), Some(JobEvent::Done(_))));
}

#[tokio::test]
async fn test_preview_synthesizes_one_bounded_chunk() {
    let mock = Arc::new(MockSynthesizer::always_succeeds());
    let narrator = Narrator::new(mock.clone());

    // Far longer than the preview head; only the opening is narrated.
    let text = "all work and no play makes jack a dull boy ".repeat(100);
    let rx = narrator
        .preview(&text, "en-US-JennyNeural", &AudioSettings::default())
        .unwrap();
    let events = collect_events(rx).await;

    let Some(JobEvent::Done(path)) = events.last() else {
        panic!("preview should end with Done, got {:?}", events.last());
    };
    assert!(path.exists());
    assert_eq!(
        std::fs::metadata(path).unwrap().len(),
        (ID3V2_STUB.len() + MOCK_FRAME_BYTES) as u64
    );

    assert_eq!(mock.call_count(), 1);
    assert!(mock.max_text_chars() <= 450);

    // The artifact is the caller's to dispose of.
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn test_preview_failure_reports_single_error() {
    let mock = Arc::new(MockSynthesizer::fails_on_call(1));
    let narrator = Narrator::new(mock);

    let rx = narrator
        .preview(
            "a short line to audition",
            "en-US-JennyNeural",
            &AudioSettings::default(),
        )
        .unwrap();
    let events = collect_events(rx).await;

    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, JobEvent::Error(_)))
            .count(),
        1
    );
    assert!(events.last().unwrap().is_terminal());
}
