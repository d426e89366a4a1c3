//! Single-worker FIFO admission queue for transcription calls.
//!
//! ```text
//! submit()/enqueue() ─► bounded mpsc ─► worker task (one job at a time)
//!                                   │
//!                          spawn_blocking(backend.transcribe)
//!                                   │ transient error?
//!                                   ├─► sleep(backoff + jitter), retry
//!                                   ▼
//!                           oneshot ─► PendingTranscription
//! ```
//!
//! Third-party recognizers degrade under concurrent load, so the queue caps
//! backend concurrency at exactly one. Utterance order does not matter for
//! correctness; the cap does. Admission is bounded too: once
//! [`QUEUE_CAPACITY`] clips are waiting, `enqueue` waits for the worker.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{AudioClip, BackendHandle, Transcription};
use crate::error::{Result, TallyError};

/// Clips that may wait behind the running job before `enqueue` blocks.
pub const QUEUE_CAPACITY: usize = 32;

/// Bounded exponential backoff with jitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct RetryPolicy {
    /// Total backend calls per job, including the first. Default: 3.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt. Default: 500 ms.
    pub base_delay_ms: u64,
    /// Ceiling for the doubled delay. Default: 8 s.
    pub max_delay_ms: u64,
    /// Upper bound of the uniform random jitter added to every delay.
    /// Default: 1 s.
    pub max_jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 8_000,
            max_jitter_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the delay after failed attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let ms = self
            .base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    /// `backoff(attempt)` plus uniform jitter in `[0, max_jitter_ms]`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter = if self.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.max_jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Queue counters for observability.
#[derive(Default)]
pub struct QueueDiagnostics {
    pub submitted: AtomicUsize,
    pub completed: AtomicUsize,
    pub retries: AtomicUsize,
    pub failed: AtomicUsize,
}

impl QueueDiagnostics {
    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub submitted: usize,
    pub completed: usize,
    pub retries: usize,
    pub failed: usize,
}

struct Job {
    clip: Arc<AudioClip>,
    reply: oneshot::Sender<Result<Transcription>>,
}

/// Result slot for one enqueued clip.
#[derive(Debug)]
pub struct PendingTranscription {
    rx: oneshot::Receiver<Result<Transcription>>,
}

impl PendingTranscription {
    /// Wait until this clip's own transcription finishes.
    pub async fn wait(self) -> Result<Transcription> {
        self.rx.await.map_err(|_| TallyError::QueueClosed)?
    }
}

/// Handle to the transcription worker. Cloning shares the same worker.
#[derive(Clone)]
pub struct TranscriptionQueue {
    tx: mpsc::Sender<Job>,
    diagnostics: Arc<QueueDiagnostics>,
}

impl TranscriptionQueue {
    /// Start the worker on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(backend: BackendHandle, policy: RetryPolicy) -> Self {
        Self::spawn_with_capacity(backend, policy, QUEUE_CAPACITY)
    }

    /// Like [`spawn`](Self::spawn) with a custom admission bound (minimum 1).
    pub fn spawn_with_capacity(
        backend: BackendHandle,
        policy: RetryPolicy,
        capacity: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let diagnostics = Arc::new(QueueDiagnostics::default());
        tokio::spawn(run_worker(rx, backend, policy, Arc::clone(&diagnostics)));
        info!(capacity = capacity.max(1), "transcription queue started");
        Self { tx, diagnostics }
    }

    /// Queue a clip without waiting for its result. Jobs run in enqueue
    /// order; when the queue is full this waits for a free slot.
    ///
    /// # Errors
    /// `TallyError::QueueClosed` if the worker has stopped.
    pub async fn enqueue(&self, clip: AudioClip) -> Result<PendingTranscription> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job {
                clip: Arc::new(clip),
                reply,
            })
            .await
            .map_err(|_| TallyError::QueueClosed)?;
        self.diagnostics.submitted.fetch_add(1, Ordering::Relaxed);
        Ok(PendingTranscription { rx })
    }

    /// Queue a clip and wait for its transcription.
    pub async fn submit(&self, clip: AudioClip) -> Result<Transcription> {
        self.enqueue(clip).await?.wait().await
    }

    pub fn diagnostics(&self) -> QueueSnapshot {
        self.diagnostics.snapshot()
    }
}

impl std::fmt::Debug for TranscriptionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptionQueue")
            .field("diagnostics", &self.diagnostics.snapshot())
            .finish()
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Job>,
    backend: BackendHandle,
    policy: RetryPolicy,
    diagnostics: Arc<QueueDiagnostics>,
) {
    while let Some(job) = rx.recv().await {
        let result = transcribe_with_retry(&backend, job.clip, &policy, &diagnostics).await;
        match &result {
            Ok(_) => diagnostics.completed.fetch_add(1, Ordering::Relaxed),
            Err(_) => diagnostics.failed.fetch_add(1, Ordering::Relaxed),
        };
        if job.reply.send(result).is_err() {
            debug!("submitter dropped before transcription finished");
        }
    }
    info!("transcription queue stopped");
}

async fn transcribe_with_retry(
    backend: &BackendHandle,
    clip: Arc<AudioClip>,
    policy: &RetryPolicy,
    diagnostics: &QueueDiagnostics,
) -> Result<Transcription> {
    let max_attempts = policy.attempts();
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let handle = backend.clone();
        let job_clip = Arc::clone(&clip);
        let outcome = tokio::task::spawn_blocking(move || handle.0.lock().transcribe(&job_clip))
            .await
            .map_err(|e| TallyError::TranscriptionFailed(format!("backend task aborted: {e}")))?;

        let err = match outcome {
            Ok(transcription) => return Ok(transcription),
            Err(err) if err.is_transient() => err,
            Err(err) => return Err(err),
        };

        if attempt >= max_attempts {
            warn!(attempt, error = %err, "transcription retries exhausted");
            return Err(TallyError::TranscriptionExhausted {
                attempts: attempt,
                last_error: err.to_string(),
            });
        }

        let delay = policy.delay(attempt);
        diagnostics.retries.fetch_add(1, Ordering::Relaxed);
        warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient transcription failure, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
