//! `StubBackend` — scripted transcription backend without real inference.
//!
//! Replays queued replies in order so hosts and tests can drive the queue and
//! the resolver end-to-end. Once the script runs dry it echoes clip metadata.

use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tracing::debug;

use super::{AudioClip, Transcription, TranscriptionBackend};
use crate::error::{Result, TallyError};

/// Clips shorter than this are treated as silence once the script is empty.
const MIN_SPEECH_SAMPLES: usize = 160;

pub struct StubBackend {
    script: VecDeque<Result<Transcription>>,
    calls: Arc<AtomicUsize>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            script: VecDeque::new(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_reply(mut self, transcription: Transcription) -> Self {
        self.script.push_back(Ok(transcription));
        self
    }

    pub fn with_transient_failure(mut self, message: impl Into<String>) -> Self {
        self.script
            .push_back(Err(TallyError::TranscriptionTransient(message.into())));
        self
    }

    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.script
            .push_back(Err(TallyError::TranscriptionFailed(message.into())));
        self
    }

    /// Shared counter of `transcribe` calls, readable after the backend has
    /// been moved into a queue.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionBackend for StubBackend {
    fn transcribe(&mut self, clip: &AudioClip) -> Result<Transcription> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(reply) = self.script.pop_front() {
            debug!(call, ok = reply.is_ok(), "StubBackend scripted reply");
            return reply;
        }

        if clip.samples.len() < MIN_SPEECH_SAMPLES {
            return Ok(Transcription::default());
        }
        Ok(Transcription::new(format!(
            "[stub: {} samples @ {} Hz]",
            clip.samples.len(),
            clip.sample_rate
        )))
    }
}
