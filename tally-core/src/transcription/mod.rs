//! Upstream speech-to-text contract.
//!
//! The resolver only ever sees text. This module defines what a transcription
//! backend must return and how calls to it are admitted: every call goes
//! through a [`TranscriptionQueue`], which runs exactly one backend call at a
//! time and retries transient failures with bounded backoff.
//!
//! `&mut self` on `transcribe` mirrors real backends (HTTP clients with
//! session state, local decoders with caches); mutation is serialised through
//! `BackendHandle`'s `parking_lot::Mutex`.

pub mod clip;
pub mod queue;
pub mod stub;

pub use clip::AudioClip;
pub use queue::{
    PendingTranscription, QueueSnapshot, RetryPolicy, TranscriptionQueue, QUEUE_CAPACITY,
};
pub use stub::StubBackend;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ipc::ResolutionRequest;
use crate::matching::AliasTable;

/// Alternatives forwarded into a resolution request.
pub const MAX_ALTERNATIVES: usize = 3;

/// Recognizer output for one utterance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    /// Most confident hypothesis. Empty means no speech was detected.
    pub primary: String,
    /// Secondary hypotheses, most confident first.
    #[serde(default)]
    pub alternatives: Vec<String>,
}

impl Transcription {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives<I, S>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternatives = alternatives.into_iter().map(Into::into).collect();
        self
    }

    /// No speech detected. A valid result, not a failure.
    pub fn is_silence(&self) -> bool {
        self.primary.trim().is_empty() && self.alternatives.iter().all(|a| a.trim().is_empty())
    }

    /// Build a resolution request. Blank alternatives are dropped and the
    /// rest truncated to [`MAX_ALTERNATIVES`].
    pub fn into_request(
        self,
        canonical_items: Vec<String>,
        alias_table: AliasTable,
    ) -> ResolutionRequest {
        let alternatives = self
            .alternatives
            .into_iter()
            .filter(|a| !a.trim().is_empty())
            .take(MAX_ALTERNATIVES);
        ResolutionRequest {
            transcript: self.primary,
            canonical_items,
            alias_table,
            ..ResolutionRequest::default()
        }
        .with_alternatives(alternatives)
    }
}

/// Contract for speech-to-text backends.
pub trait TranscriptionBackend: Send + 'static {
    /// Transcribe one utterance.
    ///
    /// # Errors
    /// `TallyError::TranscriptionTransient` for network / availability
    /// failures worth retrying; any other error is terminal.
    fn transcribe(&mut self, clip: &AudioClip) -> Result<Transcription>;
}

/// Thread-safe reference-counted handle to any `TranscriptionBackend`.
#[derive(Clone)]
pub struct BackendHandle(pub Arc<Mutex<dyn TranscriptionBackend>>);

impl BackendHandle {
    pub fn new<B: TranscriptionBackend>(backend: B) -> Self {
        Self(Arc::new(Mutex::new(backend)))
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle").finish_non_exhaustive()
    }
}
