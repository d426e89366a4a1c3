use thiserror::Error;

/// All errors produced by tally-core.
///
/// Resolution outcomes (`UNMAPPED`, `NEEDS_CONFIRMATION`) are data, not
/// errors. Only caller misuse and upstream transcription I/O end up here.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("canonical item set is empty")]
    EmptyCanonicalSet,

    #[error("invalid resolution request: {0}")]
    InvalidRequest(String),

    #[error("transient transcription failure: {0}")]
    TranscriptionTransient(String),

    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("transcription failed after {attempts} attempts: {last_error}")]
    TranscriptionExhausted { attempts: u32, last_error: String },

    #[error("transcription queue is closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TallyError {
    /// Whether the transcription queue should retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, TallyError::TranscriptionTransient(_))
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
