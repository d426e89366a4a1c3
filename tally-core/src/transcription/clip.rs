//! Recorded utterance queued for transcription.

/// One spoken command as captured by the host: the whole utterance, not a
/// streaming slice. The queue shares it with retries behind an `Arc`, so it
/// is never copied per attempt.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Mono PCM, nominally within [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Capture rate the backend must be told about; 0 means unknown.
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Utterance length in seconds, or 0.0 when the rate is unknown.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// No audio was captured at all (distinct from captured silence).
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
