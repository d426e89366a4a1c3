//! # tally-core
//!
//! Constrained intent resolution for spoken inventory counts.
//!
//! ## Architecture
//!
//! ```text
//! AudioClip → TranscriptionQueue (1 worker, backoff) → Transcription
//!                                                         │
//!                                                 ResolutionRequest
//!                                                         │
//!                           ResolutionEngine::resolve ── alias / exact / fuzzy
//!                                                         │
//!                                                 ResolutionDecision
//!                                                         │
//!                           store::commit / store::apply_recommendation
//! ```
//!
//! The engine is pure: it never invents an item outside the caller's
//! canonical list, never invents a number, and reports ambiguity as
//! `NEEDS_CONFIRMATION` / `UNMAPPED` instead of guessing.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
pub mod ipc;
pub mod matching;
pub mod parse;
pub mod store;
pub mod text;
pub mod transcription;

// Convenience re-exports for downstream crates
pub use engine::{ResolutionEngine, ResolverConfig};
pub use error::TallyError;
pub use ipc::{
    DecisionState, ItemChoice, Operation, ResolutionDecision, ResolutionRequest, UNMAPPED,
};
pub use matching::AliasTable;
pub use store::{AliasBook, AliasStore, CountLedger, CountStore};
pub use transcription::{
    AudioClip, BackendHandle, RetryPolicy, Transcription, TranscriptionBackend,
    TranscriptionQueue,
};
