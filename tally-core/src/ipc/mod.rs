//! Caller-facing request / decision types.
//!
//! All types derive or implement `serde::Serialize` + `serde::Deserialize` so
//! a host can expose the engine behind JSON without re-declaring them.

pub mod messages;

pub use messages::{
    DecisionState, ItemChoice, Operation, ResolutionDecision, ResolutionRequest, UNMAPPED,
};
