//! Verb-phrase → inventory operation.
//!
//! Vocabularies are checked in priority order and the first whole-word hit
//! wins. ERASE comes first so "zero out the ribs, set five" can never be read
//! as a SET.

use crate::ipc::Operation;
use crate::text::{contains_phrase, normalize_phrase, tokens};

/// Ordered (vocabulary, operation) rules.
pub const OPERATION_RULES: &[(&[&str], Operation)] = &[
    (&["erase", "clear", "delete", "zero"], Operation::Erase),
    (&["add", "plus", "and"], Operation::Add),
    (&["subtract", "minus", "take away", "remove"], Operation::Subtract),
    (&["at", "equals", "is", "set"], Operation::Set),
];

/// Operation used when no rule matches.
pub const DEFAULT_OPERATION: Operation = Operation::Set;

/// Outcome of classification, recording whether a rule actually fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationMatch {
    pub operation: Operation,
    /// `false` when `operation` is the fallback default.
    pub explicit: bool,
}

/// Classify a raw transcript.
pub fn classify_operation(transcript: &str) -> OperationMatch {
    let normalized = normalize_phrase(transcript);
    classify_tokens(&tokens(&normalized))
}

/// Classify already-normalized tokens.
pub fn classify_tokens(toks: &[&str]) -> OperationMatch {
    for (vocabulary, operation) in OPERATION_RULES {
        if vocabulary.iter().any(|verb| contains_phrase(toks, verb)) {
            return OperationMatch {
                operation: *operation,
                explicit: true,
            };
        }
    }
    OperationMatch {
        operation: DEFAULT_OPERATION,
        explicit: false,
    }
}

/// Whether a token belongs to any operation vocabulary (single-word entries
/// and either half of a multi-word entry).
pub fn is_operation_word(token: &str) -> bool {
    OPERATION_RULES
        .iter()
        .flat_map(|(vocabulary, _)| vocabulary.iter())
        .any(|verb| verb.split_whitespace().any(|w| w == token))
}
