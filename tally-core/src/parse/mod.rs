//! Operation and quantity parsing over the primary transcript.

pub mod operation;
pub mod quantity;

pub use operation::{classify_operation, OperationMatch};
pub use quantity::extract_number;

use crate::text::normalize_phrase;

/// Whether a normalized token carries command language (an operation verb, a
/// number word or a digit run) rather than item content.
pub fn is_command_token(token: &str) -> bool {
    operation::is_operation_word(token)
        || quantity::number_word(token).is_some()
        || token.bytes().all(|b| b.is_ascii_digit())
}

/// Content tokens of a phrase: normalized, with command language removed.
pub fn content_tokens(phrase: &str) -> Vec<String> {
    normalize_phrase(phrase)
        .split_whitespace()
        .filter(|t| !is_command_token(t))
        .map(str::to_string)
        .collect()
}
