//! Request / decision types exchanged with callers.
//!
//! ## Wire shape
//!
//! | Field | JSON |
//! |-------|------|
//! | `ResolutionRequest` | camelCase object |
//! | `Operation` | `"ADD"`, `"SUBTRACT"`, `"SET"`, `"ERASE"` |
//! | `DecisionState` | `"AUTO_COMMIT"`, `"NEEDS_CONFIRMATION"`, `"UNMAPPED"` |
//! | `ItemChoice` | plain string, `"UNMAPPED"` for the sentinel |

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::matching::alias::AliasTable;

/// Sentinel spelling for "no canonical item".
pub const UNMAPPED: &str = "UNMAPPED";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Inventory mutation implied by the utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Add,
    Subtract,
    Set,
    Erase,
}

/// The engine's verdict for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    /// Single item, explicit operation, resolved value. Safe to apply.
    AutoCommit,
    /// Something is ambiguous or missing; ask the operator.
    NeedsConfirmation,
    /// No canonical item could be derived from any transcript variant.
    Unmapped,
}

/// A canonical item or the `UNMAPPED` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemChoice {
    Item(String),
    Unmapped,
}

impl ItemChoice {
    pub fn as_str(&self) -> &str {
        match self {
            ItemChoice::Item(name) => name,
            ItemChoice::Unmapped => UNMAPPED,
        }
    }

    pub fn item(&self) -> Option<&str> {
        match self {
            ItemChoice::Item(name) => Some(name),
            ItemChoice::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, ItemChoice::Unmapped)
    }
}

impl fmt::Display for ItemChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(if raw == UNMAPPED {
            ItemChoice::Unmapped
        } else {
            ItemChoice::Item(raw)
        })
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One utterance to resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRequest {
    /// Primary recognizer hypothesis. May be empty (silence).
    pub transcript: String,
    /// Up to three secondary hypotheses, most confident first.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Authoritative item list. Must contain at least one non-blank entry.
    pub canonical_items: Vec<String>,
    #[serde(default)]
    pub alias_table: AliasTable,
    /// Opaque caller context (e.g. the previous utterance). Not used for matching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_context: Option<String>,
    #[serde(default)]
    pub allow_alias_auto_save: bool,
}

impl ResolutionRequest {
    pub fn new<I, S>(transcript: impl Into<String>, canonical_items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            transcript: transcript.into(),
            canonical_items: canonical_items.into_iter().map(Into::into).collect(),
            ..Self::default()
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

    pub fn with_alias_table(mut self, alias_table: AliasTable) -> Self {
        self.alias_table = alias_table;
        self
    }

    pub fn with_auto_save(mut self, allow: bool) -> Self {
        self.allow_alias_auto_save = allow;
        self
    }

    pub fn with_recent_context(mut self, context: impl Into<String>) -> Self {
        self.recent_context = Some(context.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// The engine's sole output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionDecision {
    /// Best-ranked item; only authoritative when `decision_state` is `AutoCommit`.
    pub canonical_item: ItemChoice,
    pub operation: Option<Operation>,
    pub value: Option<u32>,
    pub decision_state: DecisionState,
    /// Ranked candidates padded with `UNMAPPED`.
    pub top_choices: [ItemChoice; 3],
    /// Normalized transcript to learn as an alias of `canonical_item`.
    pub alias_to_save: Option<String>,
}

impl ResolutionDecision {
    /// Terminal decision for an utterance nothing could be mapped from.
    pub fn unmapped() -> Self {
        Self {
            canonical_item: ItemChoice::Unmapped,
            operation: None,
            value: None,
            decision_state: DecisionState::Unmapped,
            top_choices: [
                ItemChoice::Unmapped,
                ItemChoice::Unmapped,
                ItemChoice::Unmapped,
            ],
            alias_to_save: None,
        }
    }

    pub fn is_auto_commit(&self) -> bool {
        self.decision_state == DecisionState::AutoCommit
    }

    /// Clear `alias_to_save` on every branch that may not learn an alias.
    ///
    /// Returns `true` if a recommendation had to be dropped.
    pub fn enforce_alias_postcondition(&mut self) -> bool {
        let allowed = self.is_auto_commit() && !self.canonical_item.is_unmapped();
        if !allowed && self.alias_to_save.is_some() {
            self.alias_to_save = None;
            return true;
        }
        false
    }
}
