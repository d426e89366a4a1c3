//! Collaborator contracts for applying decisions.
//!
//! The engine never mutates anything. Hosts hand its decisions to a
//! [`CountStore`] and an [`AliasStore`] through [`commit`] and
//! [`apply_recommendation`], which refuse anything but `AUTO_COMMIT`.

pub mod aliases;
pub mod ledger;

pub use aliases::AliasBook;
pub use ledger::CountLedger;

use tracing::debug;

use crate::error::Result;
use crate::ipc::{Operation, ResolutionDecision};
use crate::matching::AliasTable;

/// Destination for learned aliases.
pub trait AliasStore: Send + Sync {
    /// Persist `alias` for `canonical`. Returns `false` if it was already known.
    fn record_alias(&self, canonical: &str, alias: &str) -> Result<bool>;

    /// Current table, to pass into the next request.
    fn snapshot(&self) -> AliasTable;
}

/// Destination for committed count mutations.
pub trait CountStore: Send + Sync {
    /// Apply one mutation and return the new count.
    fn apply(&self, item: &str, operation: Operation, value: u32) -> Result<u32>;

    fn get(&self, item: &str) -> Option<u32>;
}

/// New count after applying `operation` to `current`.
///
/// SUBTRACT floors at zero, ADD saturates, ERASE ignores `value`.
pub fn apply_operation(current: u32, operation: Operation, value: u32) -> u32 {
    match operation {
        Operation::Add => current.saturating_add(value),
        Operation::Subtract => current.saturating_sub(value),
        Operation::Set => value,
        Operation::Erase => 0,
    }
}

/// Apply an `AUTO_COMMIT` decision. Anything else is left untouched and
/// yields `Ok(None)`.
pub fn commit(store: &dyn CountStore, decision: &ResolutionDecision) -> Result<Option<u32>> {
    if !decision.is_auto_commit() {
        return Ok(None);
    }
    let (Some(item), Some(operation), Some(value)) = (
        decision.canonical_item.item(),
        decision.operation,
        decision.value,
    ) else {
        return Ok(None);
    };
    let count = store.apply(item, operation, value)?;
    debug!(item, ?operation, value, count, "committed");
    Ok(Some(count))
}

/// Persist a decision's alias recommendation, if it carries one that is
/// allowed to be saved.
pub fn apply_recommendation(store: &dyn AliasStore, decision: &ResolutionDecision) -> Result<bool> {
    let Some(alias) = decision.alias_to_save.as_deref() else {
        return Ok(false);
    };
    let Some(item) = decision.canonical_item.item() else {
        return Ok(false);
    };
    if !decision.is_auto_commit() {
        return Ok(false);
    }
    store.record_alias(item, alias)
}
