//! `AliasBook` — in-memory alias store shared between request handlers.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use super::AliasStore;
use crate::error::{Result, TallyError};
use crate::matching::AliasTable;
use crate::text::normalize_phrase;

/// Cloneable handle to one shared alias table.
#[derive(Clone, Default)]
pub struct AliasBook {
    table: Arc<RwLock<AliasTable>>,
}

impl AliasBook {
    pub fn new(table: AliasTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}

impl AliasStore for AliasBook {
    fn record_alias(&self, canonical: &str, alias: &str) -> Result<bool> {
        let normalized = normalize_phrase(alias);
        if normalized.is_empty() || canonical.trim().is_empty() {
            return Err(TallyError::InvalidRequest(
                "alias and canonical item must be non-blank".into(),
            ));
        }

        let mut guard = self.table.write();
        if guard.contains_alias(canonical, &normalized) {
            return Ok(false);
        }
        guard.insert(canonical, [normalized.clone()]);
        info!(canonical, alias = %normalized, "learned alias");
        Ok(true)
    }

    fn snapshot(&self) -> AliasTable {
        self.table.read().clone()
    }
}

impl std::fmt::Debug for AliasBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasBook")
            .field("entries", &self.table.read().len())
            .finish()
    }
}
