//! One counting session: resolves lines, commits counts, learns aliases.

use std::collections::BTreeMap;

use anyhow::Result;
use tally_core::store::{apply_recommendation, commit};
use tally_core::{
    AliasBook, AliasStore, AliasTable, CountLedger, ResolutionDecision, ResolutionEngine,
    ResolutionRequest,
};
use tracing::{debug, info};

use crate::project::ProjectSnapshot;
use crate::settings::AppSettings;

/// Split `primary | alt1 | alt2` into the primary transcript and its
/// non-blank alternatives.
pub fn parse_line(line: &str) -> (String, Vec<String>) {
    let mut parts = line.split('|').map(str::trim);
    let primary = parts.next().unwrap_or_default().to_string();
    let alternatives = parts.filter(|p| !p.is_empty()).map(String::from).collect();
    (primary, alternatives)
}

pub struct Session {
    engine: ResolutionEngine,
    canonical_items: Vec<String>,
    aliases: AliasBook,
    ledger: CountLedger,
    carry_recent_context: bool,
    last_transcript: Option<String>,
}

impl Session {
    pub fn new(settings: &AppSettings, project: ProjectSnapshot) -> Self {
        Self {
            engine: ResolutionEngine::new(settings.resolver.clone()),
            canonical_items: project.canonical_items,
            aliases: AliasBook::new(project.alias_table),
            ledger: CountLedger::new(),
            carry_recent_context: settings.carry_recent_context,
            last_transcript: None,
        }
    }

    /// Resolve one input line. Blank lines and `#` comments yield `None`.
    pub fn handle_line(&mut self, line: &str) -> Result<Option<ResolutionDecision>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (primary, alternatives) = parse_line(line);
        let mut request = ResolutionRequest::new(primary.clone(), self.canonical_items.clone())
            .with_alternatives(alternatives)
            .with_alias_table(self.aliases.snapshot())
            .with_auto_save(true);
        if self.carry_recent_context {
            if let Some(previous) = self.last_transcript.take() {
                request = request.with_recent_context(previous);
            }
        }
        self.last_transcript = Some(primary);

        let decision = self.engine.resolve(&request)?;
        if let Some(count) = commit(&self.ledger, &decision)? {
            info!(item = %decision.canonical_item, count, "count updated");
        }
        if apply_recommendation(&self.aliases, &decision)? {
            debug!(item = %decision.canonical_item, "alias recorded");
        }
        Ok(Some(decision))
    }

    pub fn counts(&self) -> BTreeMap<String, u32> {
        self.ledger.snapshot()
    }

    pub fn alias_table(&self) -> AliasTable {
        self.aliases.snapshot()
    }

    /// Project snapshot including every alias learned so far.
    pub fn project(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            canonical_items: self.canonical_items.clone(),
            alias_table: self.alias_table(),
        }
    }
}
