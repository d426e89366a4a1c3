//! Project snapshot: the canonical item list and its alias table.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tally_core::AliasTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ProjectSnapshot {
    pub canonical_items: Vec<String>,
    pub alias_table: AliasTable,
}

impl ProjectSnapshot {
    /// Items from `--item` flags are appended after the file's own list.
    pub fn with_extra_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.canonical_items.extend(items.into_iter().map(Into::into));
        self
    }
}

pub fn load_project(path: &Path) -> Result<ProjectSnapshot> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading project file {}", path.display()))?;
    let project: ProjectSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("parsing project file {}", path.display()))?;
    if project.canonical_items.iter().all(|i| i.trim().is_empty()) {
        bail!("project file {} lists no canonical items", path.display());
    }
    Ok(project)
}

pub fn save_project(path: &Path, project: &ProjectSnapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(project)?;
    fs::write(path, json).with_context(|| format!("writing project file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_items_and_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walk-in.json");
        fs::write(
            &path,
            r#"{"canonicalItems": ["RIBS", "SHRIMP SKEWER"],
                "aliasTable": {"SHRIMP SKEWER": ["shrimp", 7]}}"#,
        )
        .unwrap();

        let project = load_project(&path).unwrap();
        assert_eq!(project.canonical_items, ["RIBS", "SHRIMP SKEWER"]);
        assert_eq!(project.alias_table.aliases_for("SHRIMP SKEWER"), ["shrimp"]);
    }

    #[test]
    fn empty_item_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, r#"{"canonicalItems": ["  "]}"#).unwrap();

        let err = load_project(&path).unwrap_err();
        assert!(err.to_string().contains("no canonical items"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_project(Path::new("/nonexistent/project.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/project.json"));
    }

    #[test]
    fn save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("project.json");
        let project = ProjectSnapshot {
            canonical_items: vec!["BEEF".into()],
            alias_table: AliasTable::new().with("BEEF", ["beef patty"]),
        };
        save_project(&path, &project).unwrap();
        assert_eq!(load_project(&path).unwrap(), project);
    }
}
