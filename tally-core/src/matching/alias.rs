//! Learned alias table and first-priority alias lookup.
//!
//! The table is an *ordered* list of `canonical → [alias, …]` entries. Order
//! matters: when two aliases could match the same phrase, the entry that was
//! registered first wins. On the wire it is a JSON object; the map visitor
//! below keeps document order and quietly skips non-string alias values.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::text::normalize_phrase;

/// One canonical item and the spoken spellings learned for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// Insertion-ordered alias mapping supplied by the caller on every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append aliases for `canonical`, creating the entry if it is new.
    /// Keys compare case-insensitively; the first spelling is kept.
    pub fn insert<I, S>(&mut self, canonical: impl Into<String>, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let canonical = canonical.into();
        let aliases = aliases.into_iter().map(Into::into);
        match self.entry_mut(&canonical) {
            Some(entry) => entry.aliases.extend(aliases),
            None => self.entries.push(AliasEntry {
                canonical,
                aliases: aliases.collect(),
            }),
        }
    }

    /// Builder form of [`AliasTable::insert`].
    pub fn with<I, S>(mut self, canonical: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(canonical, aliases);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Aliases registered for `canonical` (case-insensitive key match).
    pub fn aliases_for(&self, canonical: &str) -> &[String] {
        self.entry(canonical)
            .map(|e| e.aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `alias` (compared normalized) is already learned for `canonical`.
    pub fn contains_alias(&self, canonical: &str, alias: &str) -> bool {
        let wanted = normalize_phrase(alias);
        self.aliases_for(canonical)
            .iter()
            .any(|a| normalize_phrase(a) == wanted)
    }

    fn entry(&self, canonical: &str) -> Option<&AliasEntry> {
        let key = normalize_phrase(canonical);
        self.entries
            .iter()
            .find(|e| normalize_phrase(&e.canonical) == key)
    }

    fn entry_mut(&mut self, canonical: &str) -> Option<&mut AliasEntry> {
        let key = normalize_phrase(canonical);
        self.entries
            .iter_mut()
            .find(|e| normalize_phrase(&e.canonical) == key)
    }
}

impl<C, A, S> FromIterator<(C, A)> for AliasTable
where
    C: Into<String>,
    A: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (C, A)>>(iter: T) -> Self {
        let mut table = AliasTable::new();
        for (canonical, aliases) in iter {
            table.insert(canonical, aliases);
        }
        table
    }
}

/// Look up a normalized phrase; the first entry with an alias contained in
/// (or equal to) the phrase wins.
pub fn resolve_alias<'t>(phrase_normalized: &str, table: &'t AliasTable) -> Option<&'t str> {
    resolve_alias_where(phrase_normalized, table, |_| true)
}

/// [`resolve_alias`] restricted to entries whose canonical key passes `accept`.
pub fn resolve_alias_where<'t, F>(
    phrase_normalized: &str,
    table: &'t AliasTable,
    accept: F,
) -> Option<&'t str>
where
    F: Fn(&str) -> bool,
{
    if phrase_normalized.is_empty() {
        return None;
    }
    table
        .iter()
        .filter(|entry| accept(entry.canonical.as_str()))
        .find(|entry| {
            entry.aliases.iter().any(|alias| {
                let alias = normalize_phrase(alias);
                !alias.is_empty() && phrase_normalized.contains(alias.as_str())
            })
        })
        .map(|entry| entry.canonical.as_str())
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for AliasTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.canonical, &entry.aliases)?;
        }
        map.end()
    }
}

/// Alias list value that tolerates junk: non-list values and non-string
/// elements are dropped rather than failing the whole request.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientAliases {
    Many(Vec<LenientAlias>),
    One(String),
    Junk(IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientAlias {
    Text(String),
    Junk(IgnoredAny),
}

impl LenientAliases {
    fn into_strings(self) -> Vec<String> {
        match self {
            LenientAliases::Many(items) => items
                .into_iter()
                .filter_map(|a| match a {
                    LenientAlias::Text(s) => Some(s),
                    LenientAlias::Junk(_) => None,
                })
                .collect(),
            LenientAliases::One(s) => vec![s],
            LenientAliases::Junk(_) => Vec::new(),
        }
    }
}

struct AliasTableVisitor;

impl<'de> Visitor<'de> for AliasTableVisitor {
    type Value = AliasTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of canonical item to alias list")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut table = AliasTable::new();
        while let Some((canonical, aliases)) = access.next_entry::<String, LenientAliases>()? {
            table.insert(canonical, aliases.into_strings());
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for AliasTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AliasTableVisitor)
    }
}
