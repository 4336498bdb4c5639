// File: src/core/cast.rs
use crate::core::types::{CastMember, Gender};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Separates the character name from the "actor (gender)" part of an IMDb cast entry.
const CAST_DELIMITER: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("cast entry '{0}' has no ' | ' between character and actor")]
    MissingDelimiter(String),

    #[error("cast entry '{0}' has no '(gender)' after the actor name")]
    MissingGender(String),
}

/// An order-preserving, deduplicated map from cast key to the member playing it.
///
/// Keys are normally the lower-cased, trimmed character name. When a name is
/// listed more than once, every occurrence is keyed as `"<name> (<actor>)"`
/// instead, with the first occurrence renamed in place so it keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CastDirectory {
    entries: Vec<(String, CastMember)>,
    index: HashMap<String, usize>,
}

impl CastDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from raw `"name | actor (gender)"` entries.
    ///
    /// Returns `Ok(None)` for an empty list so callers can tell "no cast data"
    /// apart from "cast data that matched nothing". A single malformed entry
    /// fails the whole build.
    pub fn build<S: AsRef<str>>(raw_entries: &[S]) -> Result<Option<Self>, CastError> {
        if raw_entries.is_empty() {
            return Ok(None);
        }

        let mut directory = Self::new();
        let mut duplicate_names: HashSet<String> = HashSet::new();

        for raw in raw_entries {
            let (name, member) = parse_entry(raw.as_ref())?;

            if let Some(&idx) = directory.index.get(&name) {
                // Second occurrence: move the first one under its composite key.
                let first_key = composite_key(&name, &directory.entries[idx].1.actor);
                directory.rename(idx, first_key);
                duplicate_names.insert(name.clone());
                directory.insert_new(composite_key(&name, &member.actor), member);
            } else if duplicate_names.contains(&name) {
                directory.insert_new(composite_key(&name, &member.actor), member);
            } else {
                directory.insert_new(name, member);
            }
        }

        Ok(Some(directory))
    }

    pub fn get(&self, key: &str) -> Option<&CastMember> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cast keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CastMember)> + '_ {
        self.entries.iter().map(|(key, member)| (key.as_str(), member))
    }

    /// Inserts under a key not yet present. An identical composite key
    /// (same name and same actor listed twice) keeps the first entry.
    fn insert_new(&mut self, key: String, member: CastMember) {
        if self.index.contains_key(&key) {
            return;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, member));
    }

    /// Moves entry `idx` under `new_key`, or under `"<new_key> #<n>"` when a
    /// literal cast name already took it. The old key never survives.
    fn rename(&mut self, idx: usize, new_key: String) {
        let new_key = self.free_key(new_key);
        let old_key = std::mem::replace(&mut self.entries[idx].0, new_key.clone());
        self.index.remove(&old_key);
        self.index.insert(new_key, idx);
    }

    fn free_key(&self, base: String) -> String {
        if !self.index.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{} #{}", base, n))
            .find(|key| !self.index.contains_key(key))
            .unwrap_or(base)
    }
}

fn composite_key(name: &str, actor: &str) -> String {
    format!("{} ({})", name, actor)
}

/// Splits one raw entry into its cast key and member.
fn parse_entry(raw: &str) -> Result<(String, CastMember), CastError> {
    let (name, actor_part) = raw
        .split_once(CAST_DELIMITER)
        .ok_or_else(|| CastError::MissingDelimiter(raw.to_string()))?;

    let (actor, _) = actor_part
        .split_once('(')
        .ok_or_else(|| CastError::MissingGender(raw.to_string()))?;
    let gender_code = actor_part
        .rsplit('(')
        .next()
        .unwrap_or_default()
        .trim()
        .trim_end_matches(')');

    Ok((
        name.trim().to_lowercase(),
        CastMember::new(actor.trim().to_lowercase(), Gender::from_code(gender_code)),
    ))
}
