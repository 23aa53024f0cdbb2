//! Ordered registry of `(name, anonymous form)` pairs.
//!
//! Entries are kept in creation order and each carries a generation number that
//! strictly increases along the registry. Translation walks the registry latest
//! first, so a larger abstraction (named later) is substituted before any smaller
//! one nested inside it. Composition never mutates a mapping: it returns a new one,
//! and refuses to interleave two mappings whose generations are out of order.
use std::collections::HashSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;
use crate::expr::MARKER;

/// One named abstraction and the raw text of its inline anonymous form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingEntry {
    pub name: String,
    pub anonymous: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNameMapping")]
pub struct NameMapping {
    entries: Vec<MappingEntry>,
}

/// Unchecked wire form of a [`NameMapping`].
#[derive(Deserialize)]
struct RawNameMapping {
    entries: Vec<MappingEntry>,
}

impl TryFrom<RawNameMapping> for NameMapping {
    type Error = InvariantViolation;

    /// Generations must strictly increase and names must be unique.
    fn try_from(raw: RawNameMapping) -> Result<Self, Self::Error> {
        let mut names = HashSet::new();
        let mut last: Option<u64> = None;
        for entry in &raw.entries {
            if let Some(last) = last {
                if entry.generation <= last {
                    return Err(InvariantViolation::InterleavedMappings {
                        last,
                        next: entry.generation,
                    });
                }
            }
            if !names.insert(entry.name.as_str()) {
                return Err(InvariantViolation::DuplicateName(entry.name.clone()));
            }
            last = Some(entry.generation);
        }
        Ok(Self {
            entries: raw.entries,
        })
    }
}

impl NameMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name every marker-prefixed form, shortest first, as `{prefix}{i}`.
    ///
    /// Forms that do not start with the inline-abstraction marker are ignored and
    /// repeated forms are only named once. The sort is stable, so forms of equal
    /// length keep their input order.
    pub fn build<I, S>(anonymous_forms: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new().build_after(anonymous_forms, prefix)
    }

    /// Like [`NameMapping::build`], but numbering generations after `self`'s last one
    /// so the result can be appended to `self` with [`NameMapping::concat`].
    ///
    /// Names are still numbered from zero; only generations continue.
    pub fn build_after<I, S>(&self, anonymous_forms: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut forms: Vec<String> = Vec::new();
        for form in anonymous_forms {
            let form = form.as_ref();
            if !form.starts_with(MARKER) {
                continue;
            }
            if !seen.insert(form.to_string()) {
                warn!("Skipping repeated anonymous abstraction `{form}`");
                continue;
            }
            forms.push(form.to_string());
        }
        forms.sort_by_key(String::len);

        let first = self.next_generation();
        let entries: Vec<MappingEntry> = forms
            .into_iter()
            .enumerate()
            .map(|(i, anonymous)| MappingEntry {
                name: format!("{prefix}{i}"),
                anonymous,
                generation: first + i as u64,
            })
            .collect();

        debug!(
            "Built name mapping with {} entries (generations {}..{})",
            entries.len(),
            first,
            first + entries.len() as u64
        );
        Self { entries }
    }

    /// Build from explicit pairs, in the given order.
    pub fn from_pairs<I, N, A>(pairs: I) -> Result<Self, InvariantViolation>
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: Into<String>,
    {
        let mut mapping = Self::new();
        for (name, anonymous) in pairs {
            mapping.push(name.into(), anonymous.into())?;
        }
        Ok(mapping)
    }

    /// Append `later` after `self`, returning a new mapping.
    ///
    /// Every generation of `later` must be greater than every generation of `self`,
    /// and no name may appear in both.
    pub fn concat(&self, later: &NameMapping) -> Result<NameMapping, InvariantViolation> {
        if let (Some(last), Some(next)) = (self.last_generation(), later.first_generation()) {
            if next <= last {
                return Err(InvariantViolation::InterleavedMappings { last, next });
            }
        }
        for entry in &later.entries {
            if self.anonymous_of(&entry.name).is_some() {
                return Err(InvariantViolation::DuplicateName(entry.name.clone()));
            }
        }

        let mut entries = self.entries.clone();
        entries.extend(later.entries.iter().cloned());
        debug!(
            "Concatenated name mappings: {} + {} entries",
            self.entries.len(),
            later.entries.len()
        );
        Ok(Self { entries })
    }

    /// Append one entry at the next generation. Only used while a new mapping is being built.
    pub(crate) fn push(&mut self, name: String, anonymous: String) -> Result<(), InvariantViolation> {
        if self.anonymous_of(&name).is_some() {
            return Err(InvariantViolation::DuplicateName(name));
        }
        let generation = self.next_generation();
        self.entries.push(MappingEntry {
            name,
            anonymous,
            generation,
        });
        Ok(())
    }

    /// Entries in creation order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Entries from the most recently added to the oldest.
    pub fn iter_latest_first(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter().rev()
    }

    /// `(name, anonymous)` pairs in creation order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.anonymous.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anonymous form registered under `name`.
    pub fn anonymous_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.anonymous.as_str())
    }

    /// Name registered for the anonymous form `anonymous`.
    pub fn name_of(&self, anonymous: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.anonymous == anonymous)
            .map(|e| e.name.as_str())
    }

    pub fn first_generation(&self) -> Option<u64> {
        self.entries.first().map(|e| e.generation)
    }

    pub fn last_generation(&self) -> Option<u64> {
        self.entries.last().map(|e| e.generation)
    }

    /// Generation the next appended entry receives.
    pub fn next_generation(&self) -> u64 {
        self.last_generation().map_or(0, |g| g + 1)
    }
}
