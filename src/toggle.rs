//! Toggle lookup
//!
//! A configuration is an ordered list of groups; each group is a cycle of
//! interchangeable words. Looking up a word finds the first group that
//! contains it (case-insensitively) and returns the next word of that cycle,
//! re-cased to match how the input was typed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::NotFound;

/// Cyclic group of interchangeable words, stored in canonical form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToggleGroup(Vec<String>);

impl ToggleGroup {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(words.into_iter().map(Into::into).collect())
    }

    pub fn words(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the first entry equal to `lowered` once lowercased
    fn position(&self, lowered: &str) -> Option<usize> {
        self.0.iter().position(|entry| entry.to_lowercase() == lowered)
    }

    /// Entry following `index`, wrapping from last to first
    fn successor(&self, index: usize) -> &str {
        &self.0[(index + 1) % self.0.len()]
    }
}

/// Ordered toggle groups, as read from the JSON file
///
/// Serialized as a bare array of arrays: `[["true","false"],["get","set"]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Vec<ToggleGroup>);

impl Configuration {
    pub fn new(groups: Vec<ToggleGroup>) -> Self {
        Self(groups)
    }

    pub fn groups(&self) -> &[ToggleGroup] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Next word for `word`; see [`resolve`]
    pub fn resolve(&self, word: &str) -> Result<String, NotFound> {
        resolve(word, self)
    }

    /// Words (lowercased) that belong to more than one group.
    ///
    /// Only the first of those groups is ever used by [`resolve`].
    pub fn duplicates(&self) -> Vec<String> {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut duplicates = BTreeSet::new();

        for (group_index, group) in self.0.iter().enumerate() {
            for entry in group.words() {
                let lowered = entry.to_lowercase();
                match seen.get(&lowered) {
                    Some(&first) if first != group_index => {
                        duplicates.insert(lowered);
                    }
                    Some(_) => {}
                    None => {
                        seen.insert(lowered, group_index);
                    }
                }
            }
        }

        duplicates.into_iter().collect()
    }
}

impl From<Vec<Vec<String>>> for Configuration {
    fn from(groups: Vec<Vec<String>>) -> Self {
        Self(groups.into_iter().map(ToggleGroup).collect())
    }
}

/// How the typed word is cased relative to its canonical entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasingStyle {
    Lower,
    Upper,
    Capitalized,
    /// Anything else; the successor is returned as stored
    Verbatim,
}

impl CasingStyle {
    /// Compare `word` against `canonical` in lower, upper, capitalized order.
    ///
    /// Lower is checked first so a one-letter lowercase word stays lowercase.
    pub fn detect(word: &str, canonical: &str) -> Self {
        if word == canonical.to_lowercase() {
            Self::Lower
        } else if word == canonical.to_uppercase() {
            Self::Upper
        } else if word == capitalize(canonical) {
            Self::Capitalized
        } else {
            Self::Verbatim
        }
    }

    pub fn apply(self, word: &str) -> String {
        match self {
            Self::Lower => word.to_lowercase(),
            Self::Upper => word.to_uppercase(),
            Self::Capitalized => capitalize(word),
            Self::Verbatim => word.to_string(),
        }
    }
}

/// First character uppercased, the rest left exactly as is
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Find the word that follows `word` in its group.
///
/// Groups are scanned in order and the first case-insensitive match wins.
/// The casing of `word` relative to the matched entry is carried over to the
/// successor.
pub fn resolve(word: &str, configuration: &Configuration) -> Result<String, NotFound> {
    let lowered = word.to_lowercase();

    for group in configuration.groups() {
        if let Some(index) = group.position(&lowered) {
            let style = CasingStyle::detect(word, &group.words()[index]);
            return Ok(style.apply(group.successor(index)));
        }
    }

    Err(NotFound { word: word.to_string() })
}
