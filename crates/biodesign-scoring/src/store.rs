//! Append-only store of per-concept score entries.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::criteria::Criterion;

/// One criterion score given to a concept by one voter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// The criterion being scored.
    pub criterion: Criterion,
    /// Score on the 0–5 scale.
    pub score: f64,
    /// One-line justification from the voter.
    pub rationale: String,
}

impl ScoreEntry {
    /// Creates a new score entry.
    pub fn new(criterion: Criterion, score: f64, rationale: impl Into<String>) -> Self {
        Self {
            criterion,
            score,
            rationale: rationale.into(),
        }
    }
}

/// In-memory mapping from concept title to its accumulated score entries.
///
/// Concepts keep the order in which they were first recorded; that order
/// is the tie-break used by [`crate::ranking`]. Entries are never
/// overwritten, a second vote on the same criterion is simply appended.
#[derive(Debug, Clone, Default)]
pub struct ScoreStore {
    concepts: Vec<(String, Vec<ScoreEntry>)>,
    index: HashMap<String, usize>,
}

impl ScoreStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entries` to the list kept for `concept_id`.
    ///
    /// An empty (or whitespace-only) `concept_id` is ignored. A concept is
    /// registered even when `entries` is empty, so a voter that named a
    /// concept but gave no usable scores still puts it on the board.
    ///
    /// Returns the number of entries appended.
    pub fn record<I>(&mut self, concept_id: &str, entries: I) -> usize
    where
        I: IntoIterator<Item = ScoreEntry>,
    {
        let concept_id = concept_id.trim();
        if concept_id.is_empty() {
            return 0;
        }

        let slot = match self.index.get(concept_id) {
            Some(&slot) => slot,
            None => {
                self.concepts.push((concept_id.to_string(), Vec::new()));
                let slot = self.concepts.len() - 1;
                self.index.insert(concept_id.to_string(), slot);
                slot
            }
        };

        let list = &mut self.concepts[slot].1;
        let before = list.len();
        list.extend(entries);
        list.len() - before
    }

    /// Returns the entries recorded for `concept_id`.
    pub fn entries(&self, concept_id: &str) -> Option<&[ScoreEntry]> {
        self.index
            .get(concept_id)
            .map(|&slot| self.concepts[slot].1.as_slice())
    }

    /// Iterates concepts in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ScoreEntry])> {
        self.concepts
            .iter()
            .map(|(id, entries)| (id.as_str(), entries.as_slice()))
    }

    /// Iterates every recorded entry across all concepts.
    pub fn all_entries(&self) -> impl Iterator<Item = &ScoreEntry> {
        self.concepts.iter().flat_map(|(_, entries)| entries.iter())
    }

    /// Number of concepts in the store.
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Returns true if no concept has been recorded.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Total number of entries across all concepts.
    pub fn entry_count(&self) -> usize {
        self.concepts.iter().map(|(_, e)| e.len()).sum()
    }
}
