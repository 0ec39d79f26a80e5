//! Weighted score rollup and ranking.
//!
//! Each concept's total is the sum, over the criteria it was scored on,
//! of the mean score for that criterion times the criterion's weight.
//!
//! # Missing Criteria
//!
//! A criterion nobody scored contributes zero. A concept scored on fewer
//! criteria is therefore not zeroed out, but it can never exceed what full
//! coverage would have allowed.
//!
//! # Ordering
//!
//! Ranking sorts by descending total. The sort is stable, so ties keep the
//! order in which the concepts were first recorded in the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::criteria::{CriteriaWeights, Criterion};
use crate::store::{ScoreEntry, ScoreStore};
use crate::Result;

/// Gap between the top two totals above which the ordering is treated as
/// stable. Heuristic, not a statistical bound.
pub const STABILITY_GAP: f64 = 0.12;

/// Note returned when fewer than two concepts were scored.
pub const NO_COMPARISON_NOTE: &str =
    "Fewer than two concepts were scored; no sensitivity comparison is possible.";

/// Rounds to four decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// A concept's collected entries and their weighted total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptScore {
    /// Title of the scored concept.
    pub concept_title: String,
    /// Every entry recorded for the concept, in arrival order.
    pub entries: Vec<ScoreEntry>,
    /// Weighted total, rounded to four decimals.
    pub total: f64,
}

impl ConceptScore {
    /// Mean score for `criterion`, or `None` if nobody scored it.
    pub fn mean_for(&self, criterion: Criterion) -> Option<f64> {
        let values: Vec<f64> = self
            .entries
            .iter()
            .filter(|e| e.criterion == criterion)
            .map(|e| e.score)
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}

/// Computes weighted totals with a validated weight table.
#[derive(Debug, Clone)]
pub struct Aggregator {
    weights: CriteriaWeights,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    /// Creates an aggregator with the default weight table.
    pub fn new() -> Self {
        Self {
            weights: CriteriaWeights::default(),
        }
    }

    /// Creates an aggregator with a custom weight table.
    ///
    /// # Errors
    ///
    /// Fails if the table violates [`CriteriaWeights::validate`].
    pub fn with_weights(weights: CriteriaWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Returns the weight table in use.
    pub fn weights(&self) -> &CriteriaWeights {
        &self.weights
    }

    /// Weighted total of a set of entries.
    ///
    /// Per criterion present: simple mean of all values (no outlier
    /// rejection) times the criterion weight. Summed and rounded to four
    /// decimals.
    pub fn weighted_total(&self, entries: &[ScoreEntry]) -> f64 {
        let mut by_criterion: BTreeMap<Criterion, (f64, usize)> = BTreeMap::new();
        for entry in entries {
            let slot = by_criterion.entry(entry.criterion).or_insert((0.0, 0));
            slot.0 += entry.score;
            slot.1 += 1;
        }

        let total: f64 = by_criterion
            .into_iter()
            .map(|(criterion, (sum, count))| (sum / count as f64) * self.weights.weight(criterion))
            .sum();
        round4(total)
    }

    /// Scores every concept in the store, in store order.
    pub fn score_all(&self, store: &ScoreStore) -> Vec<ConceptScore> {
        store
            .iter()
            .map(|(title, entries)| ConceptScore {
                concept_title: title.to_string(),
                entries: entries.to_vec(),
                total: self.weighted_total(entries),
            })
            .collect()
    }
}

/// Orders concept ids by descending total.
///
/// Ties keep their input order.
pub fn ranking<'a, I>(totals: I) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut ordered: Vec<(&str, f64)> = totals.into_iter().collect();
    ordered.sort_by(|a, b| b.1.total_cmp(&a.1));
    ordered.into_iter().map(|(id, _)| id.to_string()).collect()
}

/// Describes how far the leader is ahead of the runner-up.
///
/// With fewer than two concepts this returns [`NO_COMPARISON_NOTE`].
pub fn sensitivity_note<'a, I>(totals: I) -> String
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut values: Vec<f64> = totals.into_iter().map(|(_, total)| total).collect();
    if values.len() < 2 {
        return NO_COMPARISON_NOTE.to_string();
    }

    values.sort_by(|a, b| b.total_cmp(a));
    let gap = round4(values[0] - values[1]);
    format!(
        "Top-1 vs Top-2 total gap: {} (ordering is considered stable above {}).",
        gap, STABILITY_GAP
    )
}
