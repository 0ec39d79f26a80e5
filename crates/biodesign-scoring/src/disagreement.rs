//! Disagreement detection across voters.
//!
//! Scores are pooled per criterion across every concept: the question is
//! whether the panel disagrees about a criterion in general, not about one
//! concept in particular. A criterion is disputed when its pooled sample
//! standard deviation reaches the threshold.
//!
//! ## Evidence Floor
//!
//! Criteria with fewer than [`MIN_SAMPLES`] pooled scores are never flagged,
//! whatever their spread. The floor is fixed; only the threshold can be
//! configured.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::criteria::Criterion;
use crate::error::ScoringError;
use crate::store::ScoreStore;
use crate::Result;

/// Minimum pooled samples before a criterion can be flagged.
pub const MIN_SAMPLES: usize = 3;

/// Default standard-deviation threshold on the 0–5 scale.
pub const DEFAULT_DISPUTE_THRESHOLD: f64 = 1.0;

/// Sample (n − 1) standard deviation, or `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Spread of the pooled scores for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionDispersion {
    /// The criterion.
    pub criterion: Criterion,
    /// Number of pooled scores.
    pub samples: usize,
    /// Sample standard deviation, if at least two scores exist.
    pub std_dev: Option<f64>,
    /// Whether the criterion crossed the threshold with enough evidence.
    pub disputed: bool,
}

/// Flags criteria whose pooled scores disagree.
#[derive(Debug, Clone, Copy)]
pub struct DisagreementDetector {
    threshold: f64,
}

impl Default for DisagreementDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DisagreementDetector {
    /// Creates a detector with [`DEFAULT_DISPUTE_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_DISPUTE_THRESHOLD,
        }
    }

    /// Creates a detector with a custom threshold.
    ///
    /// # Errors
    ///
    /// [`ScoringError::InvalidThreshold`] if `threshold` is negative or
    /// not finite.
    pub fn with_threshold(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ScoringError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    /// Returns the threshold in use.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Per-criterion spread for every criterion that received a score,
    /// in canonical criterion order.
    pub fn dispersion(&self, store: &ScoreStore) -> Vec<CriterionDispersion> {
        let mut pooled: BTreeMap<Criterion, Vec<f64>> = BTreeMap::new();
        for entry in store.all_entries() {
            pooled.entry(entry.criterion).or_default().push(entry.score);
        }

        pooled
            .into_iter()
            .map(|(criterion, values)| {
                let std_dev = sample_std_dev(&values);
                let disputed = values.len() >= MIN_SAMPLES
                    && std_dev.is_some_and(|sd| sd >= self.threshold);
                CriterionDispersion {
                    criterion,
                    samples: values.len(),
                    std_dev,
                    disputed,
                }
            })
            .collect()
    }

    /// Disputed criteria, in canonical criterion order.
    pub fn disputed(&self, store: &ScoreStore) -> Vec<Criterion> {
        self.dispersion(store)
            .into_iter()
            .filter(|d| d.disputed)
            .map(|d| d.criterion)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ScoreEntry;

    fn store_with(scores: &[(&str, Criterion, f64)]) -> ScoreStore {
        let mut store = ScoreStore::new();
        for (concept, criterion, score) in scores {
            store.record(concept, vec![ScoreEntry::new(*criterion, *score, "")]);
        }
        store
    }

    #[test]
    fn test_sample_std_dev() {
        let sd = sample_std_dev(&[1.0, 1.0, 5.0]).unwrap();
        assert!((sd - 2.3094).abs() < 1e-4);
        assert_eq!(sample_std_dev(&[3.0]), None);
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[2.0, 2.0, 2.0]), Some(0.0));
    }

    #[test]
    fn test_wide_spread_is_disputed() {
        let store = store_with(&[
            ("A", Criterion::TechFeas, 1.0),
            ("A", Criterion::TechFeas, 1.0),
            ("A", Criterion::TechFeas, 5.0),
        ]);
        let detector = DisagreementDetector::new();
        assert_eq!(detector.disputed(&store), vec![Criterion::TechFeas]);
    }

    #[test]
    fn test_two_samples_never_disputed() {
        let store = store_with(&[("A", Criterion::Ux, 0.0), ("B", Criterion::Ux, 5.0)]);
        let detector = DisagreementDetector::with_threshold(0.0).unwrap();
        assert!(detector.disputed(&store).is_empty());

        let store = store_with(&[("A", Criterion::Ux, 4.0), ("B", Criterion::Ux, 4.0)]);
        assert!(detector.disputed(&store).is_empty());
    }

    #[test]
    fn test_scores_pooled_across_concepts() {
        let store = store_with(&[
            ("A", Criterion::Market, 0.0),
            ("B", Criterion::Market, 2.5),
            ("C", Criterion::Market, 5.0),
        ]);
        let disputed = DisagreementDetector::new().disputed(&store);
        assert_eq!(disputed, vec![Criterion::Market]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // [2, 3, 4] has a sample standard deviation of exactly 1.0
        let store = store_with(&[
            ("A", Criterion::Payer, 2.0),
            ("A", Criterion::Payer, 3.0),
            ("A", Criterion::Payer, 4.0),
        ]);
        assert_eq!(
            DisagreementDetector::new().disputed(&store),
            vec![Criterion::Payer]
        );
        let strict = DisagreementDetector::with_threshold(1.01).unwrap();
        assert!(strict.disputed(&store).is_empty());
    }

    #[test]
    fn test_agreement_not_disputed() {
        let store = store_with(&[
            ("A", Criterion::RegPath, 3.0),
            ("B", Criterion::RegPath, 3.5),
            ("C", Criterion::RegPath, 3.0),
        ]);
        assert!(DisagreementDetector::new().disputed(&store).is_empty());
    }

    #[test]
    fn test_disputed_in_canonical_order() {
        let store = store_with(&[
            ("A", Criterion::Payer, 0.0),
            ("A", Criterion::Payer, 0.0),
            ("A", Criterion::Payer, 5.0),
            ("A", Criterion::ClinicalValue, 5.0),
            ("A", Criterion::ClinicalValue, 0.0),
            ("A", Criterion::ClinicalValue, 0.0),
        ]);
        assert_eq!(
            DisagreementDetector::new().disputed(&store),
            vec![Criterion::ClinicalValue, Criterion::Payer]
        );
    }

    #[test]
    fn test_dispersion_reports_samples() {
        let store = store_with(&[("A", Criterion::Ux, 4.0), ("B", Criterion::Ux, 4.0)]);
        let report = DisagreementDetector::new().dispersion(&store);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].samples, 2);
        assert_eq!(report[0].std_dev, Some(0.0));
        assert!(!report[0].disputed);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        assert!(DisagreementDetector::with_threshold(-0.1).is_err());
        assert!(DisagreementDetector::with_threshold(f64::NAN).is_err());
        assert!(DisagreementDetector::with_threshold(f64::INFINITY).is_err());
    }

    #[test]
    fn test_empty_store() {
        let detector = DisagreementDetector::new();
        assert!(detector.disputed(&ScoreStore::new()).is_empty());
    }
}
