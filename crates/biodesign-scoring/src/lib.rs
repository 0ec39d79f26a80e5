//! # Biodesign Scoring
//!
//! Scoring core for the biodesign expert council: how concept scores are
//! stored, rolled up into weighted totals, ranked, checked for disagreement,
//! and salvaged out of free-form model output.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`Criterion`] / [`CriteriaWeights`] | Closed set of evaluation dimensions and their weights |
//! | [`ScoreStore`] | Append-only concept → score entries mapping |
//! | [`Aggregator`] | Weighted totals, [`ranking`] and [`sensitivity_note`] |
//! | [`DisagreementDetector`] | Flags criteria whose pooled scores spread too far |
//! | [`parser`] | Best-effort extraction of vote payloads and bulleted lists |
//!
//! ## Quick Start
//!
//! ```rust
//! use biodesign_scoring::{parse_vote_payload, Aggregator, ScoreStore};
//!
//! let reply = r#"Sure! [{"concept_title":"Smart cuff","scores":[
//!     {"criterion":"UX","score":4,"rationale":"one-button"}]}]"#;
//!
//! let mut store = ScoreStore::new();
//! for record in parse_vote_payload(reply).records {
//!     store.record(&record.concept_title, record.scores);
//! }
//!
//! let scores = Aggregator::new().score_all(&store);
//! assert_eq!(scores[0].total, 0.48);
//! ```
//!
//! ## Salvage Rules
//!
//! - Model output is untrusted: parsing never fails, it only drops
//! - Unknown criteria and out-of-range scores are dropped per entry
//! - Entries are appended, never overwritten

pub mod aggregate;
pub mod criteria;
pub mod disagreement;
pub mod error;
pub mod parser;
pub mod store;

pub use aggregate::{
    ranking, round4, sensitivity_note, Aggregator, ConceptScore, NO_COMPARISON_NOTE,
    STABILITY_GAP,
};
pub use criteria::{CriteriaWeights, Criterion, WEIGHT_SUM_TOLERANCE};
pub use disagreement::{
    sample_std_dev, CriterionDispersion, DisagreementDetector, DEFAULT_DISPUTE_THRESHOLD,
    MIN_SAMPLES,
};
pub use error::ScoringError;
pub use parser::{
    parse_bullets, parse_lines, parse_vote_payload, truncate_chars, BulletItem, BulletList,
    ParseStatus, VoteParse, VoteRecord,
};
pub use store::{ScoreEntry, ScoreStore};

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoringError>;
