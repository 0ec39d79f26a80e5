//! Evaluation criteria and their relative weights.
//!
//! Every concept is judged on the same closed set of eight dimensions.
//! Each dimension carries a fixed weight and the weights must add up to
//! 1.0, so a concept scored 5 on every criterion totals exactly 5.
//!
//! | Code | Weight | Dimension |
//! |------|--------|-----------|
//! | `CLINICAL_VALUE` | 0.22 | Clinical benefit and evidence potential |
//! | `TECH_FEAS` | 0.18 | Technical feasibility |
//! | `UX` | 0.12 | Usability and use-error tolerance |
//! | `REG_PATH` | 0.15 | Regulatory pathway |
//! | `MARKET` | 0.12 | Market attractiveness |
//! | `FINANCE` | 0.08 | Financial viability |
//! | `IP_FTO` | 0.08 | Patentability and freedom to operate |
//! | `PAYER` | 0.05 | Reimbursement and patient acceptance |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScoringError;
use crate::Result;

/// Accepted deviation of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// One evaluation dimension.
///
/// Serialized as its upper-case code (`CLINICAL_VALUE`, `UX`, ...), which is
/// also the form models are asked to emit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criterion {
    /// Clinical value.
    ClinicalValue,
    /// Technical feasibility.
    TechFeas,
    /// User experience / human factors.
    Ux,
    /// Regulatory pathway.
    RegPath,
    /// Market.
    Market,
    /// Finance.
    Finance,
    /// IP and freedom to operate.
    IpFto,
    /// Payer / reimbursement.
    Payer,
}

impl Criterion {
    /// All criteria in canonical order.
    pub const ALL: [Criterion; 8] = [
        Criterion::ClinicalValue,
        Criterion::TechFeas,
        Criterion::Ux,
        Criterion::RegPath,
        Criterion::Market,
        Criterion::Finance,
        Criterion::IpFto,
        Criterion::Payer,
    ];

    /// Returns the wire code of this criterion.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ClinicalValue => "CLINICAL_VALUE",
            Self::TechFeas => "TECH_FEAS",
            Self::Ux => "UX",
            Self::RegPath => "REG_PATH",
            Self::Market => "MARKET",
            Self::Finance => "FINANCE",
            Self::IpFto => "IP_FTO",
            Self::Payer => "PAYER",
        }
    }

    /// Short human-readable description.
    pub const fn description(&self) -> &'static str {
        match self {
            Self::ClinicalValue => "Clinical benefit and strength of expected evidence",
            Self::TechFeas => "Technical feasibility and manufacturability",
            Self::Ux => "Usability, learnability and use-error tolerance",
            Self::RegPath => "Clarity and cost of the regulatory pathway",
            Self::Market => "Market size and adoption barriers",
            Self::Finance => "Pricing, margins and business-model viability",
            Self::IpFto => "Patentability and freedom to operate",
            Self::Payer => "Reimbursement likelihood and patient acceptance",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Criterion {
    type Err = ScoringError;

    /// Parses a criterion code. Surrounding whitespace and letter case are
    /// ignored; anything else must match a code exactly.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        Criterion::ALL
            .into_iter()
            .find(|c| c.code() == normalized)
            .ok_or_else(|| ScoringError::UnknownCriterion(s.to_string()))
    }
}

/// Weight table over all criteria.
///
/// Deserializes from a map keyed by criterion code; missing keys keep
/// their default weight. Call [`CriteriaWeights::validate`] before use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaWeights {
    #[serde(rename = "CLINICAL_VALUE")]
    pub clinical_value: f64,
    #[serde(rename = "TECH_FEAS")]
    pub tech_feas: f64,
    #[serde(rename = "UX")]
    pub ux: f64,
    #[serde(rename = "REG_PATH")]
    pub reg_path: f64,
    #[serde(rename = "MARKET")]
    pub market: f64,
    #[serde(rename = "FINANCE")]
    pub finance: f64,
    #[serde(rename = "IP_FTO")]
    pub ip_fto: f64,
    #[serde(rename = "PAYER")]
    pub payer: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            clinical_value: 0.22,
            tech_feas: 0.18,
            ux: 0.12,
            reg_path: 0.15,
            market: 0.12,
            finance: 0.08,
            ip_fto: 0.08,
            payer: 0.05,
        }
    }
}

impl CriteriaWeights {
    /// Returns the weight assigned to `criterion`.
    pub fn weight(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::ClinicalValue => self.clinical_value,
            Criterion::TechFeas => self.tech_feas,
            Criterion::Ux => self.ux,
            Criterion::RegPath => self.reg_path,
            Criterion::Market => self.market,
            Criterion::Finance => self.finance,
            Criterion::IpFto => self.ip_fto,
            Criterion::Payer => self.payer,
        }
    }

    /// Iterates `(criterion, weight)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL.into_iter().map(|c| (c, self.weight(c)))
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, w)| w).sum()
    }

    /// Checks the table invariants.
    ///
    /// # Errors
    ///
    /// - [`ScoringError::InvalidWeight`] if any weight is outside `[0, 1]`
    /// - [`ScoringError::WeightSum`] if the weights do not sum to 1.0
    ///   within [`WEIGHT_SUM_TOLERANCE`]
    pub fn validate(&self) -> Result<()> {
        for (criterion, weight) in self.iter() {
            if !(0.0..=1.0).contains(&weight) {
                return Err(ScoringError::InvalidWeight { criterion, weight });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::WeightSum {
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        Ok(())
    }
}
