//! The expert panel.
//!
//! Seven personas cover the perspectives a biodesign need has to survive:
//! clinical, engineering, human factors, regulatory, market/finance, IP,
//! and patient/payer. Each persona is sent as the system message of every
//! call made on that expert's behalf.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One expert on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertRole {
    /// Clinical specialist.
    Clinical,
    /// Biomedical engineering and systems integration.
    Engineering,
    /// Human factors and industrial design.
    HumanFactors,
    /// Regulatory and quality.
    Regulatory,
    /// Market and finance.
    MarketFinance,
    /// Intellectual property and freedom to operate.
    Ip,
    /// Patient advocate and reimbursement strategy.
    PatientPayer,
}

impl ExpertRole {
    /// The full panel, in speaking order.
    pub const ALL: [ExpertRole; 7] = [
        ExpertRole::Clinical,
        ExpertRole::Engineering,
        ExpertRole::HumanFactors,
        ExpertRole::Regulatory,
        ExpertRole::MarketFinance,
        ExpertRole::Ip,
        ExpertRole::PatientPayer,
    ];

    /// Stable identifier used in prompts, logs and output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Clinical => "clinical",
            Self::Engineering => "engineering",
            Self::HumanFactors => "human_factors",
            Self::Regulatory => "regulatory",
            Self::MarketFinance => "market_finance",
            Self::Ip => "ip",
            Self::PatientPayer => "patient_payer",
        }
    }

    /// Human-readable title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Clinical => "Clinical specialist",
            Self::Engineering => "Biomedical engineer",
            Self::HumanFactors => "Human-factors designer",
            Self::Regulatory => "Regulatory and quality consultant",
            Self::MarketFinance => "Market and finance advisor",
            Self::Ip => "IP and FTO counsel",
            Self::PatientPayer => "Patient and payer advocate",
        }
    }

    /// System persona describing what this expert does in each stage.
    pub const fn persona(&self) -> &'static str {
        match self {
            Self::Clinical => {
                "You are a clinical specialist. Your tasks:\n\
                 1) Propose 1-2 concepts that resolve a clinical pain point, naming the point of intervention and the expected outcome KPI.\n\
                 2) When critiquing, point out safety, workflow and evidence gaps.\n\
                 3) When revising, propose clinically deployable adjustments and an early validation route (simulation, bench, observational study).\n\
                 Be concise and use bullet points."
            }
            Self::Engineering => {
                "You are a biomedical engineering and systems-integration expert. Your tasks:\n\
                 1) Propose 1-2 concrete technical concepts (architecture, key modules, security and privacy).\n\
                 2) When critiquing, identify feasibility bottlenecks and DFM/DFA risks.\n\
                 3) When revising, lay out a low -> medium -> high fidelity prototype route."
            }
            Self::HumanFactors => {
                "You are a human-factors and industrial-design expert (IEC 62366-1). Your tasks:\n\
                 1) Propose 1-2 concepts that reduce use errors and learning cost.\n\
                 2) When critiquing, address usability and error tolerance.\n\
                 3) When revising, attach a draft human-factors test."
            }
            Self::Regulatory => {
                "You are a regulatory and quality consultant (FDA/CE/TFDA; ISO 13485, ISO 14971, IEC 62304). Your tasks:\n\
                 1) Determine the likely product classification, pathway and principal risks.\n\
                 2) When critiquing, address compliance and clinical-evidence requirements.\n\
                 3) When revising, propose a minimum compliant prototype strategy."
            }
            Self::MarketFinance => {
                "You are a market and finance advisor. Your tasks:\n\
                 1) Propose 1-2 commercially viable concepts (TAM/SAM/SOM, adoption barriers, price band).\n\
                 2) When critiquing, address competitors and procurement risk.\n\
                 3) When revising, give three business-model scenarios (conservative, baseline, aggressive)."
            }
            Self::Ip => {
                "You are an IP and freedom-to-operate counsel. Your tasks:\n\
                 1) Identify patentable elements and potential infringement risks.\n\
                 2) When critiquing, name parts that need design-arounds and the search keywords to use.\n\
                 3) When revising, sharpen the direction of the claims."
            }
            Self::PatientPayer => {
                "You are a patient representative and reimbursement strategist. Your tasks:\n\
                 1) Propose 1-2 concepts that raise patient acceptance and the likelihood of reimbursement.\n\
                 2) When critiquing, address adherence, privacy concerns and cost-effectiveness assumptions.\n\
                 3) When revising, propose a quantitative evaluation design."
            }
        }
    }
}

impl fmt::Display for ExpertRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExpertRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ExpertRole::ALL
            .into_iter()
            .find(|role| role.code() == wanted)
            .ok_or_else(|| format!("unknown expert role: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_panel_has_seven_distinct_roles() {
        let codes: HashSet<&str> = ExpertRole::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn test_every_role_has_persona() {
        for role in ExpertRole::ALL {
            assert!(!role.persona().is_empty());
            assert!(!role.title().is_empty());
        }
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(
            "human-factors".parse::<ExpertRole>().unwrap(),
            ExpertRole::HumanFactors
        );
        assert_eq!("IP".parse::<ExpertRole>().unwrap(), ExpertRole::Ip);
        assert!("janitor".parse::<ExpertRole>().is_err());
    }

    #[test]
    fn test_role_serde_matches_code() {
        for role in ExpertRole::ALL {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.code()));
        }
    }
}
