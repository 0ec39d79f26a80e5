//! Prompt rendering for each stage.
//!
//! Every prompt opens with the rendered [`Need`] block. The vote and
//! reconciliation prompts spell out the JSON shape the parser salvages.

use biodesign_scoring::{ConceptScore, Criterion};

use crate::experts::ExpertRole;
use crate::record::Need;

/// System persona for consolidated (non-role) calls.
pub const MODERATOR_PERSONA: &str = "You are the moderator of a biodesign expert panel. \
You consolidate the views of clinical, engineering, human-factors, regulatory, \
market/finance, IP and patient/payer experts into rigorous, concise conclusions.";

/// Role label used for consolidated calls in logs and errors.
pub const MODERATOR: &str = "moderator";

fn criteria_codes(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .map(Criterion::code)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Asks one expert for 1-2 concepts.
pub fn position(role: ExpertRole, need: &Need) -> String {
    format!(
        "{need}\n\n\
         Acting as role: {role}, propose 1-2 concepts. For each concept give:\n\
         - a title\n\
         - a one-sentence description\n\
         - three key arguments or assumptions\n\
         Start every concept with \"- \" followed by its title on its own line, \
         and indent the supporting lines beneath it. Output the list only.",
        need = need.render(),
        role = role.code(),
    )
}

/// Asks one expert to critique the concept digest.
pub fn critique(role: ExpertRole, need: &Need, digest: &str) -> String {
    format!(
        "{need}\n\n\
         Summary of the concepts proposed by the panel (title: key points):\n\
         {digest}\n\n\
         Acting as role: {role}, give the 2-3 most critical risks, limitations \
         or validation gaps for each concept. Name the concept in each point. \
         Output bullet points only.",
        need = need.render(),
        role = role.code(),
        digest = digest,
    )
}

/// Asks one expert for revisions and 0-5 scores on every criterion.
pub fn revise_vote(role: ExpertRole, need: &Need, summary: &str) -> String {
    format!(
        "{need}\n\n\
         Concepts and their main critiques:\n\
         {summary}\n\n\
         Acting as role: {role}, for every concept:\n\
         1) suggest up to 3 revisions\n\
         2) score it 0-5 on each of the following criteria, with a one-sentence rationale:\n\
         \u{20}  {codes}\n\
         Output a JSON array:\n\
         [\n \
         {{\"concept_title\": \"...\", \"revisions\": [\"...\"],\n   \
         \"scores\": [{{\"criterion\": \"CLINICAL_VALUE\", \"score\": 3, \"rationale\": \"...\"}}, ...]}},\n \
         ...\n\
         ]",
        need = need.render(),
        role = role.code(),
        summary = summary,
        codes = criteria_codes(&Criterion::ALL),
    )
}

/// Asks for one consolidated re-score of the disputed criteria.
pub fn reconciliation(need: &Need, disputed: &[Criterion], concept_titles: &[String]) -> String {
    let titles = concept_titles
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{need}\n\n\
         Concepts under evaluation:\n\
         {titles}\n\n\
         The panel disagrees strongly (high standard deviation) on: {disputed}\n\
         Re-score every concept on those criteria only, each with a one-sentence rationale. \
         Output a JSON array:\n\
         [\n \
         {{\"concept_title\": \"...\", \"scores\": [{{\"criterion\": \"{example}\", \"score\": 3, \"rationale\": \"...\"}}, ...]}}\n\
         ]",
        need = need.render(),
        titles = titles,
        disputed = criteria_codes(disputed),
        example = disputed.first().copied().unwrap_or(Criterion::TechFeas),
    )
}

/// Asks for the decision narrative over the weighted ranking.
pub fn decision(need: &Need, top_n: usize, ranking: &[String], scores: &[ConceptScore]) -> String {
    let shortlist = ranking
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, title)| format!("{}. {}", i + 1, title))
        .collect::<Vec<_>>()
        .join("\n");
    let totals = scores
        .iter()
        .map(|s| format!("- {}: {:.4}", s.concept_title, s.total))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{need}\n\n\
         Ranking (weighted totals, 0-5):\n\
         {shortlist}\n\n\
         All totals:\n\
         {totals}\n\n\
         Consolidate the weighted scores. List the top-{top_n} concept titles with reasons, then give:\n\
         - the next prototype and validation plan (low -> medium -> high fidelity)\n\
         - risks and mitigations\n\
         - the key evidence still to collect\n\
         Output bullet points only; be concise and rigorous.",
        need = need.render(),
        shortlist = shortlist,
        totals = totals,
        top_n = top_n,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn need() -> Need {
        Need::new("Prevent intradialytic hypotension")
    }

    #[test]
    fn test_position_prompt_names_role() {
        let prompt = position(ExpertRole::Regulatory, &need());
        assert!(prompt.starts_with("[Need]\nPrevent intradialytic hypotension"));
        assert!(prompt.contains("role: regulatory"));
    }

    #[test]
    fn test_critique_prompt_includes_digest() {
        let prompt = critique(ExpertRole::Ip, &need(), "- Cuff: predicts drops");
        assert!(prompt.contains("- Cuff: predicts drops"));
        assert!(prompt.contains("role: ip"));
    }

    #[test]
    fn test_revise_vote_prompt_lists_all_criteria() {
        let prompt = revise_vote(ExpertRole::Clinical, &need(), "- Cuff: key critiques = none");
        for criterion in Criterion::ALL {
            assert!(prompt.contains(criterion.code()));
        }
        assert!(prompt.contains("\"concept_title\""));
    }

    #[test]
    fn test_reconciliation_prompt_restricted_to_disputed() {
        let prompt = reconciliation(
            &need(),
            &[Criterion::Market, Criterion::Payer],
            &["Cuff".to_string()],
        );
        assert!(prompt.contains("on: MARKET, PAYER"));
        assert!(prompt.contains("- Cuff"));
        assert!(!prompt.contains("CLINICAL_VALUE"));
    }

    #[test]
    fn test_decision_prompt_shortlist() {
        let ranking = vec!["B".to_string(), "A".to_string(), "C".to_string()];
        let scores = vec![ConceptScore {
            concept_title: "B".to_string(),
            entries: Vec::new(),
            total: 3.25,
        }];
        let prompt = decision(&need(), 2, &ranking, &scores);
        assert!(prompt.contains("1. B\n2. A"));
        assert!(!prompt.contains("3. C"));
        assert!(prompt.contains("- B: 3.2500"));
        assert!(prompt.contains("top-2"));
    }
}
