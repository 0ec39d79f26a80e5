//! Plain-text rendering of a debate result.

use biodesign_council::DebateOutput;
use biodesign_scoring::{CriteriaWeights, Criterion};
use std::fmt::Write;

/// Renders the ranking, totals, notes and decision narrative.
pub fn render_report(output: &DebateOutput, top_n: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run {}", output.run_id);
    let _ = writeln!(out, "Concepts proposed: {}", output.concepts.len());
    let _ = writeln!(out);

    if output.ranking.is_empty() {
        let _ = writeln!(out, "No concepts were scored.");
    } else {
        let _ = writeln!(out, "Ranking:");
        for (i, title) in output.top(top_n.max(1)).iter().enumerate() {
            let total = output.score_for(title).map(|s| s.total).unwrap_or_default();
            let _ = writeln!(out, "  {}. {} ({:.4})", i + 1, title, total);
        }
        let hidden = output.ranking.len().saturating_sub(top_n.max(1));
        if hidden > 0 {
            let _ = writeln!(out, "  ... {} more", hidden);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", output.sensitivity_note);

    if !output.disputed_criteria.is_empty() {
        let codes: Vec<&str> = output.disputed_criteria.iter().map(Criterion::code).collect();
        let _ = writeln!(out, "Reconciled criteria: {}", codes.join(", "));
    }

    if !output.failed_roles.is_empty() {
        let _ = writeln!(out, "Skipped calls:");
        for failure in &output.failed_roles {
            let _ = writeln!(
                out,
                "  {} / {} ({}): {}",
                failure.stage,
                failure.role.title(),
                failure.role,
                failure.error
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Decision:");
    let _ = writeln!(out, "{}", output.decision_summary.trim());
    out
}

/// Renders the criterion table with the given weights.
pub fn render_criteria(weights: &CriteriaWeights) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16} {:>6}  Description", "Criterion", "Weight");
    for (criterion, weight) in weights.iter() {
        let _ = writeln!(
            out,
            "{:<16} {:>6.2}  {}",
            criterion.code(),
            weight,
            criterion.description()
        );
    }
    let _ = writeln!(out, "{:<16} {:>6.2}", "Total", weights.sum());
    out
}
