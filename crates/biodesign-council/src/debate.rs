//! The debate orchestrator.
//!
//! [`Debate::run`] drives one deliberation over a fixed stage sequence:
//!
//! 1. **Position**: every expert proposes concepts
//! 2. **Critique**: every expert critiques a digest of the concepts
//! 3. **Revise-and-vote**: every expert suggests revisions and scores
//! 4. **Reconciliation**: one consolidated re-score, only when criteria
//!    are disputed
//! 5. **Aggregate**: weighted totals, ranking and the decision narrative
//!
//! Calls are awaited one at a time; stages never overlap. All working
//! state lives inside a single `run` call.

use biodesign_scoring::{
    parse_bullets, parse_lines, parse_vote_payload, ranking, sensitivity_note, truncate_chars,
    Aggregator, Criterion, DisagreementDetector, ParseStatus, ScoreStore, VoteParse,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{CouncilConfig, DebateSettings};
use crate::error::DebateError;
use crate::experts::ExpertRole;
use crate::model::{CompletionRequest, LanguageModel};
use crate::prompts::{self, MODERATOR, MODERATOR_PERSONA};
use crate::record::{Concept, DebateOutput, Need, RoleFailure};
use crate::stage::Stage;
use crate::Result;

/// Orchestrates the expert panel over one need at a time.
///
/// # Example
///
/// ```rust,ignore
/// let model = Arc::new(OpenAiChatModel::new(&config.model, api_key)?);
/// let debate = Debate::new(&config, model)?;
///
/// let output = debate.run(&Need::new("Prevent pressure ulcers"), 3).await?;
/// println!("winner: {:?}", output.winner());
/// ```
pub struct Debate {
    /// Backend answering every call.
    model: Arc<dyn LanguageModel>,

    /// Experts on the panel, in invocation order.
    roles: Vec<ExpertRole>,

    /// Stage settings.
    settings: DebateSettings,

    /// Whether the reconciliation call may run.
    reconciliation: bool,

    /// Weighted totals.
    aggregator: Aggregator,

    /// Dispute detection over pooled scores.
    detector: DisagreementDetector,
}

/// Mutable state of one run.
struct RunState {
    run_id: Uuid,
    concepts: Vec<Concept>,
    critiques: BTreeMap<String, Vec<String>>,
    store: ScoreStore,
    failures: Vec<RoleFailure>,
}

impl Debate {
    /// Creates an orchestrator with all seven experts.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails
    /// [`CouncilConfig::validate`]. A weight table that does not sum to
    /// 1.0 surfaces as [`DebateError::Scoring`].
    pub fn new(config: &CouncilConfig, model: Arc<dyn LanguageModel>) -> Result<Self> {
        config.validate()?;

        let aggregator = Aggregator::with_weights(config.weights)?;
        let detector =
            DisagreementDetector::with_threshold(config.reconciliation.dispute_threshold)?;

        info!(
            "Debate initialized with model '{}' (dispute threshold {}, reconciliation {})",
            model.name(),
            detector.threshold(),
            if config.reconciliation.enabled { "on" } else { "off" }
        );

        Ok(Self {
            model,
            roles: ExpertRole::ALL.to_vec(),
            settings: config.debate.clone(),
            reconciliation: config.reconciliation.enabled,
            aggregator,
            detector,
        })
    }

    /// Restricts the panel to `roles`, keeping their order and dropping
    /// repeats.
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = ExpertRole>) -> Self {
        let mut seen = HashSet::new();
        self.roles = roles.into_iter().filter(|r| seen.insert(*r)).collect();
        self
    }

    /// Experts on the panel, in invocation order.
    pub fn roles(&self) -> &[ExpertRole] {
        &self.roles
    }

    /// Runs the full deliberation for `need`.
    ///
    /// `top_n` bounds the shortlist handed to the decision call; it is
    /// clamped to the ranking length and never drops below 1.
    ///
    /// # Errors
    ///
    /// [`DebateError::Invocation`] when a model call fails. Expert calls
    /// are skipped instead when `tolerate_role_failures` is set; the
    /// reconciliation and decision calls always propagate.
    pub async fn run(&self, need: &Need, top_n: usize) -> Result<DebateOutput> {
        let mut state = RunState {
            run_id: Uuid::new_v4(),
            concepts: Vec::new(),
            critiques: BTreeMap::new(),
            store: ScoreStore::new(),
            failures: Vec::new(),
        };

        info!(
            "Debate {} starting: {} experts, {} nominal rounds",
            state.run_id,
            self.roles.len(),
            self.settings.rounds
        );

        self.position_stage(need, &mut state).await?;
        self.critique_stage(need, &mut state).await?;
        self.revise_vote_stage(need, &mut state).await?;
        let disputed = self.reconciliation_stage(need, &mut state).await?;
        self.aggregate_stage(need, top_n, disputed, state).await
    }

    /// Stage 1: harvest concepts from every expert.
    async fn position_stage(&self, need: &Need, state: &mut RunState) -> Result<()> {
        for &role in &self.roles {
            let prompt = prompts::position(role, need);
            let Some(reply) = self
                .ask_role(Stage::Position, role, prompt, &mut state.failures)
                .await?
            else {
                continue;
            };

            let list = parse_bullets(&reply);
            if !list.structured {
                debug!("{} reply had no list markers; taken as one concept", role);
            }

            for item in list.items {
                if state.concepts.iter().any(|c| c.title == item.title) {
                    debug!("Dropping duplicate concept '{}' from {}", item.title, role);
                    continue;
                }
                state
                    .concepts
                    .push(Concept::new(item.title, item.body, role));
            }
        }

        for concept in &state.concepts {
            state.critiques.entry(concept.title.clone()).or_default();
        }

        info!(
            "Debate {}: {} concepts proposed",
            state.run_id,
            state.concepts.len()
        );
        Ok(())
    }

    /// Stage 2: collect critiques over the concept digest.
    async fn critique_stage(&self, need: &Need, state: &mut RunState) -> Result<()> {
        let digest = concept_digest(&state.concepts, &self.settings);

        for &role in &self.roles {
            let prompt = prompts::critique(role, need, &digest);
            let Some(reply) = self
                .ask_role(Stage::Critique, role, prompt, &mut state.failures)
                .await?
            else {
                continue;
            };

            for line in parse_lines(&reply) {
                attach_critique(&state.concepts, &mut state.critiques, line);
            }
        }

        let total: usize = state.critiques.values().map(Vec::len).sum();
        info!("Debate {}: {} critiques collected", state.run_id, total);
        Ok(())
    }

    /// Stage 3: revisions and scores from every expert.
    async fn revise_vote_stage(&self, need: &Need, state: &mut RunState) -> Result<()> {
        let summary = vote_summary(&state.concepts, &state.critiques, &self.settings);

        for &role in &self.roles {
            let prompt = prompts::revise_vote(role, need, &summary);
            let Some(reply) = self
                .ask_role(Stage::ReviseVote, role, prompt, &mut state.failures)
                .await?
            else {
                continue;
            };

            let parsed = parse_vote_payload(&reply);
            log_parse(Stage::ReviseVote, role.code(), &parsed);

            for record in parsed.records {
                let title = canonical_title(&state.concepts, &record.concept_title);
                let recorded = state.store.record(&title, record.scores);
                debug!("{} scored '{}' with {} entries", role, title, recorded);
                attach_revisions(&mut state.concepts, &title, record.revisions);
            }
        }

        info!(
            "Debate {}: {} score entries over {} concepts",
            state.run_id,
            state.store.entry_count(),
            state.store.len()
        );
        Ok(())
    }

    /// Stage 4: one consolidated re-score when the panel disagrees.
    ///
    /// Returns the criteria that triggered the call, or nothing when it
    /// did not run.
    async fn reconciliation_stage(
        &self,
        need: &Need,
        state: &mut RunState,
    ) -> Result<Vec<Criterion>> {
        let disputed = self.detector.disputed(&state.store);
        if disputed.is_empty() {
            debug!("Debate {}: no disputed criteria", state.run_id);
            return Ok(disputed);
        }

        let codes: Vec<&str> = disputed.iter().map(Criterion::code).collect();
        if !self.reconciliation {
            info!(
                "Debate {}: disputed criteria {:?} left as-is (reconciliation off)",
                state.run_id, codes
            );
            return Ok(Vec::new());
        }

        info!(
            "Debate {}: reconciling disputed criteria {:?}",
            state.run_id, codes
        );

        let titles: Vec<String> = if state.concepts.is_empty() {
            state.store.iter().map(|(id, _)| id.to_string()).collect()
        } else {
            state.concepts.iter().map(|c| c.title.clone()).collect()
        };
        let prompt = prompts::reconciliation(need, &disputed, &titles);
        let reply = self.ask_moderator(Stage::Reconciliation, prompt).await?;

        let parsed = parse_vote_payload(&reply);
        log_parse(Stage::Reconciliation, MODERATOR, &parsed);

        for record in parsed.records {
            let entries = record
                .scores
                .into_iter()
                .filter(|entry| disputed.contains(&entry.criterion));
            let title = canonical_title(&state.concepts, &record.concept_title);
            state.store.record(&title, entries);
        }

        Ok(disputed)
    }

    /// Stage 5: totals, ranking and the decision narrative.
    async fn aggregate_stage(
        &self,
        need: &Need,
        top_n: usize,
        disputed: Vec<Criterion>,
        state: RunState,
    ) -> Result<DebateOutput> {
        let scores = self.aggregator.score_all(&state.store);
        let totals = || scores.iter().map(|s| (s.concept_title.as_str(), s.total));
        let ranked = ranking(totals());
        let note = sensitivity_note(totals());

        let shortlist = top_n.min(ranked.len()).max(1);
        let prompt = prompts::decision(need, shortlist, &ranked, &scores);
        let decision_summary = self.ask_moderator(Stage::Decision, prompt).await?;

        match ranked.first() {
            Some(winner) => info!(
                "Debate {} complete: '{}' leads {} ranked concepts",
                state.run_id,
                winner,
                ranked.len()
            ),
            None => warn!("Debate {} complete with no scored concepts", state.run_id),
        }

        Ok(DebateOutput {
            run_id: state.run_id,
            concepts: state.concepts,
            critiques: state.critiques,
            scores,
            ranking: ranked,
            sensitivity_note: note,
            disputed_criteria: disputed,
            failed_roles: state.failures,
            decision_summary,
        })
    }

    /// Invokes the model as one expert.
    ///
    /// Returns `None` when the call failed and failures are tolerated.
    async fn ask_role(
        &self,
        stage: Stage,
        role: ExpertRole,
        prompt: String,
        failures: &mut Vec<RoleFailure>,
    ) -> Result<Option<String>> {
        debug!("{} call for {}", stage, role);
        let request = CompletionRequest::new(stage, role.code(), prompt).with_system(role.persona());

        match self.model.complete(&request).await {
            Ok(reply) => Ok(Some(reply)),
            Err(source) if self.settings.tolerate_role_failures && stage.is_per_role() => {
                warn!("{} call for {} failed, skipping: {}", stage, role, source);
                failures.push(RoleFailure {
                    stage,
                    role,
                    error: source.to_string(),
                });
                Ok(None)
            }
            Err(source) => Err(DebateError::Invocation {
                stage,
                role: role.code().to_string(),
                source,
            }),
        }
    }

    /// Invokes the model as the moderator. Failures always propagate.
    async fn ask_moderator(&self, stage: Stage, prompt: String) -> Result<String> {
        debug!("{} call for {}", stage, MODERATOR);
        let request = CompletionRequest::new(stage, MODERATOR, prompt).with_system(MODERATOR_PERSONA);

        self.model
            .complete(&request)
            .await
            .map_err(|source| DebateError::Invocation {
                stage,
                role: MODERATOR.to_string(),
                source,
            })
    }
}

fn log_parse(stage: Stage, role: &str, parsed: &VoteParse) {
    match parsed.status {
        ParseStatus::Parsed => debug!(
            "{} payload from {}: {} records, {} entries ({} records and {} entries dropped)",
            stage,
            role,
            parsed.records.len(),
            parsed.entry_count(),
            parsed.dropped_records,
            parsed.dropped_entries
        ),
        ParseStatus::NoArray => warn!("{} reply from {} held no JSON array", stage, role),
        ParseStatus::Malformed => warn!("{} reply from {} held a malformed array", stage, role),
    }
}

/// `- title: description` lines for the first concepts, descriptions cut
/// to the digest budget.
fn concept_digest(concepts: &[Concept], settings: &DebateSettings) -> String {
    if concepts.is_empty() {
        return "(no concepts proposed)".to_string();
    }
    concepts
        .iter()
        .take(settings.digest_concepts)
        .map(|c| {
            format!(
                "- {}: {}",
                c.title,
                truncate_chars(&c.description, settings.digest_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `- title: key critiques = a; b; c` lines for every concept.
fn vote_summary(
    concepts: &[Concept],
    critiques: &BTreeMap<String, Vec<String>>,
    settings: &DebateSettings,
) -> String {
    if concepts.is_empty() {
        return "(no concepts proposed)".to_string();
    }
    concepts
        .iter()
        .map(|c| {
            let picked: Vec<&str> = critiques
                .get(&c.title)
                .into_iter()
                .flatten()
                .take(settings.summary_critiques)
                .map(String::as_str)
                .collect();
            let joined = if picked.is_empty() {
                "none".to_string()
            } else {
                picked.join("; ")
            };
            format!("- {}: key critiques = {}", c.title, joined)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Attaches a critique line to every concept it names (case-insensitive),
/// or to all concepts when it names none. Repeats are skipped.
fn attach_critique(
    concepts: &[Concept],
    critiques: &mut BTreeMap<String, Vec<String>>,
    line: String,
) {
    let lowered = line.to_lowercase();
    let named: Vec<&Concept> = concepts
        .iter()
        .filter(|c| lowered.contains(&c.title.to_lowercase()))
        .collect();
    let targets = if named.is_empty() {
        concepts.iter().collect()
    } else {
        named
    };

    for concept in targets {
        let list = critiques.entry(concept.title.clone()).or_default();
        if !list.contains(&line) {
            list.push(line.clone());
        }
    }
}

/// Position of the proposed concept matching `title`, trimmed and
/// case-insensitive.
fn concept_index(concepts: &[Concept], title: &str) -> Option<usize> {
    let wanted = title.trim().to_lowercase();
    concepts
        .iter()
        .position(|c| c.title.to_lowercase() == wanted)
}

/// Store key for a voted title: the proposed concept's own title when one
/// matches, otherwise the voter's title as sent.
fn canonical_title(concepts: &[Concept], title: &str) -> String {
    match concept_index(concepts, title) {
        Some(idx) => concepts[idx].title.clone(),
        None => title.trim().to_string(),
    }
}

/// Appends revision suggestions to the concept matching `title`
/// (case-insensitive). Suggestions for unknown titles are dropped.
fn attach_revisions(concepts: &mut [Concept], title: &str, revisions: Vec<String>) {
    if revisions.is_empty() {
        return;
    }
    let Some(idx) = concept_index(concepts, title) else {
        debug!("Ignoring revisions for unknown concept '{}'", title);
        return;
    };
    let concept = &mut concepts[idx];
    for revision in revisions {
        if !concept.revisions.contains(&revision) {
            concept.revisions.push(revision);
        }
    }
}
