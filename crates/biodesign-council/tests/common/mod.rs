//! Shared helpers for orchestrator tests.

#![allow(dead_code)]

use async_trait::async_trait;
use biodesign_council::{CompletionRequest, LanguageModel, ModelError, Stage};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory model answering from a script keyed by stage and role.
///
/// Role-specific replies win over stage defaults; unscripted calls get an
/// empty string. Every request is recorded.
#[derive(Default)]
pub struct ScriptedModel {
    by_stage: HashMap<Stage, String>,
    by_role: HashMap<(Stage, String), String>,
    failing: HashSet<(Stage, String)>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply for every call in `stage`.
    pub fn reply(mut self, stage: Stage, text: &str) -> Self {
        self.by_stage.insert(stage, text.to_string());
        self
    }

    /// Reply for one role in `stage`.
    pub fn reply_for(mut self, stage: Stage, role: &str, text: &str) -> Self {
        self.by_role
            .insert((stage, role.to_string()), text.to_string());
        self
    }

    /// Makes calls for `role` in `stage` fail with a server error.
    pub fn fail(mut self, stage: Stage, role: &str) -> Self {
        self.failing.insert((stage, role.to_string()));
        self
    }

    /// Every request seen so far.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests seen in `stage`.
    pub fn calls_in(&self, stage: Stage) -> usize {
        self.calls().iter().filter(|c| c.stage == stage).count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(request.clone());

        let key = (request.stage, request.role.clone());
        if self.failing.contains(&key) {
            return Err(ModelError::Status {
                status: 500,
                body: "scripted failure".to_string(),
            });
        }

        Ok(self
            .by_role
            .get(&key)
            .or_else(|| self.by_stage.get(&request.stage))
            .cloned()
            .unwrap_or_default())
    }
}

/// Vote payload scoring one concept on every criterion, in canonical
/// order: CLINICAL_VALUE, TECH_FEAS, UX, REG_PATH, MARKET, FINANCE,
/// IP_FTO, PAYER.
pub fn vote_json(title: &str, scores: [f64; 8]) -> String {
    let codes = [
        "CLINICAL_VALUE",
        "TECH_FEAS",
        "UX",
        "REG_PATH",
        "MARKET",
        "FINANCE",
        "IP_FTO",
        "PAYER",
    ];
    let entries: Vec<serde_json::Value> = codes
        .iter()
        .zip(scores)
        .map(|(code, score)| {
            serde_json::json!({ "criterion": code, "score": score, "rationale": "scripted" })
        })
        .collect();
    serde_json::json!([{ "concept_title": title, "scores": entries }]).to_string()
}
