//! # Biodesign Council
//!
//! A seven-expert panel that deliberates on a medical-device need through
//! a language model and returns a ranked, scored set of concepts.
//!
//! ## Pipeline
//!
//! ```text
//! Need ──▶ Position ──▶ Critique ──▶ Revise & Vote ──┬──▶ Aggregate ──▶ DebateOutput
//!                                                    │        ▲
//!                                     disputed? ─────┴─▶ Reconciliation (once)
//! ```
//!
//! Every expert is one persona over the same [`LanguageModel`]. Replies are
//! untrusted text: concepts, critiques and scores are salvaged by
//! [`biodesign_scoring`] and never fail a run. Only model calls and
//! configuration do.
//!
//! ## Experts
//!
//! | Code | Focus |
//! |------|-------|
//! | `clinical` | Clinical value, workflow, outcomes |
//! | `engineering` | Feasibility, architecture, manufacturability |
//! | `human_factors` | Usability, use errors, training |
//! | `regulatory` | Classification, predicates, evidence |
//! | `market_finance` | Market size, pricing, unit economics |
//! | `ip` | Patentability and freedom to operate |
//! | `patient_payer` | Patient burden and reimbursement |
//!
//! ## Example
//!
//! ```rust,ignore
//! use biodesign_council::{CouncilConfig, Debate, Need, OpenAiChatModel};
//! use std::sync::Arc;
//!
//! let config = CouncilConfig::default();
//! let model = Arc::new(OpenAiChatModel::new(&config.model, api_key)?);
//! let debate = Debate::new(&config, model)?;
//!
//! let output = debate.run(&Need::new("Reduce catheter infections"), 3).await?;
//! for title in output.top(3) {
//!     println!("{}", title);
//! }
//! ```

pub mod config;
pub mod debate;
pub mod error;
pub mod experts;
pub mod model;
pub mod prompts;
pub mod record;
pub mod stage;

pub use config::{CouncilConfig, DebateSettings, ModelConfig, ReconciliationConfig};
pub use debate::Debate;
pub use error::{DebateError, ModelError};
pub use experts::ExpertRole;
pub use model::{CompletionRequest, LanguageModel, OpenAiChatModel, RetryingModel};
pub use record::{Concept, DebateOutput, Need, RoleFailure};
pub use stage::Stage;

/// Result type for council operations.
pub type Result<T> = std::result::Result<T, DebateError>;
