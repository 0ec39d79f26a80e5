//! Biodesign Council CLI - run the expert panel from the command line

mod load;
mod report;

use anyhow::{Context, Result};
use biodesign_council::{Debate, ExpertRole, LanguageModel, OpenAiChatModel, RetryingModel};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "biodesign")]
#[command(about = "Biodesign Council - multi-expert concept deliberation for medical-device needs")]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run a full deliberation on a need
    Run {
        /// Need file (TOML, or JSON by extension)
        #[arg(short, long)]
        need: PathBuf,

        /// Configuration file path (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Concepts shortlisted for the decision narrative
        #[arg(long, default_value_t = 3)]
        top_n: usize,

        /// Restrict the panel to these experts (comma separated)
        #[arg(long, value_delimiter = ',')]
        roles: Vec<ExpertRole>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check configuration validity
    Check {
        /// Configuration file path (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the evaluation criteria and their weights
    Criteria {
        /// Configuration file path (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            need,
            config,
            top_n,
            roles,
            json,
        } => run(need, config, top_n, roles, json).await,
        Commands::Check { config } => {
            let config = load::load_config(config.as_deref())?;
            config.validate()?;
            println!(
                "Configuration OK: model '{}', weights sum to {:.3}, reconciliation {}",
                config.model.name,
                config.weights.sum(),
                if config.reconciliation.enabled { "on" } else { "off" }
            );
            Ok(())
        }
        Commands::Criteria { config } => {
            let config = load::load_config(config.as_deref())?;
            print!("{}", report::render_criteria(&config.weights));
            Ok(())
        }
    }
}

async fn run(
    need_path: PathBuf,
    config_path: Option<PathBuf>,
    top_n: usize,
    roles: Vec<ExpertRole>,
    json: bool,
) -> Result<()> {
    let config = load::load_config(config_path.as_deref())?;
    let need = load::load_need(&need_path)?;

    let api_key = std::env::var(&config.model.api_key_env).unwrap_or_default();
    let client = OpenAiChatModel::new(&config.model, api_key).with_context(|| {
        format!(
            "Set {} to call {}",
            config.model.api_key_env, config.model.base_url
        )
    })?;

    let model: Arc<dyn LanguageModel> = if config.model.max_retries > 0 {
        Arc::new(RetryingModel::from_config(client, &config.model))
    } else {
        Arc::new(client)
    };

    let mut debate = Debate::new(&config, model)?;
    if !roles.is_empty() {
        debate = debate.with_roles(roles);
    }

    info!("Deliberating on {:?} with {} experts", need_path, debate.roles().len());
    let output = debate.run(&need, top_n).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report::render_report(&output, top_n));
    }
    Ok(())
}
