//! Loading configuration and need files.

use anyhow::{bail, Context, Result};
use biodesign_council::{CouncilConfig, Need};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parses `path` as JSON when it has a `.json` extension, TOML otherwise.
fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    if is_json(path) {
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse JSON: {:?}", path))
    } else {
        toml::from_str(&contents).with_context(|| format!("Failed to parse TOML: {:?}", path))
    }
}

/// Loads the council configuration, or the defaults when no path is given.
///
/// Missing sections and fields take their default values.
pub fn load_config(path: Option<&Path>) -> Result<CouncilConfig> {
    match path {
        Some(path) => {
            let config: CouncilConfig = parse_file(path)?;
            debug!("Configuration loaded from {:?}", path);
            Ok(config)
        }
        None => {
            debug!("No configuration file given, using defaults");
            Ok(CouncilConfig::default())
        }
    }
}

/// Loads a need file (TOML, or JSON by extension).
pub fn load_need(path: &Path) -> Result<Need> {
    let need: Need = parse_file(path)?;
    if need.statement.trim().is_empty() {
        bail!("Need file {:?} has an empty statement", path);
    }
    Ok(need)
}
