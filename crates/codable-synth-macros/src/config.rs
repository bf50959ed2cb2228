//! Configuration discovery for macro expansion.
//!
//! Runs on every expansion; nothing is cached between invocations.

use codable_synth_core::{Config, ExpansionContext, SynthesisError};
use std::path::{Path, PathBuf};

/// File names tried in each directory, first match wins.
const CONFIG_CANDIDATES: &[&str] = &["codable-synth.toml", ".codable-synth.toml"];

/// Builds the expansion context for the crate being compiled.
pub(crate) fn load_context() -> Result<ExpansionContext, SynthesisError> {
    let config = match find_config_file() {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    ExpansionContext::new(config)
}

/// Finds the nearest config file, from `CARGO_MANIFEST_DIR` up to the
/// workspace root.
fn find_config_file() -> Option<PathBuf> {
    let manifest_dir = PathBuf::from(std::env::var_os("CARGO_MANIFEST_DIR")?);
    find_config_from(&manifest_dir)
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut candidate = start;
    loop {
        if let Some(found) = CONFIG_CANDIDATES
            .iter()
            .map(|name| candidate.join(name))
            .find(|path| path.is_file())
        {
            return Some(found);
        }
        // A workspace root ends the search.
        if has_workspace_section(&candidate.join("Cargo.toml")) {
            return None;
        }
        candidate = candidate.parent()?;
    }
}

/// Whether the manifest has a `[workspace]` table. Parsed, not grepped, so a
/// commented-out section does not count.
fn has_workspace_section(cargo_toml: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(cargo_toml) else {
        return false;
    };
    let Ok(table) = content.parse::<toml::Table>() else {
        return false;
    };
    table.contains_key("workspace")
}
