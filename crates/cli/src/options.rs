//! Compile options from an optional TOML file plus command-line overrides.

use combo_core::CompileOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub(crate) enum OptionsError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load options from `config` when given, defaults otherwise, then apply
/// `max_branches` on top.
pub(crate) fn resolve(
    config: Option<&Path>,
    max_branches: Option<usize>,
) -> Result<CompileOptions, OptionsError> {
    let mut options = match config {
        Some(path) => load(path)?,
        None => CompileOptions::default(),
    };
    if let Some(max) = max_branches {
        options.max_branches = max;
    }
    tracing::debug!(max_branches = options.max_branches, "resolved compile options");
    Ok(options)
}

fn load(path: &Path) -> Result<CompileOptions, OptionsError> {
    let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| OptionsError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
