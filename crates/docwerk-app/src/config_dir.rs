// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Locating and loading the engine configuration file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use docwerk_core::EngineConfig;
use tracing::{debug, info};

use crate::error::CliError;

/// `$XDG_CONFIG_HOME/docwerk/config.json`, falling back to
/// `$HOME/.config/docwerk/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    config_base(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
    .map(|base| base.join("docwerk").join("config.json"))
}

fn config_base(xdg: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(xdg) = xdg.filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    home.filter(|value| !value.is_empty())
        .map(|home| PathBuf::from(home).join(".config"))
}

/// Load the config named on the command line, else the default file if it
/// exists, else built-in defaults. An explicitly named file must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<EngineConfig, CliError> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "Loading configuration");
        return Ok(EngineConfig::load(path)?);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            info!(path = %path.display(), "Loading configuration");
            Ok(EngineConfig::load(&path)?)
        }
        _ => {
            debug!("No configuration file, using defaults");
            Ok(EngineConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let base = config_base(Some("/xdg".into()), Some("/home/me".into()));
        assert_eq!(base, Some(PathBuf::from("/xdg")));
    }

    #[test]
    fn empty_xdg_falls_back_to_home() {
        let base = config_base(Some("".into()), Some("/home/me".into()));
        assert_eq!(base, Some(PathBuf::from("/home/me/.config")));
        assert_eq!(config_base(None, None), None);
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("docwerk.json");
        std::fs::write(&path, r#"{"wrapper_fragment_len":16}"#).expect("write");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.wrapper_fragment_len, 16);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_config(Some(&missing)),
            Err(CliError::Config(_))
        ));
    }
}
