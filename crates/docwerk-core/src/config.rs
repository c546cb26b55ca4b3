// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocwerkError, Result};

/// Tunables shared by the coordinator and the operation handlers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name given to the background execution thread.
    pub context_thread_name: String,
    /// Inset in points between a corner watermark and the page edges.
    pub watermark_corner_inset: f32,
    /// Base width in points for `PageSize::Auto` pages.
    pub auto_page_base_width: f32,
    /// Number of leading input bytes embedded in a password wrapper.
    pub wrapper_fragment_len: usize,
    /// Producer string written into generated documents.
    pub producer: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_thread_name: "docwerk-context".into(),
            watermark_corner_inset: 20.0,
            auto_page_base_width: 595.28,
            wrapper_fragment_len: 1024,
            producer: "Docwerk".into(),
        }
    }
}

impl EngineConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.watermark_corner_inset < 0.0 {
            return Err(DocwerkError::Config(
                "watermark_corner_inset must not be negative".into(),
            ));
        }
        if self.auto_page_base_width <= 0.0 {
            return Err(DocwerkError::Config(
                "auto_page_base_width must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");

        let config = EngineConfig {
            wrapper_fragment_len: 64,
            ..EngineConfig::default()
        };
        config.save(&path).expect("save");

        let loaded = EngineConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"producer":"Test"}"#).expect("write");

        let loaded = EngineConfig::load(&path).expect("load");
        assert_eq!(loaded.producer, "Test");
        assert_eq!(loaded.wrapper_fragment_len, 1024);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"auto_page_base_width":0}"#).expect("write");

        assert!(matches!(
            EngineConfig::load(&path),
            Err(DocwerkError::Config(_))
        ));
    }
}
