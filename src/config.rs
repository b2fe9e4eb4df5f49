// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AnalyzerError;

/// Default upper bound on the size of a `between:` range offered as completions
pub const DEFAULT_ENUM_RANGE_LIMIT: i64 = 256;

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Name reported as the diagnostic source
    pub source: String,
    /// Optional TOML message catalog replacing the built-in English texts
    pub locale_file: Option<PathBuf>,
    /// Completion settings
    pub completion: CompletionConfig,
    /// Feature toggles
    pub features: FeaturesConfig,
}

/// Completion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionConfig {
    /// Largest `hi - lo` span of a `between:` condition that is expanded into
    /// individual completion options
    pub enum_range_limit: i64,
    /// Match typed prefixes without regard to case
    pub case_insensitive: bool,
}

/// Feature toggles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Enable diagnostics
    pub diagnostics: bool,
    /// Enable completion
    pub completion: bool,
    /// Enable hover
    pub hover: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            source: "configle".to_string(),
            locale_file: None,
            completion: CompletionConfig::default(),
            features: FeaturesConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enum_range_limit: DEFAULT_ENUM_RANGE_LIMIT,
            case_insensitive: true,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            diagnostics: true,
            completion: true,
            hover: true,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: AnalyzerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Find configuration file next to a document
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        let config_path = dir.join(".configle.toml");
        if config_path.exists() {
            Some(config_path)
        } else {
            None
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.completion.enum_range_limit < 0 {
            return Err(AnalyzerError::invalid_config(
                "completion.enum_range_limit must be >= 0",
            ));
        }

        if self.source.trim().is_empty() {
            return Err(AnalyzerError::invalid_config("source must not be empty"));
        }

        if !self.features.diagnostics && !self.features.completion && !self.features.hover {
            log::warn!("all analyzer features are disabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.completion.enum_range_limit, 256);
        assert!(config.completion.case_insensitive);
        assert!(config.features.diagnostics);
        assert_eq!(config.source, "configle");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());

        config.completion.enum_range_limit = -1;
        assert!(config.validate().is_err());

        config.completion.enum_range_limit = 10;
        config.source = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_parse() {
        let toml_str = r#"
            source = "my-app"
            [completion]
            enum_range_limit = 1000
            [features]
            hover = false
        "#;
        let config: AnalyzerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.source, "my-app");
        assert_eq!(config.completion.enum_range_limit, 1000);
        assert!(config.completion.case_insensitive);
        assert!(!config.features.hover);
        assert!(config.features.completion);
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".configle.toml");
        std::fs::write(&path, "[completion]\nenum_range_limit = -5\n").unwrap();

        assert_eq!(AnalyzerConfig::find_config_file(dir.path()), Some(path.clone()));
        let err = AnalyzerConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("enum_range_limit"));
    }
}
