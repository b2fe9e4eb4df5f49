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

//! Error types for schema loading and completion lookups
//!
//! Schema lookups that find nothing are not errors; they return `None`.
//! The variants here cover the things that can actually fail: reading
//! schema or catalog files and asking an external provider for values.

use std::path::PathBuf;
use thiserror::Error;

use crate::completion::ProviderKind;

/// Result type alias for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Error type for analyzer operations
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A schema or catalog file could not be read
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The schema document is not valid JSON or has the wrong shape
    #[error("Invalid schema: {0}")]
    SchemaParse(#[from] serde_json::Error),

    /// A message catalog is not valid TOML or has the wrong shape
    #[error("Invalid message catalog: {0}")]
    CatalogParse(#[from] toml::de::Error),

    /// Configuration values failed validation
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable reason
        message: String,
    },

    /// The external suggestion provider failed
    #[error("Suggestion provider failed for {kind} '{path}': {message}")]
    Provider {
        /// Lookup kind that was requested
        kind: ProviderKind,
        /// Resolved dotted path passed to the provider
        path: String,
        /// Provider supplied reason
        message: String,
    },
}

impl AnalyzerError {
    /// Create a provider error
    pub fn provider(kind: ProviderKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
