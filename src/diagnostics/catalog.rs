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

//! Message catalogs
//!
//! A catalog maps message kinds and fix labels to display text. The built-in
//! catalog is English; other languages load from TOML with the same layout,
//! and any entry they omit falls back to English.
//!
//! ```toml
//! [lint]
//! fix = "Beheben"
//!
//! [lint.value]
//! missing = "Wert fehlt"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{FixLabel, MessageKind};
use crate::error::{AnalyzerError, Result};

/// Lookup of display text for diagnostics
pub trait MessageCatalog: Send + Sync {
    /// Text for a message kind
    fn message(&self, kind: &MessageKind) -> String;

    /// Text for a fix label
    fn fix_label(&self, label: FixLabel) -> String;
}

/// Table driven catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Lint messages
    #[serde(default)]
    pub lint: LintMessages,
}

/// Lint message table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintMessages {
    /// Label of insert fixes
    pub fix: String,
    /// Label of delete fixes
    pub remove: String,
    /// Container messages
    pub container: ContainerMessages,
    /// Value messages
    pub value: ValueMessages,
}

/// Container related messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerMessages {
    pub identifier: String,
    pub unknown: String,
    pub end: String,
}

/// Key and value related messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueMessages {
    pub default: String,
    pub unknown: String,
    pub assign: String,
    pub missing: String,
    #[serde(rename = "enum")]
    pub enumeration: String,
    /// Prefix of the range message; the bounds are appended as `lo-hi`
    pub range: String,
    pub float: String,
    pub int: String,
    pub bool: String,
}

impl Default for LintMessages {
    fn default() -> Self {
        Self {
            fix: "Fix".to_string(),
            remove: "Remove".to_string(),
            container: ContainerMessages::default(),
            value: ValueMessages::default(),
        }
    }
}

impl Default for ContainerMessages {
    fn default() -> Self {
        Self {
            identifier: "Container identifier missing".to_string(),
            unknown: "Container unknown value".to_string(),
            end: "Container end missing".to_string(),
        }
    }
}

impl Default for ValueMessages {
    fn default() -> Self {
        Self {
            default: "Default value".to_string(),
            unknown: "Unknown value".to_string(),
            assign: "Value assign missing".to_string(),
            missing: "Value missing".to_string(),
            enumeration: "Unknown enum value".to_string(),
            range: "Value is out of range".to_string(),
            float: "Value is not float".to_string(),
            int: "Value is not int".to_string(),
            bool: "Value is not bool".to_string(),
        }
    }
}

impl Catalog {
    /// Built-in English catalog
    pub fn english() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

impl MessageCatalog for Catalog {
    fn message(&self, kind: &MessageKind) -> String {
        let container = &self.lint.container;
        let value = &self.lint.value;
        match kind {
            MessageKind::ContainerIdentifierMissing => container.identifier.clone(),
            MessageKind::ContainerUnknown => container.unknown.clone(),
            MessageKind::ContainerEndMissing => container.end.clone(),
            MessageKind::ValueUnknown => value.unknown.clone(),
            MessageKind::AssignMissing => value.assign.clone(),
            MessageKind::ValueMissing => value.missing.clone(),
            MessageKind::DefaultValue => value.default.clone(),
            MessageKind::InvalidEnum => value.enumeration.clone(),
            MessageKind::OutOfRange { lo, hi } => format!("{} {lo}-{hi}", value.range),
            MessageKind::NotFloat => value.float.clone(),
            MessageKind::NotInt => value.int.clone(),
            MessageKind::NotBool => value.bool.clone(),
        }
    }

    fn fix_label(&self, label: FixLabel) -> String {
        match label {
            FixLabel::Fix => self.lint.fix.clone(),
            FixLabel::Remove => self.lint.remove.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_messages() {
        let catalog = Catalog::english();
        assert_eq!(catalog.message(&MessageKind::AssignMissing), "Value assign missing");
        assert_eq!(
            catalog.message(&MessageKind::OutOfRange { lo: 0, hi: 300 }),
            "Value is out of range 0-300"
        );
        assert_eq!(catalog.fix_label(FixLabel::Remove), "Remove");
    }

    #[test]
    fn test_partial_override_falls_back() {
        let catalog = Catalog::from_toml_str(
            r#"
            [lint]
            fix = "Beheben"

            [lint.value]
            missing = "Wert fehlt"
            enum = "Unbekannter Wert"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.fix_label(FixLabel::Fix), "Beheben");
        assert_eq!(catalog.fix_label(FixLabel::Remove), "Remove");
        assert_eq!(catalog.message(&MessageKind::ValueMissing), "Wert fehlt");
        assert_eq!(catalog.message(&MessageKind::InvalidEnum), "Unbekannter Wert");
        assert_eq!(catalog.message(&MessageKind::NotBool), "Value is not bool");
        assert_eq!(
            catalog.message(&MessageKind::ContainerEndMissing),
            "Container end missing"
        );
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Catalog::from_toml_str("[lint"),
            Err(AnalyzerError::CatalogParse(_))
        ));
    }
}
