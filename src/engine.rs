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

//! Analyzer facade - the main entry point for editors and tools

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::completion::{CompletionResolver, CompletionResult, SuggestionProvider};
use crate::config::AnalyzerConfig;
use crate::diagnostics::{Catalog, Diagnostic, MessageCatalog, Severity, TextEdit};
use crate::error::Result;
use crate::hover::{HoverInfo, HoverResolver};
use crate::lint::{DiagnosticMachine, LintContext};
use crate::schema::Schema;
use crate::syntax::SyntaxTree;

/// Schema, settings, message catalog and provider for one document session
///
/// Every call is an independent full pass; nothing is remembered between
/// calls, so one analyzer can serve many documents.
#[derive(Clone)]
pub struct ConfigAnalyzer {
    schema: Schema,
    config: AnalyzerConfig,
    catalog: Arc<dyn MessageCatalog>,
    provider: Option<Arc<dyn SuggestionProvider>>,
}

impl ConfigAnalyzer {
    /// Create an analyzer with default settings and English messages
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            config: AnalyzerConfig::default(),
            catalog: Arc::new(Catalog::english()),
            provider: None,
        }
    }

    /// Create an analyzer from validated settings, loading the configured
    /// message catalog
    pub fn from_config(schema: Schema, config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let catalog = match &config.locale_file {
            Some(path) => {
                log::debug!("loading message catalog from {}", path.display());
                Catalog::from_file(path)?
            }
            None => Catalog::english(),
        };
        Ok(Self::new(schema).with_config(config).with_catalog(catalog))
    }

    /// Replace the settings
    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the message catalog
    pub fn with_catalog(mut self, catalog: impl MessageCatalog + 'static) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Attach an external suggestion provider
    pub fn with_provider(mut self, provider: Arc<dyn SuggestionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Schema in use
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Settings in use
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Message catalog in use
    pub fn catalog(&self) -> &dyn MessageCatalog {
        self.catalog.as_ref()
    }

    /// Run a full diagnostic pass over `tree`
    pub fn diagnose(&self, tree: &SyntaxTree) -> Vec<Diagnostic> {
        if !self.config.features.diagnostics {
            return Vec::new();
        }
        let mut machine = DiagnosticMachine::new();
        machine.run(&LintContext::new(&self.schema), tree);
        machine.take_diagnostics()
    }

    /// Complete at `offset`
    pub async fn complete_at(
        &self,
        tree: &SyntaxTree,
        offset: usize,
    ) -> Result<Option<CompletionResult>> {
        if !self.config.features.completion {
            return Ok(None);
        }
        let mut resolver = CompletionResolver::new(&self.schema, &self.config.completion);
        if let Some(provider) = &self.provider {
            resolver = resolver.with_provider(provider.as_ref());
        }
        resolver.complete_at(tree, offset).await
    }

    /// Hover breadcrumbs at `offset`
    pub fn hover_at(&self, tree: &SyntaxTree, offset: usize) -> Option<HoverInfo> {
        if !self.config.features.hover {
            return None;
        }
        HoverResolver::new(&self.schema).hover_at(tree, offset)
    }

    /// Attach display text to diagnostics
    pub fn render(&self, diagnostics: &[Diagnostic]) -> Vec<RenderedDiagnostic> {
        diagnostics
            .iter()
            .map(|diagnostic| RenderedDiagnostic {
                from: diagnostic.from,
                to: diagnostic.to,
                severity: diagnostic.severity,
                code: diagnostic.message.code().to_string(),
                message: self.catalog.message(&diagnostic.message),
                fixes: diagnostic
                    .fixes
                    .iter()
                    .map(|fix| RenderedFix {
                        label: self.catalog.fix_label(fix.label),
                        edit: fix.edit.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl fmt::Debug for ConfigAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigAnalyzer")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .field("provider", &self.provider.is_some())
            .finish_non_exhaustive()
    }
}

/// Diagnostic with catalog text, as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedDiagnostic {
    /// Start offset
    pub from: usize,
    /// End offset
    pub to: usize,
    /// Severity
    pub severity: Severity,
    /// Stable code
    pub code: String,
    /// Localized message
    pub message: String,
    /// Localized fixes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<RenderedFix>,
}

/// Fix with catalog label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedFix {
    /// Localized label
    pub label: String,
    /// Edit performed
    pub edit: TextEdit,
}
