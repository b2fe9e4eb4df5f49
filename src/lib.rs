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

//! Schema-driven analysis for a bracketed configuration language
//!
//! Given a document classified into syntax nodes and a schema of known
//! containers and keys, the analyzer produces diagnostics with quick fixes,
//! dotted-path completions and hover breadcrumbs.
//!
//! ```rust
//! use configle_analyzer::{ConfigAnalyzer, KeySchemaEntry, Schema, SchemaEntry, scan};
//!
//! let schema = Schema::new(
//!     vec![SchemaEntry::new("server", "Server")],
//!     vec![KeySchemaEntry::leaf("port", "Port")],
//! );
//! let analyzer = ConfigAnalyzer::new(schema);
//! let diagnostics = analyzer.diagnose(&scan("[server]\nport"));
//! assert_eq!(diagnostics.len(), 1);
//! ```

pub mod completion;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod hover;
pub mod lint;
#[cfg(feature = "lsp")]
pub mod lsp;
pub mod rules;
pub mod schema;
pub mod syntax;

// Re-export main types
pub use completion::{
    CompletionKind, CompletionOption, CompletionResolver, CompletionResult, ProviderKind,
    SuggestionProvider,
};
pub use config::AnalyzerConfig;
pub use diagnostics::{
    Catalog, Diagnostic, Fix, FixLabel, MessageCatalog, MessageKind, Severity, TextEdit,
};
pub use engine::{ConfigAnalyzer, RenderedDiagnostic};
pub use error::{AnalyzerError, Result};
pub use hover::{HoverInfo, HoverResolver};
pub use lint::{DiagnosticMachine, LintContext};
pub use schema::{AssignRule, KeySchemaEntry, Schema, SchemaEntry, resolve_path, resolve_stack};
pub use syntax::{NodeKind, Span, SyntaxTree, scan};
