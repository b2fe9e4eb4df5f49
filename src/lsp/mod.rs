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

//! Language Server Protocol conversions
//!
//! Maps analyzer output onto `lsp-types` structures so a language server can
//! forward it unchanged. Offsets become UTF-16 positions through
//! [`LineIndex`]; messages and fix labels are rendered with the analyzer's
//! catalog.

pub mod completion;
pub mod diagnostics;
pub mod hover;
pub mod line_index;

use lsp_types::{CodeAction, CompletionResponse, Hover, Position, Range, Uri};

use crate::engine::ConfigAnalyzer;
use crate::error::Result;
use crate::syntax::SyntaxTree;

pub use completion::to_completion_response;
pub use diagnostics::{code_actions, to_lsp_diagnostic};
pub use hover::to_hover;
pub use line_index::LineIndex;

/// LSP view of a [`ConfigAnalyzer`]
#[derive(Debug, Clone, Copy)]
pub struct LspAdapter<'a> {
    analyzer: &'a ConfigAnalyzer,
}

impl<'a> LspAdapter<'a> {
    /// Wrap an analyzer
    pub fn new(analyzer: &'a ConfigAnalyzer) -> Self {
        Self { analyzer }
    }

    /// Diagnostics to publish for a document
    pub fn diagnostics(&self, tree: &SyntaxTree) -> Vec<lsp_types::Diagnostic> {
        let index = LineIndex::new(tree.text());
        let source = &self.analyzer.config().source;
        self.analyzer
            .diagnose(tree)
            .iter()
            .map(|diagnostic| {
                to_lsp_diagnostic(diagnostic, &index, self.analyzer.catalog(), source)
            })
            .collect()
    }

    /// Quick fixes for diagnostics touching `range`
    pub fn code_actions(&self, uri: &Uri, tree: &SyntaxTree, range: Range) -> Vec<CodeAction> {
        let index = LineIndex::new(tree.text());
        let start = index.offset(range.start).unwrap_or(tree.len());
        let end = index.offset(range.end).unwrap_or(tree.len());
        let source = &self.analyzer.config().source;

        self.analyzer
            .diagnose(tree)
            .iter()
            .filter(|diagnostic| diagnostic.from <= end && start <= diagnostic.to)
            .flat_map(|diagnostic| {
                code_actions(uri, diagnostic, &index, self.analyzer.catalog(), source)
            })
            .collect()
    }

    /// Completion at a position
    pub async fn completion(
        &self,
        tree: &SyntaxTree,
        position: Position,
    ) -> Result<Option<CompletionResponse>> {
        let index = LineIndex::new(tree.text());
        let Some(offset) = index.offset(position) else {
            return Ok(None);
        };
        let result = self.analyzer.complete_at(tree, offset).await?;
        Ok(result.map(|result| to_completion_response(&result, &index, offset)))
    }

    /// Hover at a position
    pub fn hover(&self, tree: &SyntaxTree, position: Position) -> Option<Hover> {
        let index = LineIndex::new(tree.text());
        let offset = index.offset(position)?;
        let info = self.analyzer.hover_at(tree, offset)?;
        Some(to_hover(&info, &index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{KeySchemaEntry, Schema, SchemaEntry};
    use crate::syntax::scan;

    fn analyzer() -> ConfigAnalyzer {
        ConfigAnalyzer::new(Schema::new(
            vec![SchemaEntry::new("server", "Server")],
            vec![KeySchemaEntry::namespace(
                "net",
                "Network",
                vec![KeySchemaEntry::leaf("timeout", "Timeout")],
            )],
        ))
    }

    #[test]
    fn test_code_actions_in_range() {
        let analyzer = analyzer();
        let adapter = LspAdapter::new(&analyzer);
        let tree = scan("[server\nnet.timeout");
        let uri: Uri = "file:///etc/app.conf".parse().unwrap();

        assert_eq!(adapter.diagnostics(&tree).len(), 2);

        let first_line = Range::new(Position::new(0, 0), Position::new(0, 7));
        let actions = adapter.code_actions(&uri, &tree, first_line);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Fix");

        let second_line = Range::new(Position::new(1, 0), Position::new(1, 11));
        assert_eq!(adapter.code_actions(&uri, &tree, second_line).len(), 1);
    }

    #[tokio::test]
    async fn test_completion_and_hover() {
        let analyzer = analyzer();
        let adapter = LspAdapter::new(&analyzer);
        let tree = scan("[server]\nnet.");

        let response = adapter
            .completion(&tree, Position::new(1, 4))
            .await
            .unwrap()
            .unwrap();
        let CompletionResponse::Array(items) = response else {
            panic!("expected item array");
        };
        assert_eq!(items[0].label, "timeout");

        let hover = adapter.hover(&tree, Position::new(0, 2)).unwrap();
        assert_eq!(
            hover.range,
            Some(Range::new(Position::new(0, 1), Position::new(0, 7)))
        );
        assert!(adapter.hover(&tree, Position::new(9, 0)).is_none());
    }
}
