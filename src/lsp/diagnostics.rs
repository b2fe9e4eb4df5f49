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

//! LSP diagnostics and quick-fix code actions

use lsp_types::{
    CodeAction, CodeActionKind, DiagnosticSeverity, DocumentChanges, NumberOrString, OneOf,
    OptionalVersionedTextDocumentIdentifier, TextDocumentEdit, TextEdit, Uri, WorkspaceEdit,
};

use super::LineIndex;
use crate::diagnostics::{Diagnostic, MessageCatalog, Severity};

/// Convert a diagnostic, rendering its message through `catalog`
pub fn to_lsp_diagnostic(
    diagnostic: &Diagnostic,
    index: &LineIndex<'_>,
    catalog: &dyn MessageCatalog,
    source: &str,
) -> lsp_types::Diagnostic {
    lsp_types::Diagnostic {
        range: index.range(diagnostic.span()),
        severity: Some(match diagnostic.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Hint => DiagnosticSeverity::HINT,
        }),
        code: Some(NumberOrString::String(diagnostic.message.code().to_string())),
        code_description: None,
        source: Some(source.to_string()),
        message: catalog.message(&diagnostic.message),
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Quick-fix actions for the fixes of one diagnostic
///
/// The first fix is marked preferred.
pub fn code_actions(
    uri: &Uri,
    diagnostic: &Diagnostic,
    index: &LineIndex<'_>,
    catalog: &dyn MessageCatalog,
    source: &str,
) -> Vec<CodeAction> {
    let reported = to_lsp_diagnostic(diagnostic, index, catalog, source);

    diagnostic
        .fixes
        .iter()
        .enumerate()
        .map(|(position, fix)| {
            let edit = TextEdit::new(index.range(fix.edit.span), fix.edit.insert.clone());
            CodeAction {
                title: catalog.fix_label(fix.label),
                kind: Some(CodeActionKind::QUICKFIX),
                diagnostics: Some(vec![reported.clone()]),
                edit: Some(WorkspaceEdit {
                    document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
                        text_document: OptionalVersionedTextDocumentIdentifier {
                            uri: uri.clone(),
                            version: None,
                        },
                        edits: vec![OneOf::Left(edit)],
                    }])),
                    ..WorkspaceEdit::default()
                }),
                is_preferred: Some(position == 0),
                ..CodeAction::default()
            }
        })
        .collect()
}
