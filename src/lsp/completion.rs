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

//! LSP completion items

use lsp_types::{CompletionItem, CompletionItemKind, CompletionResponse, CompletionTextEdit, TextEdit};

use super::LineIndex;
use crate::completion::{CompletionKind, CompletionResult};
use crate::syntax::Span;

/// Convert a completion result requested at `cursor`
///
/// Every item replaces the result's range, which ends at the cursor when the
/// result leaves it open.
pub fn to_completion_response(
    result: &CompletionResult,
    index: &LineIndex<'_>,
    cursor: usize,
) -> CompletionResponse {
    let range = index.range(Span::new(result.from, result.to.unwrap_or(cursor)));

    let items = result
        .options
        .iter()
        .enumerate()
        .map(|(position, option)| CompletionItem {
            label: option.label.clone(),
            kind: Some(item_kind(option.kind)),
            detail: option.detail.clone(),
            // Keep schema order in clients that sort by label
            sort_text: Some(format!("{position:05}")),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(
                range,
                option.label.clone(),
            ))),
            ..CompletionItem::default()
        })
        .collect();

    CompletionResponse::Array(items)
}

fn item_kind(kind: CompletionKind) -> CompletionItemKind {
    match kind {
        CompletionKind::Constant => CompletionItemKind::CONSTANT,
        CompletionKind::Type => CompletionItemKind::PROPERTY,
        CompletionKind::Variable => CompletionItemKind::VARIABLE,
        CompletionKind::Enum => CompletionItemKind::ENUM_MEMBER,
        CompletionKind::Text => CompletionItemKind::TEXT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CompletionOption;
    use lsp_types::{Position, Range};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_completion_items_replace_segment() {
        let text = "x=1\nnet.ti";
        let index = LineIndex::new(text);
        let result = CompletionResult {
            from: 8,
            to: Some(10),
            options: vec![CompletionOption {
                label: "timeout".to_string(),
                detail: Some("Timeout".to_string()),
                kind: CompletionKind::Type,
            }],
        };

        let CompletionResponse::Array(items) = to_completion_response(&result, &index, 10) else {
            panic!("expected item array");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, Some(CompletionItemKind::PROPERTY));
        assert_eq!(items[0].detail.as_deref(), Some("Timeout"));
        assert_eq!(
            items[0].text_edit,
            Some(CompletionTextEdit::Edit(TextEdit::new(
                Range::new(Position::new(1, 4), Position::new(1, 6)),
                "timeout".to_string()
            )))
        );
    }

    #[test]
    fn test_open_range_ends_at_cursor() {
        let index = LineIndex::new("proto=");
        let result = CompletionResult {
            from: 6,
            to: None,
            options: vec![CompletionOption {
                label: "tcp".to_string(),
                detail: None,
                kind: CompletionKind::Enum,
            }],
        };

        let CompletionResponse::Array(items) = to_completion_response(&result, &index, 6) else {
            panic!("expected item array");
        };
        let Some(CompletionTextEdit::Edit(edit)) = &items[0].text_edit else {
            panic!("expected plain edit");
        };
        assert_eq!(edit.range, Range::new(Position::new(0, 6), Position::new(0, 6)));
        assert_eq!(items[0].kind, Some(CompletionItemKind::ENUM_MEMBER));
    }
}
