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

//! LSP hover content

use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};

use super::LineIndex;
use crate::hover::HoverInfo;
use crate::syntax::Span;

/// Render breadcrumbs as markdown, the hovered entry in bold
pub fn to_hover(info: &HoverInfo, index: &LineIndex<'_>) -> Hover {
    let last = info.titles.len().saturating_sub(1);
    let value = info
        .titles
        .iter()
        .enumerate()
        .map(|(position, title)| {
            if position == last {
                format!("**{title}**")
            } else {
                title.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" › ");

    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(index.range(Span::new(info.from, info.to))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::{Position, Range};

    #[test]
    fn test_hover_markdown() {
        let index = LineIndex::new("[server.main]");
        let info = HoverInfo {
            from: 1,
            to: 12,
            titles: vec!["Server".to_string(), "Main node".to_string()],
        };

        let hover = to_hover(&info, &index);
        let HoverContents::Markup(content) = hover.contents else {
            panic!("expected markup");
        };
        assert_eq!(content.kind, MarkupKind::Markdown);
        assert_eq!(content.value, "Server › **Main node**");
        assert_eq!(hover.range, Some(Range::new(Position::new(0, 1), Position::new(0, 12))));
    }
}
