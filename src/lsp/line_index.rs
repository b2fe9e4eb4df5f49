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

//! Byte offset to LSP position mapping

use lsp_types::{Position, Range};

use crate::syntax::Span;

/// Line table of a document
///
/// Columns are counted in UTF-16 code units, the LSP default encoding.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Index the lines of `text`
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self { text, line_starts }
    }

    /// Position of a byte offset, clamped to the document
    pub fn position(&self, offset: usize) -> Position {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }

        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let start = self.line_starts[line];
        let character = self.text[start..offset].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    /// Byte offset of a position
    ///
    /// Columns past the end of a line clamp to the line end; lines past the
    /// end of the document give `None`.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let start = *self.line_starts.get(position.line as usize)?;
        let line = &self.text[start..];
        let line = line.split('\n').next().unwrap_or_default();

        let mut units = 0usize;
        for (index, ch) in line.char_indices() {
            if units >= position.character as usize {
                return Some(start + index);
            }
            units += ch.len_utf16();
        }
        Some(start + line.len())
    }

    /// Range covering a span
    pub fn range(&self, span: Span) -> Range {
        Range::new(self.position(span.from), self.position(span.to))
    }
}
