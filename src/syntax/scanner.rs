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

//! Reference classifier for the configuration language
//!
//! Produces a flat tree: every token is a direct child of the document node,
//! so sibling navigation walks the token stream. Whitespace other than line
//! breaks is not represented.
//!
//! ```text
//! # comment
//! [server.main]
//! net.port = 8080
//! name = "primary"
//! ```

use super::{NodeKind, SyntaxTree, TreeBuilder};

/// Classify `text` into a syntax tree
pub fn scan(text: &str) -> SyntaxTree {
    let mut builder = SyntaxTree::builder(text);
    Scanner::new(text, &mut builder).run();
    builder.finish()
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    builder: &'a mut TreeBuilder,
    in_container: bool,
    after_assign: bool,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, builder: &'a mut TreeBuilder) -> Self {
        Self {
            text,
            pos: 0,
            builder,
            in_container: false,
            after_assign: false,
        }
    }

    fn run(&mut self) {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                '\n' => {
                    self.pos += 1;
                    self.emit(NodeKind::NewLine, start);
                    self.in_container = false;
                    self.after_assign = false;
                }
                ' ' | '\t' | '\r' => self.pos += 1,
                '#' | ';' => {
                    self.take_while(|c| c != '\n');
                    self.emit(NodeKind::Comment, start);
                }
                _ if self.after_assign => self.value(),
                '[' => {
                    self.pos += 1;
                    self.emit(NodeKind::ContainerStart, start);
                    self.in_container = true;
                }
                ']' => {
                    self.pos += 1;
                    self.emit(NodeKind::ContainerEnd, start);
                    self.in_container = false;
                }
                '=' => {
                    self.pos += 1;
                    self.emit(NodeKind::Assign, start);
                    self.after_assign = true;
                }
                c if is_identifier_char(c) => {
                    self.take_while(is_identifier_char);
                    let kind = if self.in_container {
                        NodeKind::ContainerIdentifier
                    } else {
                        NodeKind::ValueIdentifier
                    };
                    self.emit(kind, start);
                }
                c => {
                    self.pos += c.len_utf8();
                    self.emit(NodeKind::Error, start);
                }
            }
        }
    }

    /// Literal on the right of `=`, up to the end of line or a comment
    fn value(&mut self) {
        let start = self.pos;
        self.after_assign = false;

        if self.peek() == Some('"') {
            self.pos += 1;
            let mut escaped = false;
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.pos += c.len_utf8();
                match c {
                    '\\' if !escaped => escaped = true,
                    '"' if !escaped => break,
                    _ => escaped = false,
                }
            }
            self.emit(NodeKind::String, start);
            return;
        }

        self.take_while(|c| c != '\n' && c != '#' && c != ';');
        let raw = &self.text[start..self.pos];
        let literal = raw.trim_end();
        self.pos = start + literal.len();

        let kind = if literal == "true" || literal == "false" {
            NodeKind::Boolean
        } else if is_number(literal) {
            NodeKind::Number
        } else {
            NodeKind::String
        };
        self.emit(kind, start);
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn emit(&mut self, kind: NodeKind, start: usize) {
        self.builder.leaf(kind, start, self.pos);
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '*' | '$')
}

fn is_number(literal: &str) -> bool {
    let digits = literal.trim_start_matches(['+', '-']).trim_start_matches('.');
    digits.starts_with(|c: char| c.is_ascii_digit()) && literal.parse::<f64>().is_ok()
}
