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

//! Diagnostic state machine
//!
//! The machine walks the classified nodes of a document in order and polices
//! adjacency: a container name must follow `[` and be followed by `]`, a key
//! must be followed by `=`, and `=` by a literal. Schema checks run from the
//! enter hooks of the transition table, at the point where the preceding
//! siblings they need are available.
//!
//! Each violation produces one diagnostic and resets the machine to idle, so a
//! broken line never cascades into the rest of the document.
//!
//! ```rust
//! use configle_analyzer::lint::{DiagnosticMachine, LintContext};
//! use configle_analyzer::schema::Schema;
//! use configle_analyzer::syntax::scan;
//!
//! let schema = Schema::default();
//! let tree = scan("[server\n");
//! let mut machine = DiagnosticMachine::new();
//! let diagnostics = machine.run(&LintContext::new(&schema), &tree);
//! assert!(diagnostics.iter().any(|d| d.is_error()));
//! ```

pub mod transitions;

use crate::diagnostics::Diagnostic;
use crate::schema::Schema;
use crate::syntax::{Node, Span, SyntaxTree};

pub use transitions::{ErrorHook, NodeHook, State, TRANSITIONS, Transition, Trigger};

/// Read-only inputs shared by the hooks
#[derive(Debug, Clone, Copy)]
pub struct LintContext<'a> {
    /// Container and key schema
    pub schema: &'a Schema,
}

impl<'a> LintContext<'a> {
    /// Create a context over `schema`
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }
}

/// Adjacency automaton with a diagnostics buffer
///
/// Not reentrant: one traversal at a time, separated by [`clear`](Self::clear)
/// or by using [`run`](Self::run), which clears first.
#[derive(Debug)]
pub struct DiagnosticMachine<'t> {
    table: &'t [Transition],
    state: Option<State>,
    current: Option<&'t Transition>,
    entered: Span,
    diagnostics: Vec<Diagnostic>,
}

impl Default for DiagnosticMachine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticMachine<'static> {
    /// Machine over the language's transition table
    pub fn new() -> Self {
        Self::with_table(&TRANSITIONS)
    }
}

impl<'t> DiagnosticMachine<'t> {
    /// Machine over a custom transition table
    pub fn with_table(table: &'t [Transition]) -> Self {
        Self {
            table,
            state: None,
            current: None,
            entered: Span::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Current state, `None` when idle
    pub fn state(&self) -> Option<State> {
        self.state
    }

    /// Diagnostics collected since the last clear
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the collected diagnostics, leaving the buffer empty
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Reset to idle and drop all diagnostics
    pub fn clear(&mut self) {
        self.state = None;
        self.current = None;
        self.entered = Span::default();
        self.diagnostics.clear();
    }

    /// Feed one node
    pub fn process(&mut self, ctx: &LintContext<'_>, node: Node<'_>) {
        let kind = node.kind();

        if let Some(current) = self.current {
            if !current.is_terminal() && !current.leave.contains(&kind) {
                log::trace!("{} interrupted by {kind} at {}", current.to, node.from());
                if let Some(on_error) = current.on_error {
                    on_error(self.entered, Trigger::Node(node.span()), &mut self.diagnostics);
                }
                self.current = None;
                self.state = None;
            }
        }

        let table = self.table;
        let Some(next) = table
            .iter()
            .find(|transition| transition.accepts(self.state, kind))
        else {
            return;
        };

        if let Some(on_leave) = self.current.and_then(|current| current.on_leave) {
            on_leave(ctx, node, &mut self.diagnostics);
        }
        if let Some(on_enter) = next.on_enter {
            on_enter(ctx, node, &mut self.diagnostics);
        }

        log::trace!("{:?} -> {} on {kind} at {}", self.state, next.to, node.from());
        self.current = Some(next);
        self.entered = node.span();
        // Terminal states only last until the next node is looked at
        self.state = if next.is_terminal() { None } else { Some(next.to) };
    }

    /// Signal the end of the document at `offset`
    ///
    /// A non-terminal state still pending reports its error as if a node had
    /// arrived there. The machine is idle afterwards.
    pub fn finish(&mut self, offset: usize) {
        if let Some(current) = self.current.take() {
            if !current.is_terminal() {
                log::trace!("{} interrupted by end of document at {offset}", current.to);
                if let Some(on_error) = current.on_error {
                    on_error(self.entered, Trigger::EndOfDocument(offset), &mut self.diagnostics);
                }
            }
        }
        self.state = None;
    }

    /// Clear, feed every node of `tree` in document order, then finish
    pub fn run(&mut self, ctx: &LintContext<'_>, tree: &SyntaxTree) -> &[Diagnostic] {
        self.clear();
        for node in tree.iter() {
            self.process(ctx, node);
        }
        self.finish(tree.len());
        log::debug!("lint pass produced {} diagnostics", self.diagnostics.len());
        &self.diagnostics
    }
}
