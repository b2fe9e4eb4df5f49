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

//! Transition table of the diagnostic machine and its hooks

use std::fmt;

use super::LintContext;
use crate::diagnostics::{Diagnostic, FixLabel, MessageKind, TextEdit};
use crate::rules;
use crate::schema::resolve_path;
use crate::syntax::{Node, NodeKind, Span};

/// Kind of node most recently and validly entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// After `[`
    ContainerStart,
    /// After a container name
    ContainerIdentifier,
    /// After `]`
    ContainerEnd,
    /// After a key name
    ValueIdentifier,
    /// After `=`
    Assign,
    /// After a literal
    Value,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::ContainerStart => "container-start",
            State::ContainerIdentifier => "container-identifier",
            State::ContainerEnd => "container-end",
            State::ValueIdentifier => "value-identifier",
            State::Assign => "assign",
            State::Value => "value",
        };
        f.write_str(name)
    }
}

/// What interrupted a non-terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A node outside the leave set
    Node(Span),
    /// The end of the document at the given offset
    EndOfDocument(usize),
}

impl Trigger {
    /// Range to report when the interruption itself is the problem
    pub fn span(&self) -> Span {
        match *self {
            Trigger::Node(span) => span,
            Trigger::EndOfDocument(offset) => Span::point(offset),
        }
    }
}

/// Hook run with the node that caused a transition
pub type NodeHook = fn(&LintContext<'_>, Node<'_>, &mut Vec<Diagnostic>);

/// Hook run when a state is interrupted; receives the span of the node that
/// entered the state
pub type ErrorHook = fn(Span, Trigger, &mut Vec<Diagnostic>);

/// One row of the transition table
#[derive(Clone, Copy)]
pub struct Transition {
    /// Required current state, `None` matches from any state
    pub from: Option<State>,
    /// Node kinds that fire the transition
    pub triggers: &'static [NodeKind],
    /// State entered
    pub to: State,
    /// Node kinds allowed to follow; empty for terminal states
    pub leave: &'static [NodeKind],
    /// Run after the transition fires, before the state is committed
    pub on_enter: Option<NodeHook>,
    /// Run when the next transition leaves this state
    pub on_leave: Option<NodeHook>,
    /// Run when a node outside `leave` arrives
    pub on_error: Option<ErrorHook>,
}

impl Transition {
    /// Whether the row fires for `kind` while in `state`
    pub fn accepts(&self, state: Option<State>, kind: NodeKind) -> bool {
        (self.from.is_none() || self.from == state) && self.triggers.contains(&kind)
    }

    /// Whether the state is left on the very next node
    pub fn is_terminal(&self) -> bool {
        self.leave.is_empty()
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("triggers", &self.triggers)
            .field("to", &self.to)
            .field("leave", &self.leave)
            .finish_non_exhaustive()
    }
}

/// Adjacency rules of the configuration language, checked in order
pub static TRANSITIONS: [Transition; 6] = [
    Transition {
        from: None,
        triggers: &[NodeKind::ContainerStart],
        to: State::ContainerStart,
        leave: &[NodeKind::ContainerIdentifier],
        on_enter: None,
        on_leave: None,
        on_error: Some(container_identifier_missing),
    },
    Transition {
        from: Some(State::ContainerStart),
        triggers: &[NodeKind::ContainerIdentifier],
        to: State::ContainerIdentifier,
        leave: &[NodeKind::ContainerEnd],
        on_enter: Some(check_container),
        on_leave: None,
        on_error: Some(container_end_missing),
    },
    Transition {
        from: Some(State::ContainerIdentifier),
        triggers: &[NodeKind::ContainerEnd],
        to: State::ContainerEnd,
        leave: &[],
        on_enter: None,
        on_leave: None,
        on_error: None,
    },
    Transition {
        from: None,
        triggers: &[NodeKind::ValueIdentifier],
        to: State::ValueIdentifier,
        leave: &[NodeKind::Assign],
        on_enter: Some(check_key),
        on_leave: None,
        on_error: Some(assign_missing),
    },
    Transition {
        from: Some(State::ValueIdentifier),
        triggers: &[NodeKind::Assign],
        to: State::Assign,
        leave: &NodeKind::LITERALS,
        on_enter: None,
        on_leave: None,
        on_error: Some(value_missing),
    },
    Transition {
        from: Some(State::Assign),
        triggers: &NodeKind::LITERALS,
        to: State::Value,
        leave: &[],
        on_enter: Some(check_value),
        on_leave: None,
        on_error: None,
    },
];

fn container_identifier_missing(_entered: Span, trigger: Trigger, out: &mut Vec<Diagnostic>) {
    out.push(Diagnostic::error(
        trigger.span(),
        MessageKind::ContainerIdentifierMissing,
    ));
}

fn container_end_missing(entered: Span, _trigger: Trigger, out: &mut Vec<Diagnostic>) {
    out.push(
        Diagnostic::error(Span::point(entered.to), MessageKind::ContainerEndMissing)
            .with_fix(FixLabel::Fix, TextEdit::insert(entered.to, "]")),
    );
}

fn assign_missing(entered: Span, _trigger: Trigger, out: &mut Vec<Diagnostic>) {
    out.push(
        Diagnostic::error(Span::point(entered.to), MessageKind::AssignMissing)
            .with_fix(FixLabel::Fix, TextEdit::insert(entered.to, "=")),
    );
}

fn value_missing(_entered: Span, trigger: Trigger, out: &mut Vec<Diagnostic>) {
    out.push(Diagnostic::error(trigger.span(), MessageKind::ValueMissing));
}

fn check_container(ctx: &LintContext<'_>, node: Node<'_>, out: &mut Vec<Diagnostic>) {
    if resolve_path(&ctx.schema.containers, node.text()).is_none() {
        out.push(Diagnostic::warning(node.span(), MessageKind::ContainerUnknown));
    }
}

fn check_key(ctx: &LintContext<'_>, node: Node<'_>, out: &mut Vec<Diagnostic>) {
    if resolve_path(&ctx.schema.keys, node.text()).is_none() {
        out.push(Diagnostic::warning(node.span(), MessageKind::ValueUnknown));
    }
}

fn check_value(ctx: &LintContext<'_>, node: Node<'_>, out: &mut Vec<Diagnostic>) {
    let Some(key) = node
        .prev_sibling()
        .filter(|prev| prev.kind() == NodeKind::Assign)
        .and_then(|assign| assign.prev_sibling())
        .filter(|prev| prev.kind() == NodeKind::ValueIdentifier)
    else {
        return;
    };

    let Some(rule) = resolve_path(&ctx.schema.keys, key.text())
        .and_then(|resolved| resolved.entry.assign_rule.as_ref())
    else {
        return;
    };

    out.extend(rules::validate(
        rule,
        node.text().trim(),
        key.span(),
        node.span(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let terminal: Vec<State> = TRANSITIONS
            .iter()
            .filter(|row| row.is_terminal())
            .map(|row| row.to)
            .collect();
        assert_eq!(terminal, vec![State::ContainerEnd, State::Value]);

        // Every non-terminal row reports its interruption
        assert!(
            TRANSITIONS
                .iter()
                .filter(|row| !row.is_terminal())
                .all(|row| row.on_error.is_some())
        );
    }

    #[test]
    fn test_accepts() {
        let [start, identifier, ..] = &TRANSITIONS;
        assert!(start.accepts(None, NodeKind::ContainerStart));
        assert!(start.accepts(Some(State::Assign), NodeKind::ContainerStart));
        assert!(identifier.accepts(Some(State::ContainerStart), NodeKind::ContainerIdentifier));
        assert!(!identifier.accepts(None, NodeKind::ContainerIdentifier));
    }

    #[test]
    fn test_structural_hooks_anchor_at_entered_node() {
        let mut out = Vec::new();
        assign_missing(Span::new(9, 13), Trigger::EndOfDocument(13), &mut out);
        container_end_missing(Span::new(1, 7), Trigger::Node(Span::new(7, 8)), &mut out);
        value_missing(Span::new(4, 5), Trigger::Node(Span::new(5, 6)), &mut out);

        assert_eq!(out[0].span(), Span::point(13));
        assert_eq!(out[0].fixes[0].apply("[server]\nport"), "[server]\nport=");
        assert_eq!(out[1].span(), Span::point(7));
        assert_eq!(out[1].fixes[0].edit, TextEdit::insert(7, "]"));
        assert_eq!(out[2].span(), Span::new(5, 6));
        assert!(out[2].fixes.is_empty());
    }
}
