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

//! Core diagnostic types
//!
//! Diagnostics carry a [`MessageKind`] rather than text. The display text is
//! looked up in a [`MessageCatalog`] for the active language.

pub mod catalog;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::syntax::Span;

pub use catalog::{Catalog, MessageCatalog};

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Style suggestion
    Hint,
    /// Possible problem, the identifier may be intentionally dynamic
    Warning,
    /// Structural or value error
    Error,
}

/// What a diagnostic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum MessageKind {
    /// `[` not followed by a container name
    ContainerIdentifierMissing,
    /// Container name not found in the schema
    ContainerUnknown,
    /// Container name not followed by `]`
    ContainerEndMissing,
    /// Key not found in the schema
    ValueUnknown,
    /// Key not followed by `=`
    AssignMissing,
    /// `=` not followed by a literal
    ValueMissing,
    /// Value equals the key's default
    DefaultValue,
    /// Value not in the `in:` list
    InvalidEnum,
    /// Integer value outside `between:` bounds
    OutOfRange {
        /// Lower bound
        lo: i64,
        /// Upper bound
        hi: i64,
    },
    /// Value does not parse as a float
    NotFloat,
    /// Value does not parse as an integer
    NotInt,
    /// Value is not `true` or `false`
    NotBool,
}

impl MessageKind {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            MessageKind::ContainerIdentifierMissing => "C001",
            MessageKind::ContainerEndMissing => "C002",
            MessageKind::ContainerUnknown => "C100",
            MessageKind::AssignMissing => "V001",
            MessageKind::ValueMissing => "V002",
            MessageKind::ValueUnknown => "V100",
            MessageKind::InvalidEnum => "V200",
            MessageKind::OutOfRange { .. } => "V201",
            MessageKind::NotFloat => "V202",
            MessageKind::NotInt => "V203",
            MessageKind::NotBool => "V204",
            MessageKind::DefaultValue => "V300",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::ContainerIdentifierMissing => write!(f, "container identifier missing"),
            MessageKind::ContainerUnknown => write!(f, "unknown container"),
            MessageKind::ContainerEndMissing => write!(f, "container end missing"),
            MessageKind::ValueUnknown => write!(f, "unknown value"),
            MessageKind::AssignMissing => write!(f, "assign missing"),
            MessageKind::ValueMissing => write!(f, "value missing"),
            MessageKind::DefaultValue => write!(f, "redundant default value"),
            MessageKind::InvalidEnum => write!(f, "invalid enum value"),
            MessageKind::OutOfRange { lo, hi } => write!(f, "value out of range {lo}-{hi}"),
            MessageKind::NotFloat => write!(f, "value is not float"),
            MessageKind::NotInt => write!(f, "value is not int"),
            MessageKind::NotBool => write!(f, "value is not bool"),
        }
    }
}

/// Label of a quick fix, resolved through the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixLabel {
    /// Insert missing syntax
    Fix,
    /// Delete redundant text
    Remove,
}

/// Replacement of a byte range
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextEdit {
    /// Range to replace
    pub span: Span,
    /// Replacement text
    pub insert: String,
}

impl TextEdit {
    /// Insert `text` at `offset`
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::point(offset),
            insert: text.into(),
        }
    }

    /// Delete `span`
    pub fn delete(span: Span) -> Self {
        Self {
            span,
            insert: String::new(),
        }
    }

    /// Apply the edit to `text`
    ///
    /// Out of range or non char-boundary spans leave the text unchanged.
    pub fn apply(&self, text: &str) -> String {
        let Span { from, to } = self.span;
        if from > to || !text.is_char_boundary(from) || !text.is_char_boundary(to) {
            return text.to_string();
        }
        let mut result = String::with_capacity(text.len() + self.insert.len());
        result.push_str(&text[..from]);
        result.push_str(&self.insert);
        result.push_str(&text[to..]);
        result
    }
}

/// A quick fix attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fix {
    /// Catalog label
    pub label: FixLabel,
    /// Edit performed by the fix
    pub edit: TextEdit,
}

impl Fix {
    /// Apply the fix to `text`
    pub fn apply(&self, text: &str) -> String {
        self.edit.apply(text)
    }
}

/// A diagnostic produced by one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Start offset
    pub from: usize,
    /// End offset
    pub to: usize,
    /// Severity
    pub severity: Severity,
    /// Message kind, rendered through a catalog
    pub message: MessageKind,
    /// Quick fixes in preference order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<Fix>,
}

impl Diagnostic {
    /// Create a diagnostic without fixes
    pub fn new(span: Span, severity: Severity, message: MessageKind) -> Self {
        Self {
            from: span.from,
            to: span.to,
            severity,
            message,
            fixes: Vec::new(),
        }
    }

    /// Error diagnostic
    pub fn error(span: Span, message: MessageKind) -> Self {
        Self::new(span, Severity::Error, message)
    }

    /// Warning diagnostic
    pub fn warning(span: Span, message: MessageKind) -> Self {
        Self::new(span, Severity::Warning, message)
    }

    /// Hint diagnostic
    pub fn hint(span: Span, message: MessageKind) -> Self {
        Self::new(span, Severity::Hint, message)
    }

    /// Add a fix
    pub fn with_fix(mut self, label: FixLabel, edit: TextEdit) -> Self {
        self.fixes.push(Fix { label, edit });
        self
    }

    /// Range covered by the diagnostic
    pub fn span(&self) -> Span {
        Span::new(self.from, self.to)
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}..{} {}: {}",
            match self.severity {
                Severity::Error => "ERROR",
                Severity::Warning => "WARN",
                Severity::Hint => "HINT",
            },
            self.from,
            self.to,
            self.message.code(),
            self.message
        )
    }
}
