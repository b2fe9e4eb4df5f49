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

//! Suggestion schema
//!
//! The schema is two trees supplied by the embedding application: one for
//! container names and one for keys. Both are built once per document session
//! and only read afterwards. The JSON shape follows the host application
//! (`value`, `title`, `suggestions`, `type`, `assign`).

pub mod index;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{AnalyzerError, Result};

pub use index::{
    Resolved, StackMode, resolve_path, resolve_segments, resolve_stack, resolve_stack_segments,
};

/// Common view over container and key entries used by the suggestion index
pub trait SchemaNode: Sized {
    /// Literal segment name matched against document text
    fn value(&self) -> &str;

    /// Human-readable label
    fn title(&self) -> &str;

    /// Child entries, `None` for a leaf
    fn children(&self) -> Option<&[Self]>;

    /// Whether this entry matches any segment when no literal sibling does
    fn is_variable(&self) -> bool {
        false
    }
}

/// Entry of the container schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    /// Segment name
    pub value: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Nested entries
    #[serde(default, rename = "suggestions", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SchemaEntry>>,
}

impl SchemaEntry {
    /// Create a leaf entry
    pub fn new(value: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            title: title.into(),
            children: None,
        }
    }

    /// Attach child entries
    pub fn with_children(mut self, children: Vec<SchemaEntry>) -> Self {
        self.children = Some(children);
        self
    }
}

impl SchemaNode for SchemaEntry {
    fn value(&self) -> &str {
        &self.value
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn children(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }
}

/// Role of a key entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Grouping entry whose children are further keys
    Namespace,
    /// Assignable key
    #[default]
    Value,
    /// Wildcard matched when no literal sibling matches
    Variable,
}

/// Entry of the key schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchemaEntry {
    /// Segment name
    pub value: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Entry role
    #[serde(default, rename = "type")]
    pub kind: EntryKind,
    /// Rule applied to values assigned to this key
    #[serde(default, rename = "assign", skip_serializing_if = "Option::is_none")]
    pub assign_rule: Option<AssignRule>,
    /// Nested entries
    #[serde(default, rename = "suggestions", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<KeySchemaEntry>>,
}

impl KeySchemaEntry {
    fn with_kind(value: impl Into<String>, title: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            value: value.into(),
            title: title.into(),
            kind,
            assign_rule: None,
            children: None,
        }
    }

    /// Create a namespace entry holding `children`
    pub fn namespace(
        value: impl Into<String>,
        title: impl Into<String>,
        children: Vec<KeySchemaEntry>,
    ) -> Self {
        Self::with_kind(value, title, EntryKind::Namespace).with_children(children)
    }

    /// Create an assignable leaf entry
    pub fn leaf(value: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_kind(value, title, EntryKind::Value)
    }

    /// Create a wildcard entry
    pub fn variable(value: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_kind(value, title, EntryKind::Variable)
    }

    /// Attach child entries
    pub fn with_children(mut self, children: Vec<KeySchemaEntry>) -> Self {
        self.children = Some(children);
        self
    }

    /// Attach an assignment rule
    pub fn with_rule(mut self, rule: AssignRule) -> Self {
        self.assign_rule = Some(rule);
        self
    }
}

impl SchemaNode for KeySchemaEntry {
    fn value(&self) -> &str {
        &self.value
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn children(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }

    fn is_variable(&self) -> bool {
        self.kind == EntryKind::Variable
    }
}

/// Expected literal type of an assigned value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueType {
    /// Array literal
    Array,
    /// String literal
    String,
    /// Floating point number
    Float,
    /// Integer
    Int,
    /// `true` or `false`
    Bool,
    /// Application defined type, never checked
    Custom(String),
}

impl From<String> for ValueType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "array" => ValueType::Array,
            "string" => ValueType::String,
            "float" => ValueType::Float,
            "int" => ValueType::Int,
            "bool" => ValueType::Bool,
            _ => ValueType::Custom(value),
        }
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Array => write!(f, "array"),
            ValueType::String => write!(f, "string"),
            ValueType::Float => write!(f, "float"),
            ValueType::Int => write!(f, "int"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Validation and completion metadata of an assignable key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRule {
    /// Expected literal type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// Value that is redundant when written explicitly
    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Comma separated example values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    /// `in:a,b,c` or `between:lo,hi`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl AssignRule {
    /// Set the expected type
    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// Set the default value
    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    /// Set the comma separated example list
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Set the raw condition string
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Parsed condition, if one is set
    pub fn parsed_condition(&self) -> Option<Condition> {
        self.condition.as_deref().map(Condition::parse)
    }

    /// Example values in declaration order
    pub fn examples(&self) -> Vec<&str> {
        self.example
            .as_deref()
            .map(|example| example.split(',').collect())
            .unwrap_or_default()
    }
}

/// Decoded form of [`AssignRule::condition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Value must be one of the listed literals
    OneOf(Vec<String>),
    /// Value parsed as an integer must lie in `lo..=hi`
    Between {
        /// Lower bound, inclusive
        lo: i64,
        /// Upper bound, inclusive
        hi: i64,
    },
    /// Unknown prefix or a `between:` without exactly two integer bounds
    Unsupported,
}

impl Condition {
    /// Decode a raw condition string
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("in:") {
            return Condition::OneOf(rest.split(',').map(str::to_string).collect());
        }

        if let Some(rest) = raw.strip_prefix("between:") {
            let bounds: Vec<i64> = rest
                .split(',')
                .filter_map(|item| item.trim().parse().ok())
                .collect();

            if let [lo, hi] = bounds[..] {
                return Condition::Between { lo, hi };
            }
        }

        Condition::Unsupported
    }
}

/// Container and key schema for one document session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Container schema roots
    #[serde(default)]
    pub containers: Vec<SchemaEntry>,
    /// Key schema roots
    #[serde(default)]
    pub keys: Vec<KeySchemaEntry>,
}

impl Schema {
    /// Create a schema from both trees
    pub fn new(containers: Vec<SchemaEntry>, keys: Vec<KeySchemaEntry>) -> Self {
        Self { containers, keys }
    }

    /// Parse a schema from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a schema from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schema = Self::from_json_str(&content)?;
        log::debug!(
            "loaded schema from {}: {} containers, {} keys",
            path.display(),
            schema.containers.len(),
            schema.keys.len()
        );
        Ok(schema)
    }
}
