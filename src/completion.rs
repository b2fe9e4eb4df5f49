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

//! Autocomplete resolution
//!
//! Completion dispatches on the kind of node under the cursor. Container and
//! key names complete one dotted segment at a time from the schema; values
//! complete from the key's assignment rule. Whenever the schema leaves a
//! branch open, the request is handed to an injected [`SuggestionProvider`],
//! which is the only place completion suspends.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::CompletionConfig;
use crate::error::Result;
use crate::rules::{self, SuggestionSource};
use crate::schema::{Schema, SchemaNode, resolve_path, resolve_segments};
use crate::syntax::{Bias, Node, NodeKind, SyntaxTree};

/// What an external lookup is asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Children of a container without literal children
    Container,
    /// Children of a key without literal children
    Key,
    /// Instances of a wildcard key entry
    Variable,
    /// Values of a key without rule suggestions
    Value,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Container => write!(f, "container"),
            ProviderKind::Key => write!(f, "key"),
            ProviderKind::Variable => write!(f, "variable"),
            ProviderKind::Value => write!(f, "value"),
        }
    }
}

/// Source of suggestions for open-ended schema branches
///
/// Implementations may be slow (network, database). Callers that abandon a
/// request simply drop the returned future.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Suggest labels for `kind` under the dotted `path`, given the typed `prefix`
    async fn suggest(&self, kind: ProviderKind, path: &str, prefix: &str) -> Result<Vec<String>>;
}

/// Presentation class of a completion option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    /// Container name or default value
    Constant,
    /// Key name
    Type,
    /// Wildcard key
    Variable,
    /// Value from a condition
    Enum,
    /// Example or provider value
    Text,
}

/// A single completion option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionOption {
    /// Text inserted
    pub label: String,
    /// Schema title, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Presentation class
    pub kind: CompletionKind,
}

impl CompletionOption {
    fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            detail: None,
            kind,
        }
    }

    fn from_entry<N: SchemaNode>(entry: &N, kind: CompletionKind) -> Self {
        Self {
            label: entry.value().to_string(),
            detail: Some(entry.title().to_string()),
            kind,
        }
    }
}

/// Options plus the range they replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Start of the replaced range
    pub from: usize,
    /// End of the replaced range; `None` extends to the cursor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<usize>,
    /// Options in schema order
    pub options: Vec<CompletionOption>,
}

impl CompletionResult {
    /// Labels of all options
    pub fn labels(&self) -> Vec<&str> {
        self.options.iter().map(|option| option.label.as_str()).collect()
    }
}

/// Substring matcher for typed prefixes
///
/// The prefix is matched literally anywhere in the candidate.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    pattern: Option<Regex>,
    literal: String,
}

impl PrefixMatcher {
    /// Build a matcher for `prefix`
    pub fn new(prefix: &str, case_insensitive: bool) -> Self {
        let pattern = if prefix.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(prefix))
                .case_insensitive(case_insensitive)
                .build()
                .ok()
        };
        Self {
            pattern,
            literal: prefix.to_string(),
        }
    }

    /// Whether `candidate` contains the prefix
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.is_match(candidate),
            None => candidate.contains(&self.literal),
        }
    }
}

/// Resolves completions against one schema
pub struct CompletionResolver<'a> {
    schema: &'a Schema,
    config: &'a CompletionConfig,
    provider: Option<&'a dyn SuggestionProvider>,
}

impl<'a> CompletionResolver<'a> {
    /// Create a resolver without an external provider
    pub fn new(schema: &'a Schema, config: &'a CompletionConfig) -> Self {
        Self {
            schema,
            config,
            provider: None,
        }
    }

    /// Attach an external provider for open-ended branches
    pub fn with_provider(mut self, provider: &'a dyn SuggestionProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Complete at a cursor offset
    pub async fn complete_at(
        &self,
        tree: &SyntaxTree,
        offset: usize,
    ) -> Result<Option<CompletionResult>> {
        let node = tree.resolve_inner(offset, Bias::Before);
        if node.kind() == NodeKind::Document {
            if let Some(assign) = assign_before(tree, offset) {
                return self.complete_after_gap(assign, offset).await;
            }
        }
        self.complete(node).await
    }

    /// Complete for the node under the cursor
    ///
    /// `Ok(None)` means there is nothing to offer. Errors only come from the
    /// external provider.
    pub async fn complete(&self, node: Node<'_>) -> Result<Option<CompletionResult>> {
        match node.kind() {
            NodeKind::ContainerIdentifier => self.complete_container(node).await,
            NodeKind::ValueIdentifier => self.complete_key(node).await,
            NodeKind::Assign => self.complete_after_assign(node).await,
            _ => self.complete_value_node(node).await,
        }
    }

    async fn complete_container(&self, node: Node<'_>) -> Result<Option<CompletionResult>> {
        let text = node.text();
        let segments: Vec<&str> = text.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(None);
        };
        if segments[0].is_empty() {
            return Ok(None);
        }

        if parents.is_empty() {
            let matcher = self.matcher(last);
            return Ok(Some(CompletionResult {
                from: node.from(),
                to: Some(node.to()),
                options: self
                    .schema
                    .containers
                    .iter()
                    .filter(|entry| matcher.matches(&entry.value))
                    .map(|entry| CompletionOption::from_entry(entry, CompletionKind::Constant))
                    .collect(),
            }));
        }

        let Some(resolved) = resolve_segments(&self.schema.containers, parents) else {
            return Ok(None);
        };
        let from = segment_start(node, last);

        if let Some(children) = resolved.entry.children() {
            let matcher = self.matcher(last);
            return Ok(Some(CompletionResult {
                from,
                to: Some(node.to()),
                options: children
                    .iter()
                    .filter(|entry| matcher.matches(&entry.value))
                    .map(|entry| CompletionOption::from_entry(entry, CompletionKind::Constant))
                    .collect(),
            }));
        }

        let path = parents.join(".");
        let values = self.ask(ProviderKind::Container, &path, last).await?;
        Ok(values.map(|values| CompletionResult {
            from,
            to: Some(node.to()),
            options: labels(values, CompletionKind::Constant),
        }))
    }

    async fn complete_key(&self, node: Node<'_>) -> Result<Option<CompletionResult>> {
        let text = node.text();
        let segments: Vec<&str> = text.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(None);
        };
        if segments[0].is_empty() {
            return Ok(None);
        }

        let matcher = self.matcher(last);

        if parents.is_empty() {
            return Ok(Some(CompletionResult {
                from: node.from(),
                to: Some(node.to()),
                options: self
                    .schema
                    .keys
                    .iter()
                    .filter(|entry| matcher.matches(&entry.value))
                    .map(|entry| CompletionOption::from_entry(entry, CompletionKind::Type))
                    .collect(),
            }));
        }

        let Some(resolved) = resolve_segments(&self.schema.keys, parents) else {
            return Ok(None);
        };
        let from = segment_start(node, last);
        let path = parents.join(".");

        if let Some(children) = resolved.entry.children() {
            let options: Vec<CompletionOption> = children
                .iter()
                .filter(|entry| matcher.matches(&entry.value))
                .map(|entry| {
                    let kind = if entry.is_variable() {
                        CompletionKind::Variable
                    } else {
                        CompletionKind::Type
                    };
                    CompletionOption::from_entry(entry, kind)
                })
                .collect();

            if !options.is_empty() {
                return Ok(Some(CompletionResult {
                    from,
                    to: Some(node.to()),
                    options,
                }));
            }

            if let Some(variable) = children.iter().find(|entry| entry.is_variable()) {
                let variable_path = format!("{path}.{}", variable.value);
                let values = self.ask(ProviderKind::Variable, &variable_path, last).await?;
                return Ok(values.map(|values| CompletionResult {
                    from,
                    to: Some(node.to()),
                    options: labels(values, CompletionKind::Type),
                }));
            }
        }

        let values = self.ask(ProviderKind::Key, &path, last).await?;
        Ok(values.map(|values| CompletionResult {
            from,
            to: Some(node.to()),
            options: labels(values, CompletionKind::Type),
        }))
    }

    /// Cursor on `=`: the value starts right after it
    async fn complete_after_assign(&self, node: Node<'_>) -> Result<Option<CompletionResult>> {
        let Some(key) = node
            .prev_sibling()
            .filter(|prev| prev.kind() == NodeKind::ValueIdentifier)
        else {
            return Ok(None);
        };

        let typed = node.next_sibling().map(|next| next.text()).unwrap_or_default();
        self.complete_value(node.from() + 1, key.text(), typed.trim()).await
    }

    /// Cursor in blanks after `=` with nothing typed yet
    async fn complete_after_gap(
        &self,
        assign: Node<'_>,
        offset: usize,
    ) -> Result<Option<CompletionResult>> {
        let Some(key) = assign
            .prev_sibling()
            .filter(|prev| prev.kind() == NodeKind::ValueIdentifier)
        else {
            return Ok(None);
        };

        self.complete_value(offset, key.text(), "").await
    }

    /// Cursor on a node that follows `key =`
    async fn complete_value_node(&self, node: Node<'_>) -> Result<Option<CompletionResult>> {
        let Some(key) = node
            .prev_sibling()
            .filter(|prev| prev.kind() == NodeKind::Assign)
            .and_then(|assign| assign.prev_sibling())
            .filter(|prev| prev.kind() == NodeKind::ValueIdentifier)
        else {
            return Ok(None);
        };

        self.complete_value(node.from(), key.text(), node.text().trim()).await
    }

    async fn complete_value(
        &self,
        from: usize,
        key: &str,
        typed: &str,
    ) -> Result<Option<CompletionResult>> {
        let Some(resolved) = resolve_path(&self.schema.keys, key) else {
            return Ok(None);
        };

        let suggestions = resolved
            .entry
            .assign_rule
            .as_ref()
            .and_then(|rule| rules::value_suggestions(rule, self.config.enum_range_limit));

        if let Some(suggestions) = suggestions {
            let kind = match suggestions.source {
                SuggestionSource::Condition => CompletionKind::Enum,
                SuggestionSource::Example => CompletionKind::Text,
                SuggestionSource::Default => CompletionKind::Constant,
            };
            let matcher = self.matcher(typed);
            let filter = suggestions.is_filterable();
            return Ok(Some(CompletionResult {
                from,
                to: None,
                options: suggestions
                    .values
                    .into_iter()
                    .filter(|value| !filter || matcher.matches(value))
                    .map(|value| CompletionOption::new(value, kind))
                    .collect(),
            }));
        }

        let values = self.ask(ProviderKind::Value, key, typed).await?;
        Ok(values.map(|values| CompletionResult {
            from,
            to: None,
            options: labels(values, CompletionKind::Text),
        }))
    }

    async fn ask(&self, kind: ProviderKind, path: &str, prefix: &str) -> Result<Option<Vec<String>>> {
        let Some(provider) = self.provider else {
            log::debug!("no provider for {kind} lookup of '{path}'");
            return Ok(None);
        };

        log::debug!("asking provider for {kind} '{path}' with prefix '{prefix}'");
        let values = provider.suggest(kind, path, prefix).await?;
        Ok(Some(values))
    }

    fn matcher(&self, prefix: &str) -> PrefixMatcher {
        PrefixMatcher::new(prefix, self.config.case_insensitive)
    }
}

/// Offset where the last dotted segment of `node` starts
fn segment_start(node: Node<'_>, last: &str) -> usize {
    node.from() + node.text().len() - last.len()
}

/// `=` separated from `offset` by blanks only
fn assign_before(tree: &SyntaxTree, offset: usize) -> Option<Node<'_>> {
    let last = tree
        .root()
        .children()
        .take_while(|child| child.to() <= offset)
        .last()?;
    if last.kind() != NodeKind::Assign {
        return None;
    }
    let gap = tree.text().get(last.to()..offset)?;
    gap.chars().all(|c| c == ' ' || c == '\t').then_some(last)
}

fn labels(values: Vec<String>, kind: CompletionKind) -> Vec<CompletionOption> {
    values
        .into_iter()
        .map(|value| CompletionOption::new(value, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::schema::{AssignRule, KeySchemaEntry, SchemaEntry};
    use crate::syntax::scan;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<(ProviderKind, String, String)>>,
    }

    impl RecordingProvider {
        fn calls(&self) -> Vec<(ProviderKind, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionProvider for RecordingProvider {
        async fn suggest(&self, kind: ProviderKind, path: &str, prefix: &str) -> Result<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .push((kind, path.to_string(), prefix.to_string()));
            Ok(vec![format!("{kind}-1"), format!("{kind}-2")])
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl SuggestionProvider for FailingProvider {
        async fn suggest(&self, kind: ProviderKind, path: &str, _prefix: &str) -> Result<Vec<String>> {
            Err(AnalyzerError::provider(kind, path, "backend offline"))
        }
    }

    fn schema() -> Schema {
        Schema::new(
            vec![
                SchemaEntry::new("server", "Server")
                    .with_children(vec![SchemaEntry::new("main", "Main"), SchemaEntry::new("backup", "Backup")]),
                SchemaEntry::new("pool", "Pool"),
            ],
            vec![
                KeySchemaEntry::namespace(
                    "net",
                    "Network",
                    vec![
                        KeySchemaEntry::leaf("timeout", "Timeout"),
                        KeySchemaEntry::leaf("host", "Host"),
                    ],
                ),
                KeySchemaEntry::namespace(
                    "iface",
                    "Interfaces",
                    vec![KeySchemaEntry::variable("name", "Interface name").with_children(vec![
                        KeySchemaEntry::leaf("mtu", "MTU"),
                    ])],
                ),
                KeySchemaEntry::namespace("env", "Environment", vec![]),
                KeySchemaEntry::leaf("proto", "Protocol")
                    .with_rule(AssignRule::default().with_condition("in:tcp,udp,TLS")),
                KeySchemaEntry::leaf("level", "Level")
                    .with_rule(AssignRule::default().with_condition("between:1,12")),
                KeySchemaEntry::leaf("mode", "Mode").with_rule(AssignRule::default().with_default("auto")),
                KeySchemaEntry::leaf("user", "User"),
            ],
        )
    }

    async fn complete(text: &str, offset: usize, provider: Option<&dyn SuggestionProvider>) -> Option<CompletionResult> {
        let schema = schema();
        let config = CompletionConfig::default();
        let tree = scan(text);
        let mut resolver = CompletionResolver::new(&schema, &config);
        if let Some(provider) = provider {
            resolver = resolver.with_provider(provider);
        }
        resolver.complete_at(&tree, offset).await.unwrap()
    }

    #[tokio::test]
    async fn test_key_children_after_dot() {
        let result = complete("net.", 4, None).await.unwrap();
        assert_eq!(result.labels(), vec!["timeout", "host"]);
        assert_eq!(result.from, 4);
        assert_eq!(result.to, Some(4));
        assert_eq!(result.options[0].detail.as_deref(), Some("Timeout"));
        assert_eq!(result.options[0].kind, CompletionKind::Type);
    }

    #[tokio::test]
    async fn test_multi_segment_offsets() {
        let result = complete("x=1\nnet.ti", 10, None).await.unwrap();
        assert_eq!(result.labels(), vec!["timeout"]);
        assert_eq!(result.from, 8);
        assert_eq!(result.to, Some(10));

        let result = complete("[server.MA", 10, None).await.unwrap();
        assert_eq!(result.labels(), vec!["main"]);
        assert_eq!(result.from, 8);
        assert_eq!(result.options[0].kind, CompletionKind::Constant);
    }

    #[tokio::test]
    async fn test_top_level_filtering() {
        let result = complete("[o", 2, None).await.unwrap();
        assert_eq!(result.labels(), vec!["pool"]);
        assert_eq!(result.from, 1);

        let result = complete("E", 1, None).await.unwrap();
        assert_eq!(result.labels(), vec!["net", "iface", "env", "level", "mode", "user"]);
    }

    #[tokio::test]
    async fn test_open_container_asks_provider() {
        let provider = RecordingProvider::default();
        let result = complete("[pool.a", 7, Some(&provider)).await.unwrap();
        assert_eq!(result.labels(), vec!["container-1", "container-2"]);
        assert_eq!(result.from, 6);
        assert_eq!(
            provider.calls(),
            vec![(ProviderKind::Container, "pool".to_string(), "a".to_string())]
        );
    }

    #[tokio::test]
    async fn test_variable_child_asks_provider() {
        let provider = RecordingProvider::default();
        let result = complete("iface.et", 8, Some(&provider)).await.unwrap();
        assert_eq!(result.labels(), vec!["variable-1", "variable-2"]);
        assert_eq!(result.from, 6);
        assert_eq!(
            provider.calls(),
            vec![(ProviderKind::Variable, "iface.name".to_string(), "et".to_string())]
        );
    }

    #[tokio::test]
    async fn test_wildcard_entry_listed_when_matching() {
        let result = complete("iface.na", 8, None).await.unwrap();
        assert_eq!(result.labels(), vec!["name"]);
        assert_eq!(result.options[0].kind, CompletionKind::Variable);
    }

    #[tokio::test]
    async fn test_key_without_matches_asks_provider() {
        let provider = RecordingProvider::default();
        let result = complete("env.P", 5, Some(&provider)).await.unwrap();
        assert_eq!(result.labels(), vec!["key-1", "key-2"]);
        assert_eq!(
            provider.calls(),
            vec![(ProviderKind::Key, "env".to_string(), "P".to_string())]
        );

        assert_eq!(complete("env.P", 5, None).await, None);
    }

    #[tokio::test]
    async fn test_value_completion_on_assign() {
        let result = complete("proto=", 6, None).await.unwrap();
        assert_eq!(result.labels(), vec!["tcp", "udp", "TLS"]);
        assert_eq!(result.from, 6);
        assert_eq!(result.to, None);
        assert_eq!(result.options[0].kind, CompletionKind::Enum);
    }

    #[tokio::test]
    async fn test_value_completion_on_literal() {
        let result = complete("proto= tl", 9, None).await.unwrap();
        assert_eq!(result.labels(), vec!["TLS"]);
        assert_eq!(result.from, 7);

        let result = complete("level=1", 7, None).await.unwrap();
        assert_eq!(result.labels(), vec!["1", "10", "11", "12"]);
    }

    #[tokio::test]
    async fn test_value_completion_after_blank() {
        let result = complete("proto= ", 7, None).await.unwrap();
        assert_eq!(result.labels(), vec!["tcp", "udp", "TLS"]);
        assert_eq!(result.from, 7);
        assert_eq!(result.to, None);

        let result = complete("x=1\nproto =  ", 13, None).await.unwrap();
        assert_eq!(result.from, 13);
        assert_eq!(result.labels().len(), 3);

        assert_eq!(complete("proto=\n ", 8, None).await, None);
    }

    #[tokio::test]
    async fn test_default_value_not_filtered() {
        let result = complete("mode=x", 6, None).await.unwrap();
        assert_eq!(result.labels(), vec!["auto"]);
        assert_eq!(result.options[0].kind, CompletionKind::Constant);
    }

    #[tokio::test]
    async fn test_value_without_rule_asks_provider() {
        let provider = RecordingProvider::default();
        let result = complete("user=ro", 7, Some(&provider)).await.unwrap();
        assert_eq!(result.labels(), vec!["value-1", "value-2"]);
        assert_eq!(result.options[0].kind, CompletionKind::Text);
        assert_eq!(
            provider.calls(),
            vec![(ProviderKind::Value, "user".to_string(), "ro".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_completion_outside_identifiers() {
        assert_eq!(complete("# note", 3, None).await, None);
        assert_eq!(complete("", 0, None).await, None);
        assert_eq!(complete("unknown.x", 9, None).await, None);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let schema = schema();
        let config = CompletionConfig::default();
        let tree = scan("user=");
        let provider = FailingProvider;
        let resolver = CompletionResolver::new(&schema, &config).with_provider(&provider);

        let err = resolver.complete_at(&tree, 5).await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Provider { kind: ProviderKind::Value, .. }));
    }

    #[test]
    fn test_prefix_matcher() {
        assert!(PrefixMatcher::new("OUT", true).matches("timeout"));
        assert!(!PrefixMatcher::new("OUT", false).matches("timeout"));
        assert!(PrefixMatcher::new("a.b", true).matches("xa.by"));
        assert!(!PrefixMatcher::new("a.b", true).matches("axb"));
        assert!(PrefixMatcher::new("", true).matches("anything"));
    }
}
