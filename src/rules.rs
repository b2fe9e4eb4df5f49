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

//! Assignment rule evaluation
//!
//! Two sides of the same [`AssignRule`]: [`validate`] checks a written value,
//! [`value_suggestions`] lists values to offer while typing one.
//!
//! Validation runs two independent facets. The default / condition facet
//! reports at most one of "redundant default", "invalid enum" or "out of
//! range"; the type facet runs regardless of its outcome.
//!
//! Type checks are strict: `int` must parse whole as an `i64`, so `1.5` and
//! `12abc` are rejected rather than truncated.

use crate::diagnostics::{Diagnostic, FixLabel, MessageKind, TextEdit};
use crate::schema::{AssignRule, Condition, ValueType};
use crate::syntax::Span;

/// Check `value` against `rule`
///
/// `key` is the span of the key identifier and `value_span` the span of the
/// literal. `value` is the literal text with surrounding whitespace removed.
pub fn validate(rule: &AssignRule, value: &str, key: Span, value_span: Span) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if rule.default_value.as_deref() == Some(value) {
        let whole = Span::new(key.from, value_span.to);
        diagnostics.push(
            Diagnostic::hint(whole, MessageKind::DefaultValue)
                .with_fix(FixLabel::Remove, TextEdit::delete(whole)),
        );
    } else if let Some(condition) = rule.parsed_condition() {
        match condition {
            Condition::OneOf(allowed) => {
                if !allowed.iter().any(|item| item == value) {
                    diagnostics.push(Diagnostic::error(value_span, MessageKind::InvalidEnum));
                }
            }
            Condition::Between { lo, hi } => {
                // Unparseable values are left to the type facet
                if let Ok(parsed) = value.parse::<i64>() {
                    if parsed < lo || parsed > hi {
                        diagnostics.push(Diagnostic::error(
                            value_span,
                            MessageKind::OutOfRange { lo, hi },
                        ));
                    }
                }
            }
            Condition::Unsupported => {
                log::debug!("ignoring unsupported condition {:?}", rule.condition);
            }
        }
    }

    if let Some(message) = rule.value_type.as_ref().and_then(|ty| type_mismatch(ty, value)) {
        diagnostics.push(Diagnostic::error(value_span, message));
    }

    diagnostics
}

fn type_mismatch(value_type: &ValueType, value: &str) -> Option<MessageKind> {
    let valid = match value_type {
        ValueType::Float => is_float(value),
        ValueType::Int => value.parse::<i64>().is_ok(),
        ValueType::Bool => matches!(value, "true" | "false"),
        ValueType::Array | ValueType::String | ValueType::Custom(_) => return None,
    };

    if valid {
        return None;
    }

    Some(match value_type {
        ValueType::Float => MessageKind::NotFloat,
        ValueType::Int => MessageKind::NotInt,
        _ => MessageKind::NotBool,
    })
}

/// Finite float, or the spelled-out `Infinity`
fn is_float(value: &str) -> bool {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => true,
        Ok(parsed) if parsed.is_infinite() => {
            value.trim_start_matches(['+', '-']) == "Infinity"
        }
        _ => false,
    }
}

/// Which rule facet produced a list of value suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    /// `in:` list or materialized `between:` range
    Condition,
    /// Comma separated examples
    Example,
    /// The default value alone
    Default,
}

/// Candidate values for a key, before prefix filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSuggestions {
    /// Facet the values come from
    pub source: SuggestionSource,
    /// Candidate values in declaration order
    pub values: Vec<String>,
}

impl ValueSuggestions {
    /// Whether the values should be narrowed by the typed prefix
    pub fn is_filterable(&self) -> bool {
        self.source != SuggestionSource::Default
    }
}

/// Values to offer for `rule`, by priority condition > example > default
///
/// A `between:` range wider than `range_limit` is not expanded and falls
/// through to the next facet. `None` means the rule offers nothing and the
/// caller should ask the external provider.
pub fn value_suggestions(rule: &AssignRule, range_limit: i64) -> Option<ValueSuggestions> {
    match rule.parsed_condition() {
        Some(Condition::OneOf(values)) => {
            return Some(ValueSuggestions {
                source: SuggestionSource::Condition,
                values,
            });
        }
        Some(Condition::Between { lo, hi }) => {
            let within_limit = hi
                .checked_sub(lo)
                .is_some_and(|width| (0..=range_limit).contains(&width));
            if within_limit {
                return Some(ValueSuggestions {
                    source: SuggestionSource::Condition,
                    values: (lo..=hi).map(|value| value.to_string()).collect(),
                });
            }
            log::debug!("range {lo}..={hi} exceeds completion limit {range_limit}");
        }
        Some(Condition::Unsupported) | None => {}
    }

    if rule.example.is_some() {
        return Some(ValueSuggestions {
            source: SuggestionSource::Example,
            values: rule.examples().into_iter().map(str::to_string).collect(),
        });
    }

    rule.default_value.as_ref().map(|default| ValueSuggestions {
        source: SuggestionSource::Default,
        values: vec![default.clone()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ENUM_RANGE_LIMIT;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const KEY: Span = Span { from: 0, to: 4 };
    const VALUE: Span = Span { from: 5, to: 7 };

    fn messages(rule: &AssignRule, value: &str) -> Vec<MessageKind> {
        validate(rule, value, KEY, VALUE)
            .into_iter()
            .map(|diagnostic| diagnostic.message)
            .collect()
    }

    #[rstest]
    #[case("301", vec![MessageKind::OutOfRange { lo: 0, hi: 300 }])]
    #[case("150", vec![])]
    #[case("0", vec![])]
    #[case("300", vec![])]
    #[case("-1", vec![MessageKind::OutOfRange { lo: 0, hi: 300 }])]
    #[case("abc", vec![MessageKind::NotInt])]
    fn test_between_with_int_type(#[case] value: &str, #[case] expected: Vec<MessageKind>) {
        let rule = AssignRule::default()
            .with_type(ValueType::Int)
            .with_condition("between:0,300");
        assert_eq!(messages(&rule, value), expected);
    }

    #[rstest]
    #[case("b", vec![])]
    #[case("d", vec![MessageKind::InvalidEnum])]
    #[case("B", vec![MessageKind::InvalidEnum])]
    fn test_enum_condition(#[case] value: &str, #[case] expected: Vec<MessageKind>) {
        let rule = AssignRule::default().with_condition("in:a,b,c");
        assert_eq!(messages(&rule, value), expected);
    }

    #[test]
    fn test_default_value_hint_spans_assignment() {
        let rule = AssignRule::default()
            .with_default("80")
            .with_condition("in:443");
        let diagnostics = validate(&rule, "80", KEY, VALUE);

        assert_eq!(diagnostics.len(), 1);
        let hint = &diagnostics[0];
        assert_eq!(hint.message, MessageKind::DefaultValue);
        assert_eq!(hint.span(), Span::new(0, 7));
        assert_eq!(hint.fixes[0].label, FixLabel::Remove);
        assert_eq!(hint.fixes[0].apply("port=80 \nx"), " \nx");
    }

    #[test]
    fn test_type_facet_runs_with_condition() {
        let rule = AssignRule::default()
            .with_type(ValueType::Bool)
            .with_condition("in:yes,no");
        assert_eq!(
            messages(&rule, "maybe"),
            vec![MessageKind::InvalidEnum, MessageKind::NotBool]
        );
    }

    #[rstest]
    #[case(ValueType::Float, "1.5", None)]
    #[case(ValueType::Float, "x", Some(MessageKind::NotFloat))]
    #[case(ValueType::Float, "nan", Some(MessageKind::NotFloat))]
    #[case(ValueType::Float, "NaN", Some(MessageKind::NotFloat))]
    #[case(ValueType::Float, "inf", Some(MessageKind::NotFloat))]
    #[case(ValueType::Float, "infinity", Some(MessageKind::NotFloat))]
    #[case(ValueType::Float, "Infinity", None)]
    #[case(ValueType::Float, "-2e3", None)]
    #[case(ValueType::Int, "12", None)]
    #[case(ValueType::Int, "1.5", Some(MessageKind::NotInt))]
    #[case(ValueType::Bool, "false", None)]
    #[case(ValueType::Bool, "yes", Some(MessageKind::NotBool))]
    #[case(ValueType::String, "anything", None)]
    #[case(ValueType::Custom("duration".into()), "5s", None)]
    fn test_type_checks(
        #[case] value_type: ValueType,
        #[case] value: &str,
        #[case] expected: Option<MessageKind>,
    ) {
        assert_eq!(type_mismatch(&value_type, value), expected);
    }

    #[test]
    fn test_suggestion_priority() {
        let rule = AssignRule::default()
            .with_condition("in:tcp,udp")
            .with_example("tcp")
            .with_default("udp");
        let suggestions = value_suggestions(&rule, DEFAULT_ENUM_RANGE_LIMIT).unwrap();
        assert_eq!(suggestions.source, SuggestionSource::Condition);
        assert_eq!(suggestions.values, vec!["tcp", "udp"]);

        let rule = AssignRule::default().with_example("a,b").with_default("a");
        let suggestions = value_suggestions(&rule, DEFAULT_ENUM_RANGE_LIMIT).unwrap();
        assert_eq!(suggestions.source, SuggestionSource::Example);
        assert!(suggestions.is_filterable());

        let rule = AssignRule::default().with_default("a");
        let suggestions = value_suggestions(&rule, DEFAULT_ENUM_RANGE_LIMIT).unwrap();
        assert_eq!(suggestions.source, SuggestionSource::Default);
        assert!(!suggestions.is_filterable());

        assert!(value_suggestions(&AssignRule::default(), DEFAULT_ENUM_RANGE_LIMIT).is_none());
    }

    #[test]
    fn test_range_materialization_limit() {
        let rule = AssignRule::default().with_condition("between:1,3");
        assert_eq!(
            value_suggestions(&rule, DEFAULT_ENUM_RANGE_LIMIT).unwrap().values,
            vec!["1", "2", "3"]
        );

        let wide = AssignRule::default()
            .with_condition("between:0,1000")
            .with_example("80,443");
        let suggestions = value_suggestions(&wide, DEFAULT_ENUM_RANGE_LIMIT).unwrap();
        assert_eq!(suggestions.source, SuggestionSource::Example);

        let suggestions = value_suggestions(&wide, 1000).unwrap();
        assert_eq!(suggestions.source, SuggestionSource::Condition);
        assert_eq!(suggestions.values.len(), 1001);

        let inverted = AssignRule::default().with_condition("between:5,1");
        assert!(value_suggestions(&inverted, DEFAULT_ENUM_RANGE_LIMIT).is_none());
    }
}
