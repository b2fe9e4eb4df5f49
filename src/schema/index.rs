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

//! Dotted path lookup over schema trees
//!
//! Segments are matched level by level. At each level an exact `value` match
//! wins; otherwise the variable child of the current entry consumes the
//! segment. Lookups scan linearly and cache nothing.

use super::SchemaNode;

/// Successful path resolution
#[derive(Debug, PartialEq)]
pub struct Resolved<'s, N> {
    /// Deepest entry entered
    pub entry: &'s N,
    /// Number of segments consumed
    pub consumed: usize,
}

// Derived Clone/Copy would require `N: Clone`.
impl<N> Clone for Resolved<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Resolved<'_, N> {}

/// Failure policy of [`resolve_stack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    /// Return nothing unless the full path resolves
    Strict,
    /// Return the entries entered before the first failing segment
    Partial,
}

/// Resolve a dotted path such as `net.port`
pub fn resolve_path<'s, N: SchemaNode>(roots: &'s [N], path: &str) -> Option<Resolved<'s, N>> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(roots, &segments)
}

/// Resolve pre-split path segments
pub fn resolve_segments<'s, N, S>(roots: &'s [N], segments: &[S]) -> Option<Resolved<'s, N>>
where
    N: SchemaNode,
    S: AsRef<str>,
{
    let first: &str = segments.first()?.as_ref();
    if first.is_empty() {
        return None;
    }

    let mut entry = roots.iter().find(|item| item.value() == first)?;
    for segment in &segments[1..] {
        entry = descend(entry, segment.as_ref())?;
    }

    Some(Resolved {
        entry,
        consumed: segments.len(),
    })
}

/// Resolve a dotted path and return every entry entered, root first
pub fn resolve_stack<'s, N: SchemaNode>(
    roots: &'s [N],
    path: &str,
    mode: StackMode,
) -> Vec<&'s N> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve_stack_segments(roots, &segments, mode)
}

/// Pre-split variant of [`resolve_stack`]
pub fn resolve_stack_segments<'s, N, S>(
    roots: &'s [N],
    segments: &[S],
    mode: StackMode,
) -> Vec<&'s N>
where
    N: SchemaNode,
    S: AsRef<str>,
{
    let mut stack = Vec::with_capacity(segments.len());

    let Some(first) = segments.first() else {
        return stack;
    };
    let first: &str = first.as_ref();
    if first.is_empty() {
        return stack;
    }
    let Some(mut entry) = roots.iter().find(|item| item.value() == first) else {
        return stack;
    };
    stack.push(entry);

    for segment in &segments[1..] {
        match descend(entry, segment.as_ref()) {
            Some(next) => {
                entry = next;
                stack.push(entry);
            }
            None => {
                if mode == StackMode::Strict {
                    stack.clear();
                }
                return stack;
            }
        }
    }

    stack
}

/// Step into the child of `entry` named `segment`, or its variable child
fn descend<'s, N: SchemaNode>(entry: &'s N, segment: &str) -> Option<&'s N> {
    let children = entry.children()?;
    children
        .iter()
        .find(|child| child.value() == segment)
        .or_else(|| children.iter().find(|child| child.is_variable()))
}
