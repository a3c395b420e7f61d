// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tree builder for constructing component hierarchy from content lines.
//!
//! # Algorithm
//!
//! The tree builder uses a stack-based algorithm:
//! 1. On BEGIN:X, push a new component onto the stack
//! 2. On property, add to the current component (top of stack)
//! 3. On END:X, pop from stack and add to parent component
//!
//! Components still open at end of input are closed implicitly, so a message
//! that lost its trailing `END:VCALENDAR` still yields its events. The missing
//! END is reported as [`TreeBuildError::UnmatchedBegin`].

use crate::keyword::{KW_BEGIN, KW_END};
use crate::syntax::lexer::Span;
use crate::syntax::scanner::ContentLine;

/// A parsed iCalendar component (e.g., VCALENDAR, VEVENT)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawComponent {
    /// Component name as written in the BEGIN line
    pub name: String,
    /// Properties in original order
    pub properties: Vec<ContentLine>,
    /// Nested child components
    pub children: Vec<RawComponent>,
    /// Span of the entire component (from BEGIN to END)
    pub span: Span,
}

impl RawComponent {
    /// Check the component name, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// All properties with the given name, ignoring ASCII case.
    pub fn properties_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ContentLine> {
        self.properties
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// First property with the given name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&ContentLine> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Build the component tree from scanned content lines.
///
/// Lines carrying scan errors are skipped, and properties outside any
/// component are dropped.
#[must_use]
pub fn build_tree(lines: &[ContentLine]) -> TreeBuilderResult {
    let mut stack: Vec<RawComponent> = Vec::new();
    let mut roots: Vec<RawComponent> = Vec::new();
    let mut errors: Vec<TreeBuildError> = Vec::new();

    for line in lines {
        if line.error.is_some() {
            continue;
        }

        if line.name.eq_ignore_ascii_case(KW_BEGIN) {
            if !line.parameters.is_empty() {
                errors.push(TreeBuildError::BeginEndWithParameters {
                    name: line.name.clone(),
                    span: line.span,
                });
            }

            stack.push(RawComponent {
                name: line.value.clone(),
                properties: Vec::new(),
                children: Vec::new(),
                span: line.span,
            });
        } else if line.name.eq_ignore_ascii_case(KW_END) {
            if !line.parameters.is_empty() {
                errors.push(TreeBuildError::BeginEndWithParameters {
                    name: line.name.clone(),
                    span: line.span,
                });
            }

            if let Some(mut component) = stack.pop() {
                if !component.name.eq_ignore_ascii_case(&line.value) {
                    errors.push(TreeBuildError::MismatchedNesting {
                        expected: component.name.clone(),
                        found: line.value.clone(),
                        span: line.span,
                    });
                }

                component.span = Span::new(component.span.start, line.span.end);
                attach(&mut stack, &mut roots, component);
            } else {
                errors.push(TreeBuildError::UnmatchedEnd {
                    name: line.value.clone(),
                    span: line.span,
                });
            }
        } else if let Some(current) = stack.last_mut() {
            current.properties.push(line.clone());
        }
    }

    while let Some(component) = stack.pop() {
        errors.push(TreeBuildError::UnmatchedBegin {
            name: component.name.clone(),
            span: component.span,
        });
        attach(&mut stack, &mut roots, component);
    }

    TreeBuilderResult { roots, errors }
}

fn attach(stack: &mut [RawComponent], roots: &mut Vec<RawComponent>, component: RawComponent) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(component),
        None => roots.push(component),
    }
}

/// Errors that can occur during tree building.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeBuildError {
    /// Unmatched END (no corresponding BEGIN)
    #[error("unmatched END:{name} (no corresponding BEGIN)")]
    UnmatchedEnd {
        /// Component name that was being closed
        name: String,
        /// Span of the END line
        span: Span,
    },

    /// Unmatched BEGIN (component closed implicitly at end of input)
    #[error("unmatched BEGIN:{name} (component not closed)")]
    UnmatchedBegin {
        /// Component name that was not closed
        name: String,
        /// Span of the BEGIN line
        span: Span,
    },

    /// Mismatched BEGIN/END names
    #[error("mismatched nesting: expected END:{expected}, found END:{found}")]
    MismatchedNesting {
        /// Expected component name
        expected: String,
        /// Actual component name found
        found: String,
        /// Span of the END line
        span: Span,
    },

    /// BEGIN or END line with parameters (not allowed per RFC 5545)
    #[error("{name} line with parameters (not allowed per RFC 5545)")]
    BeginEndWithParameters {
        /// BEGIN or END
        name: String,
        /// Span of the line
        span: Span,
    },
}

/// Result of building a tree.
#[derive(Debug, Clone)]
pub struct TreeBuilderResult {
    /// The root components (typically one VCALENDAR)
    pub roots: Vec<RawComponent>,
    /// Errors encountered during tree building
    pub errors: Vec<TreeBuildError>,
}
