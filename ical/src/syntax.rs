// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Untyped iCalendar syntax: content lines and the BEGIN/END component tree.
//!
//! ```text
//! Source → Lexer → Scanner → Tree Builder → RawComponent roots
//! ```

pub mod lexer;
pub mod scanner;
pub mod tree_builder;

pub use lexer::Span;
pub use scanner::{ContentLine, ContentLineError, ContentParameter, ParameterErrorKind};
pub use tree_builder::{RawComponent, TreeBuildError, TreeBuilderResult};

/// Run the whole syntax pipeline over source text.
///
/// Lines that fail to scan are logged and skipped; structural errors are
/// returned alongside the roots.
#[must_use]
pub fn parse_raw(src: &str) -> TreeBuilderResult {
    let scanned = scanner::scan_content_lines(lexer::tokenize(src));
    if scanned.has_errors {
        for line in &scanned.lines {
            if let Some(err) = &line.error {
                // blank lines between concatenated blocks are harmless
                if matches!(err, ContentLineError::EmptyLine { .. }) {
                    tracing::trace!(%err, "skipping blank line");
                } else {
                    tracing::warn!(%err, "skipping malformed content line");
                }
            }
        }
    }
    tree_builder::build_tree(&scanned.lines)
}
