// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iTIP (RFC 5546) scheduling messages.
//!
//! A message text holds one or more VCALENDAR blocks, each carrying a METHOD
//! and the VEVENTs it applies to. Blocks are parsed independently: a block
//! that fails does not prevent the others from being read.

use std::str::FromStr;

use crate::component::{ComponentError, EventComponent};
use crate::keyword::{KW_METHOD, KW_VCALENDAR, KW_VEVENT};
use crate::syntax::{RawComponent, Span, TreeBuildError, parse_raw};

/// iTIP method, RFC 5546 Section 1.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum Method {
    Publish,
    Request,
    Reply,
    Add,
    Cancel,
    Refresh,
    Counter,
    DeclineCounter,
}

/// One VCALENDAR block of a scheduling message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    /// The block's METHOD
    pub method: Method,

    /// Events in source order
    pub components: Vec<EventComponent>,

    /// VEVENTs that could not be read
    pub rejected: Vec<ComponentError>,
}

/// Error for a VCALENDAR block that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedMessage {
    /// A top-level component other than VCALENDAR
    #[error("expected VCALENDAR at {span}, found {name}")]
    NotACalendar {
        /// Component name found
        name: String,
        /// Where the component is
        span: Span,
    },

    /// The block has no METHOD property
    #[error("VCALENDAR at {span} has no METHOD")]
    MissingMethod {
        /// Where the block is
        span: Span,
    },

    /// The METHOD value is not an iTIP method
    #[error("VCALENDAR at {span} has unknown METHOD {value}")]
    UnknownMethod {
        /// The METHOD value
        value: String,
        /// Where the block is
        span: Span,
    },

    /// The block carries no VEVENT
    #[error("VCALENDAR at {span} contains no VEVENT")]
    NoEvents {
        /// Where the block is
        span: Span,
    },

    /// The BEGIN/END structure is broken
    #[error(transparent)]
    Syntax(#[from] TreeBuildError),
}

/// Parse the text of a scheduling message into its VCALENDAR blocks.
///
/// Results are in source order. Structural errors are reported in place;
/// a component left open at the end of input is closed and kept.
#[must_use]
pub fn parse_message(text: &str) -> Vec<Result<MessageBlock, MalformedMessage>> {
    let tree = parse_raw(text);

    let mut results: Vec<(usize, Result<MessageBlock, MalformedMessage>)> = tree
        .roots
        .iter()
        .map(|root| (root.span.start, parse_block(root)))
        .collect();

    for err in tree.errors {
        match err {
            TreeBuildError::UnmatchedBegin { .. } | TreeBuildError::BeginEndWithParameters { .. } => {
                tracing::warn!(%err, "recovered from malformed structure");
            }
            err => results.push((error_position(&err), Err(err.into()))),
        }
    }

    results.sort_by_key(|(pos, _)| *pos);
    results.into_iter().map(|(_, result)| result).collect()
}

fn error_position(err: &TreeBuildError) -> usize {
    match err {
        TreeBuildError::UnmatchedEnd { span, .. }
        | TreeBuildError::UnmatchedBegin { span, .. }
        | TreeBuildError::MismatchedNesting { span, .. }
        | TreeBuildError::BeginEndWithParameters { span, .. } => span.start,
    }
}

fn parse_block(root: &RawComponent) -> Result<MessageBlock, MalformedMessage> {
    let span = root.span;
    if !root.is(KW_VCALENDAR) {
        return Err(MalformedMessage::NotACalendar {
            name: root.name.clone(),
            span,
        });
    }

    let value = root
        .property(KW_METHOD)
        .map(|line| line.value.trim())
        .ok_or(MalformedMessage::MissingMethod { span })?;
    let method = Method::from_str(value).map_err(|_| MalformedMessage::UnknownMethod {
        value: value.to_owned(),
        span,
    })?;

    let mut block = MessageBlock {
        method,
        components: Vec::new(),
        rejected: Vec::new(),
    };
    let mut events = 0;
    for child in &root.children {
        if !child.is(KW_VEVENT) {
            tracing::debug!(component = %child.name, "skipping non-event component");
            continue;
        }
        events += 1;
        match EventComponent::try_from(child) {
            Ok(event) => block.components.push(event),
            Err(err) => {
                tracing::warn!(%err, span = %child.span, "rejecting event");
                block.rejected.push(err);
            }
        }
    }

    if events == 0 {
        return Err(MalformedMessage::NoEvents { span });
    }
    Ok(block)
}
