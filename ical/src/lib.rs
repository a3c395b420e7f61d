// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse and represent iCalendar events and iTIP scheduling messages.
//!
//! The crate reads RFC 5545 text into [`EventComponent`]s grouped by
//! [`MessageBlock`], models recurrence rules as [`RecurrenceRule`], and
//! writes components back with line folding.

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod component;
pub mod formatter;
pub mod itip;
pub mod keyword;
pub mod syntax;
pub mod value;

pub use crate::component::{
    ComponentError, EventComponent, EventStatus, Organizer, RecurrenceRange, same_recurrence_id,
};
pub use crate::formatter::{FoldingStyle, FormatOptions, format_calendar};
pub use crate::itip::{MalformedMessage, MessageBlock, Method, parse_message};
pub use crate::value::{
    ByRule, ByRuleKind, DateTimeValue, Frequency, MalformedDateTime, MalformedRule,
    RecurrenceRule, WeekDay, WeekDayNum,
};
