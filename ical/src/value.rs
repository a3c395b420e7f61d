// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value type parsing module for iCalendar property values.
//!
//! This module handles the parsing and validation of the iCalendar value
//! types a scheduling message needs, as defined in RFC 5545 Section 3.3.

mod datetime;
mod miscellaneous;
mod rrule;
mod text;

pub use datetime::{DateTimeValue, MalformedDateTime};
pub use rrule::{
    ByRule, ByRuleKind, Frequency, MalformedRule, RecurrenceRule, WeekDay, WeekDayNum,
};
pub use text::{escape_text, split_text_list, unescape_text};
