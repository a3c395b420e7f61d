// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed VEVENT component, RFC 5545 Section 3.6.1.
//!
//! An [`EventComponent`] is either the master of a series (no RECURRENCE-ID)
//! or an exception instance overriding one occurrence. Updates go through
//! consuming `with_*` methods so a revised component never aliases the one it
//! was derived from.

use std::fmt::{self, Display};
use std::str::FromStr;

use jiff::tz::TimeZone;

use crate::formatter::FormatOptions;
use crate::keyword::{
    KW_CATEGORIES, KW_CN, KW_DATE, KW_DESCRIPTION, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_EXDATE,
    KW_ORGANIZER, KW_RANGE, KW_RANGE_THISANDFUTURE, KW_RECURRENCE_ID, KW_RELATED_TO, KW_RRULE,
    KW_SEQUENCE, KW_STATUS, KW_SUMMARY, KW_TZID, KW_UID, KW_VALUE, KW_VEVENT,
};
use crate::syntax::{ContentLine, RawComponent, Span};
use crate::value::{
    DateTimeValue, MalformedDateTime, RecurrenceRule, split_text_list, unescape_text,
};

/// A VEVENT, master or exception instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventComponent {
    uid: String,
    recurrence_id: Option<DateTimeValue>,
    range: Option<RecurrenceRange>,
    start: Option<DateTimeValue>,
    end: Option<DateTimeValue>,
    rrule: Option<RecurrenceRule>,
    exception_dates: Vec<DateTimeValue>,
    related_to: Vec<String>,
    sequence: u32,
    dtstamp: Option<DateTimeValue>,
    summary: Option<String>,
    description: Option<String>,
    organizer: Option<Organizer>,
    categories: Vec<String>,
    status: Option<EventStatus>,
    /// Unrecognized properties, kept verbatim
    extra: Vec<ContentLine>,
    problems: Vec<String>,
}

/// The RANGE parameter of a RECURRENCE-ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrenceRange {
    /// This occurrence and every later one
    ThisAndFuture,
}

/// Event status, RFC 5545 Section 3.8.1.11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum EventStatus {
    Tentative,
    Confirmed,
    Cancelled,
}

/// The ORGANIZER of an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Organizer {
    /// The `CN` parameter
    pub common_name: Option<String>,
    /// Calendar user address, usually a `mailto:` URI
    pub address: String,
}

/// Error when a VEVENT cannot become an [`EventComponent`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// The component carries no UID
    #[error("VEVENT without UID")]
    MissingUid,

    /// The component is not a VEVENT
    #[error("expected VEVENT, found {name}")]
    NotAnEvent {
        /// Name of the component found
        name: String,
    },
}

impl EventComponent {
    /// An empty component with the given UID.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            recurrence_id: None,
            range: None,
            start: None,
            end: None,
            rrule: None,
            exception_dates: Vec::new(),
            related_to: Vec::new(),
            sequence: 0,
            dtstamp: None,
            summary: None,
            description: None,
            organizer: None,
            categories: Vec::new(),
            status: None,
            extra: Vec::new(),
            problems: Vec::new(),
        }
    }

    /// The UID.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// The RECURRENCE-ID, absent on a master.
    #[must_use]
    pub const fn recurrence_id(&self) -> Option<&DateTimeValue> {
        self.recurrence_id.as_ref()
    }

    /// The RANGE of the RECURRENCE-ID.
    #[must_use]
    pub const fn range(&self) -> Option<RecurrenceRange> {
        self.range
    }

    /// Whether this is the defining component of its series.
    #[must_use]
    pub const fn is_master(&self) -> bool {
        self.recurrence_id.is_none()
    }

    /// The DTSTART.
    #[must_use]
    pub const fn start(&self) -> Option<&DateTimeValue> {
        self.start.as_ref()
    }

    /// The DTEND.
    #[must_use]
    pub const fn end(&self) -> Option<&DateTimeValue> {
        self.end.as_ref()
    }

    /// The RRULE.
    #[must_use]
    pub const fn rrule(&self) -> Option<&RecurrenceRule> {
        self.rrule.as_ref()
    }

    /// The EXDATE values.
    #[must_use]
    pub fn exception_dates(&self) -> &[DateTimeValue] {
        &self.exception_dates
    }

    /// The RELATED-TO UIDs.
    #[must_use]
    pub fn related_to(&self) -> &[String] {
        &self.related_to
    }

    /// The SEQUENCE.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The DTSTAMP.
    #[must_use]
    pub const fn dtstamp(&self) -> Option<&DateTimeValue> {
        self.dtstamp.as_ref()
    }

    /// The SUMMARY.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The DESCRIPTION.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The ORGANIZER.
    #[must_use]
    pub const fn organizer(&self) -> Option<&Organizer> {
        self.organizer.as_ref()
    }

    /// The CATEGORIES.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// The STATUS.
    #[must_use]
    pub const fn status(&self) -> Option<EventStatus> {
        self.status
    }

    /// Properties this model does not interpret.
    #[must_use]
    pub fn extra_properties(&self) -> &[ContentLine] {
        &self.extra
    }

    /// Problems found while reading the component from text.
    #[must_use]
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// Identity comparison: same UID and the same RECURRENCE-ID instant.
    ///
    /// Floating values are resolved in `floating`.
    #[must_use]
    pub fn matches(&self, other: &Self, floating: &TimeZone) -> bool {
        self.uid == other.uid && same_recurrence_id(self.recurrence_id(), other.recurrence_id(), floating)
    }

    /// Replace the UID.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Replace the RECURRENCE-ID.
    #[must_use]
    pub fn with_recurrence_id(mut self, rid: Option<DateTimeValue>) -> Self {
        self.recurrence_id = rid;
        self
    }

    /// Replace the RANGE.
    #[must_use]
    pub fn with_range(mut self, range: Option<RecurrenceRange>) -> Self {
        self.range = range;
        self
    }

    /// Replace the DTSTART.
    #[must_use]
    pub fn with_start(mut self, start: Option<DateTimeValue>) -> Self {
        self.start = start;
        self
    }

    /// Replace the DTEND.
    #[must_use]
    pub fn with_end(mut self, end: Option<DateTimeValue>) -> Self {
        self.end = end;
        self
    }

    /// Replace the RRULE.
    #[must_use]
    pub fn with_rrule(mut self, rrule: Option<RecurrenceRule>) -> Self {
        self.rrule = rrule;
        self
    }

    /// Append an EXDATE value.
    #[must_use]
    pub fn with_exception_date(mut self, date: DateTimeValue) -> Self {
        self.exception_dates.push(date);
        self
    }

    /// Append a RELATED-TO UID unless already present.
    #[must_use]
    pub fn with_related_to(mut self, uid: impl Into<String>) -> Self {
        let uid = uid.into();
        if !self.related_to.contains(&uid) {
            self.related_to.push(uid);
        }
        self
    }

    /// Replace the SEQUENCE.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    /// Replace the DTSTAMP.
    #[must_use]
    pub fn with_dtstamp(mut self, dtstamp: Option<DateTimeValue>) -> Self {
        self.dtstamp = dtstamp;
        self
    }

    /// Replace the SUMMARY.
    #[must_use]
    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }

    /// Replace the DESCRIPTION.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Replace the ORGANIZER.
    #[must_use]
    pub fn with_organizer(mut self, organizer: Option<Organizer>) -> Self {
        self.organizer = organizer;
        self
    }

    /// Replace the CATEGORIES.
    #[must_use]
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Replace the STATUS.
    #[must_use]
    pub fn with_status(mut self, status: Option<EventStatus>) -> Self {
        self.status = status;
        self
    }

    fn apply_property(&mut self, line: &ContentLine) {
        let name = line.name.to_ascii_uppercase();
        match name.as_str() {
            KW_UID => self.uid = line.value.trim().to_owned(),
            KW_RECURRENCE_ID => {
                self.recurrence_id = self.date_time_or_problem(line);
                match line.parameter(KW_RANGE) {
                    Some(range) if range.eq_ignore_ascii_case(KW_RANGE_THISANDFUTURE) => {
                        self.range = Some(RecurrenceRange::ThisAndFuture);
                    }
                    Some(range) => self.problem(line, format!("unsupported RANGE {range}")),
                    None => {}
                }
            }
            KW_DTSTART => self.start = self.date_time_or_problem(line),
            KW_DTEND => self.end = self.date_time_or_problem(line),
            KW_DTSTAMP => self.dtstamp = self.date_time_or_problem(line),
            KW_RRULE => match RecurrenceRule::parse(&line.value) {
                Ok(rule) => {
                    for err in rule.errors() {
                        self.problem(line, err);
                    }
                    self.rrule = Some(rule);
                }
                Err(err) => self.problem(line, err.to_string()),
            },
            KW_EXDATE => {
                for value in line.value.split(',').filter(|v| !v.trim().is_empty()) {
                    match parse_date_time(line, value) {
                        Ok(date) => self.exception_dates.push(date),
                        Err(err) => self.problem(line, err.to_string()),
                    }
                }
            }
            KW_RELATED_TO => self.related_to.push(line.value.trim().to_owned()),
            KW_SEQUENCE => match lexical::parse::<u32, _>(line.value.trim()) {
                Ok(sequence) => self.sequence = sequence,
                Err(err) => self.problem(line, err.to_string()),
            },
            KW_SUMMARY => self.summary = Some(unescape_text(&line.value)),
            KW_DESCRIPTION => self.description = Some(unescape_text(&line.value)),
            KW_ORGANIZER => {
                self.organizer = Some(Organizer {
                    common_name: line.parameter(KW_CN).map(ToOwned::to_owned),
                    address: line.value.trim().to_owned(),
                });
            }
            KW_CATEGORIES => self.categories.extend(split_text_list(&line.value)),
            KW_STATUS => match EventStatus::from_str(line.value.trim()) {
                Ok(status) => self.status = Some(status),
                Err(_) => self.problem(line, format!("unknown status {}", line.value)),
            },
            // source positions mean nothing once the property is detached
            _ => self.extra.push(ContentLine {
                span: Span::default(),
                ..line.clone()
            }),
        }
    }

    fn date_time_or_problem(&mut self, line: &ContentLine) -> Option<DateTimeValue> {
        match parse_date_time(line, &line.value) {
            Ok(value) => Some(value),
            Err(err) => {
                self.problem(line, err.to_string());
                None
            }
        }
    }

    fn problem(&mut self, line: &ContentLine, message: String) {
        tracing::debug!(uid = %self.uid, property = %line.name, %message, "property problem");
        self.problems.push(format!("{}: {message}", line.name));
    }
}

/// Normalized RECURRENCE-ID comparison, both absent or the same instant.
#[must_use]
pub fn same_recurrence_id(
    a: Option<&DateTimeValue>,
    b: Option<&DateTimeValue>,
    floating: &TimeZone,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.same_instant(b, floating),
        _ => false,
    }
}

fn parse_date_time(line: &ContentLine, value: &str) -> Result<DateTimeValue, MalformedDateTime> {
    let value_is_date = line
        .parameter(KW_VALUE)
        .is_some_and(|v| v.eq_ignore_ascii_case(KW_DATE));
    DateTimeValue::parse(value, line.parameter(KW_TZID), value_is_date)
}

impl TryFrom<&RawComponent> for EventComponent {
    type Error = ComponentError;

    fn try_from(raw: &RawComponent) -> Result<Self, Self::Error> {
        if !raw.is(KW_VEVENT) {
            return Err(ComponentError::NotAnEvent {
                name: raw.name.clone(),
            });
        }

        let mut event = Self::new(String::new());
        for line in &raw.properties {
            event.apply_property(line);
        }
        if event.uid.is_empty() {
            return Err(ComponentError::MissingUid);
        }
        Ok(event)
    }
}

impl Display for EventComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = FormatOptions::default()
            .event_to_string(self)
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
