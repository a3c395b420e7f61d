// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) formatter module.
//!
//! Writes events and scheduling messages back to the RFC 5545 text format,
//! to any `std::io::Write` implementer, folding long lines on the way.
//!
//! # Example
//!
//! ```ignore
//! use itipcal_ical::{Method, formatter::format_calendar};
//!
//! let text = format_calendar(Method::Publish, &events)?;
//! println!("{text}");
//! ```

use std::io::{self, Write};

use crate::component::EventComponent;
use crate::itip::Method;
use crate::keyword::{
    KW_BEGIN, KW_CATEGORIES, KW_CN, KW_DATE, KW_DESCRIPTION, KW_DTEND, KW_DTSTAMP, KW_DTSTART,
    KW_END, KW_EXDATE, KW_METHOD, KW_ORGANIZER, KW_PRODID, KW_RANGE, KW_RANGE_THISANDFUTURE,
    KW_RECURRENCE_ID, KW_RELATED_TO, KW_RRULE, KW_SEQUENCE, KW_STATUS, KW_SUMMARY, KW_TZID, KW_UID,
    KW_VALUE, KW_VCALENDAR, KW_VERSION, KW_VEVENT,
};
use crate::syntax::ContentLine;
use crate::value::{DateTimeValue, escape_text};

const PRODUCT_ID: &str = "-//itipcal//itipcal//EN";

/// Format a scheduling message, one VCALENDAR block, to a `String` with
/// default options.
///
/// # Errors
///
/// Returns an error if writing to the internal buffer fails or if the output
/// contains invalid UTF-8 data.
pub fn format_calendar(method: Method, events: &[EventComponent]) -> io::Result<String> {
    FormatOptions::default().calendar_to_string(method, events)
}

/// Formatting options for the iCalendar formatter.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Maximum line length in octets before folding.
    /// - `None`: no line folding
    /// - `Some(n)`: fold lines longer than n octets
    ///
    /// Default: `Some(75)` for RFC 5545 compliance.
    pub folding: Option<usize>,

    /// Line folding style.
    ///
    /// Default: `FoldingStyle::Space` (CRLF + SPACE).
    pub folding_style: FoldingStyle,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            folding: Some(75),
            folding_style: FoldingStyle::default(),
        }
    }
}

impl FormatOptions {
    /// Set the line folding option.
    #[must_use]
    pub fn folding(mut self, folding: Option<usize>) -> Self {
        self.folding = folding;
        self
    }

    /// Set the line folding style.
    #[must_use]
    pub const fn folding_style(mut self, style: FoldingStyle) -> Self {
        self.folding_style = style;
        self
    }

    /// Write a VCALENDAR block carrying `method` and `events`.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write_calendar(
        &self,
        method: Method,
        events: &[EventComponent],
        w: &mut impl Write,
    ) -> io::Result<()> {
        let mut formatter = Formatter::new(w, *self);
        with_block(&mut formatter, KW_VCALENDAR, |f| {
            write_property(f, KW_METHOD, &[], &method.to_string())?;
            write_property(f, KW_PRODID, &[], PRODUCT_ID)?;
            write_property(f, KW_VERSION, &[], "2.0")?;
            events.iter().try_for_each(|event| write_event(f, event))
        })
    }

    /// Write a VCALENDAR block to a `String`.
    ///
    /// # Errors
    /// Returns an error if writing fails or if the output contains invalid UTF-8 data.
    pub fn calendar_to_string(&self, method: Method, events: &[EventComponent]) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_calendar(method, events, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write a lone VEVENT to a `String`.
    ///
    /// # Errors
    /// Returns an error if writing fails or if the output contains invalid UTF-8 data.
    pub fn event_to_string(&self, event: &EventComponent) -> io::Result<String> {
        let mut buffer = Vec::new();
        write_event(&mut Formatter::new(&mut buffer, *self), event)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Line folding style for RFC 5545 formatting.
///
/// RFC 5545 specifies that folded lines should start with CRLF followed by
/// a whitespace character (SPACE or TAB).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FoldingStyle {
    /// CRLF + SPACE (RFC 5545 default)
    #[default]
    Space,
    /// CRLF + TAB
    Tab,
}

impl FoldingStyle {
    const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Space => b"\r\n ",
            Self::Tab => b"\r\n\t",
        }
    }

    /// Length of the continuation character after CRLF, SPACE and TAB alike.
    const fn continuation_len() -> usize {
        1
    }
}

/// iCalendar formatter that writes to any `Write` implementer.
///
/// Tracks the length of the current line and inserts a fold before it would
/// exceed the configured limit. Folds never split a UTF-8 sequence.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    writer: W,
    options: FormatOptions,
    /// Current line length in bytes (excluding the pending CRLF).
    line_length: usize,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter with options.
    #[must_use]
    pub fn new(writer: W, options: FormatOptions) -> Self {
        Self {
            writer,
            options,
            line_length: 0,
        }
    }

    /// End the current content line.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn writeln(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\r\n")?;
        self.line_length = 0;
        Ok(())
    }

    fn insert_fold(&mut self) -> io::Result<()> {
        self.writer.write_all(self.options.folding_style.as_bytes())?;
        self.line_length = FoldingStyle::continuation_len();
        Ok(())
    }
}

impl<W: Write> Write for Formatter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(max_len) = self.options.folding else {
            self.writer.write_all(buf)?;
            self.line_length += buf.len();
            return Ok(buf.len());
        };

        let mut remaining = buf;
        while !remaining.is_empty() {
            let available = max_len.saturating_sub(self.line_length);
            let mut len = safe_split_len(remaining, available);
            if len == 0 {
                if self.line_length > FoldingStyle::continuation_len() {
                    self.insert_fold()?;
                    continue;
                }
                // limit is narrower than one character, emit it whole
                let first = remaining.first().copied().map_or(1, char_len);
                len = safe_split_len(remaining, first);
            }
            let (head, tail) = remaining.split_at(len);
            self.writer.write_all(head)?;
            self.line_length += len;
            remaining = tail;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Longest prefix of `buf` within `max` bytes that ends on a char boundary.
fn safe_split_len(buf: &[u8], max: usize) -> usize {
    if buf.len() <= max {
        return buf.len();
    }
    let mut pos = max;
    while pos > 0 && buf.get(pos).is_some_and(|b| b & 0xC0 == 0x80) {
        pos -= 1;
    }
    pos
}

const fn char_len(first: u8) -> usize {
    match first {
        0xF0.. => 4,
        0xE0.. => 3,
        0xC0.. => 2,
        _ => 1,
    }
}

/// Write a `BEGIN:name` ... `END:name` block.
fn with_block<W: Write>(
    f: &mut Formatter<W>,
    name: &str,
    body: impl FnOnce(&mut Formatter<W>) -> io::Result<()>,
) -> io::Result<()> {
    write!(f, "{KW_BEGIN}:{name}")?;
    f.writeln()?;
    body(f)?;
    write!(f, "{KW_END}:{name}")?;
    f.writeln()
}

/// Write one content line. Parameter values are quoted when they contain a
/// character that would end the parameter.
fn write_property<W: Write>(
    f: &mut Formatter<W>,
    name: &str,
    params: &[(&str, &str)],
    value: &str,
) -> io::Result<()> {
    write!(f, "{name}")?;
    for (key, param) in params {
        write_parameter(f, key, &[param], false)?;
    }
    write!(f, ":{value}")?;
    f.writeln()
}

fn write_parameter<W: Write>(
    f: &mut Formatter<W>,
    key: &str,
    values: &[&str],
    force_quote: bool,
) -> io::Result<()> {
    write!(f, ";{key}=")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        if force_quote || value.contains([':', ';', ',']) {
            write!(f, "\"{value}\"")?;
        } else {
            write!(f, "{value}")?;
        }
    }
    Ok(())
}

fn write_date_time<W: Write>(
    f: &mut Formatter<W>,
    name: &str,
    extra: &[(&str, &str)],
    value: &DateTimeValue,
) -> io::Result<()> {
    let mut params = extra.to_vec();
    match value {
        DateTimeValue::Date(_) => params.push((KW_VALUE, KW_DATE)),
        DateTimeValue::Zoned { tzid, .. } => params.push((KW_TZID, tzid)),
        DateTimeValue::Floating(_) | DateTimeValue::Utc(_) => {}
    }
    write_property(f, name, &params, &value.to_string())
}

/// Write verbatim a property the event model does not interpret.
fn write_content_line<W: Write>(f: &mut Formatter<W>, line: &ContentLine) -> io::Result<()> {
    write!(f, "{}", line.name)?;
    for param in &line.parameters {
        let values: Vec<&str> = param.values.iter().map(|v| v.value.as_str()).collect();
        let quoted = param.values.iter().any(|v| v.quoted);
        write_parameter(f, &param.name, &values, quoted)?;
    }
    write!(f, ":{}", line.value)?;
    f.writeln()
}

pub(crate) fn write_event<W: Write>(f: &mut Formatter<W>, event: &EventComponent) -> io::Result<()> {
    with_block(f, KW_VEVENT, |f| {
        write_property(f, KW_UID, &[], event.uid())?;
        if let Some(rid) = event.recurrence_id() {
            let range: &[(&str, &str)] = match event.range() {
                Some(_) => &[(KW_RANGE, KW_RANGE_THISANDFUTURE)],
                None => &[],
            };
            write_date_time(f, KW_RECURRENCE_ID, range, rid)?;
        }
        if let Some(dtstamp) = event.dtstamp() {
            write_date_time(f, KW_DTSTAMP, &[], dtstamp)?;
        }
        if let Some(start) = event.start() {
            write_date_time(f, KW_DTSTART, &[], start)?;
        }
        if let Some(end) = event.end() {
            write_date_time(f, KW_DTEND, &[], end)?;
        }
        if let Some(rrule) = event.rrule() {
            write_property(f, KW_RRULE, &[], &rrule.to_string())?;
        }
        for date in event.exception_dates() {
            write_date_time(f, KW_EXDATE, &[], date)?;
        }
        for uid in event.related_to() {
            write_property(f, KW_RELATED_TO, &[], uid)?;
        }
        if event.sequence() > 0 {
            write_property(f, KW_SEQUENCE, &[], &event.sequence().to_string())?;
        }
        if let Some(summary) = event.summary() {
            write_property(f, KW_SUMMARY, &[], &escape_text(summary))?;
        }
        if let Some(description) = event.description() {
            write_property(f, KW_DESCRIPTION, &[], &escape_text(description))?;
        }
        if let Some(organizer) = event.organizer() {
            match &organizer.common_name {
                Some(cn) => write_property(f, KW_ORGANIZER, &[(KW_CN, cn)], &organizer.address)?,
                None => write_property(f, KW_ORGANIZER, &[], &organizer.address)?,
            }
        }
        if !event.categories().is_empty() {
            let categories: Vec<String> = event.categories().iter().map(|c| escape_text(c)).collect();
            write_property(f, KW_CATEGORIES, &[], &categories.join(","))?;
        }
        if let Some(status) = event.status() {
            write_property(f, KW_STATUS, &[], &status.to_string())?;
        }
        event
            .extra_properties()
            .iter()
            .try_for_each(|line| write_content_line(f, line))
    })
}
