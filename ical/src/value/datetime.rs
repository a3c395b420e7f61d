// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date and date-time values as defined in RFC 5545 Section 3.3.4 and 3.3.5.

use std::fmt::{self, Display};

use chumsky::extra::ParserExtra;
use chumsky::input::{Stream, ValueInput};
use chumsky::label::LabelError;
use chumsky::prelude::*;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};

use crate::value::miscellaneous::{
    ValueExpected, i8_0_1, i8_0_2, i8_0_9, i8_1_2, i8_1_9, i16_0_9, u8_0_1, u8_0_3, u8_0_5, u8_0_9,
};

/// A DATE or DATE-TIME property value with its time reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateTimeValue {
    /// `VALUE=DATE`, a whole calendar day
    Date(Date),
    /// Local time without zone, `19980118T230000`
    Floating(DateTime),
    /// UTC time, `19980119T070000Z`
    Utc(DateTime),
    /// Local time qualified by a `TZID` parameter
    Zoned {
        /// IANA zone identifier as written
        tzid: String,
        /// Wall-clock time in that zone
        local: DateTime,
    },
}

/// Error when a DATE or DATE-TIME value cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed date-time `{input}`: {}", reasons.join("; "))]
pub struct MalformedDateTime {
    /// The offending text
    pub input: String,
    /// Parser diagnostics
    pub reasons: Vec<String>,
}

impl DateTimeValue {
    /// Parse a property value together with its `TZID` and `VALUE` parameters.
    ///
    /// A date-only text is accepted as a DATE even without `VALUE=DATE`. A
    /// trailing `Z` wins over any `TZID`.
    ///
    /// ## Errors
    /// If the text is not a valid DATE or DATE-TIME, or `VALUE=DATE` is given
    /// for a date-time.
    pub fn parse(
        text: &str,
        tzid: Option<&str>,
        value_is_date: bool,
    ) -> Result<Self, MalformedDateTime> {
        let parsed = parse_date_or_date_time(text.trim())?;
        match (parsed, tzid) {
            (Parsed::Date(date), _) => Ok(Self::Date(date)),
            (Parsed::DateTime(_, _), _) if value_is_date => Err(MalformedDateTime {
                input: text.to_owned(),
                reasons: vec!["VALUE=DATE given for a date-time".to_owned()],
            }),
            (Parsed::DateTime(local, true), _) => Ok(Self::Utc(local)),
            (Parsed::DateTime(local, false), Some(tzid)) => Ok(Self::Zoned {
                tzid: tzid.to_owned(),
                local,
            }),
            (Parsed::DateTime(local, false), None) => Ok(Self::Floating(local)),
        }
    }

    /// Whether this is a whole-day value.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// The wall-clock reading; a date reads as its midnight.
    #[must_use]
    pub fn civil(&self) -> DateTime {
        match self {
            Self::Date(date) => date.to_datetime(Time::midnight()),
            Self::Floating(local) | Self::Utc(local) | Self::Zoned { local, .. } => *local,
        }
    }

    /// The calendar day of the wall-clock reading.
    #[must_use]
    pub fn date(&self) -> Date {
        self.civil().date()
    }

    /// The `TZID` parameter, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Zoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }

    /// Same kind and zone, different wall-clock reading.
    ///
    /// Whole-day values keep only the date part.
    #[must_use]
    pub fn with_civil(&self, civil: DateTime) -> Self {
        match self {
            Self::Date(_) => Self::Date(civil.date()),
            Self::Floating(_) => Self::Floating(civil),
            Self::Utc(_) => Self::Utc(civil),
            Self::Zoned { tzid, .. } => Self::Zoned {
                tzid: tzid.clone(),
                local: civil,
            },
        }
    }

    /// Move the wall-clock reading by `delta`, keeping kind and zone.
    ///
    /// ## Errors
    /// If the result leaves the supported range.
    pub fn shifted(&self, delta: SignedDuration) -> Result<Self, jiff::Error> {
        Ok(self.with_civil(self.civil().checked_add(delta)?))
    }

    /// The zone the wall-clock reading is expressed in.
    ///
    /// Floating and whole-day values use `floating`. An unknown `TZID` logs a
    /// warning and is treated as floating too.
    #[must_use]
    pub fn time_zone(&self, floating: &TimeZone) -> TimeZone {
        match self {
            Self::Utc(_) => TimeZone::UTC,
            Self::Zoned { tzid, .. } => TimeZone::get(tzid).unwrap_or_else(|err| {
                tracing::warn!(tzid = %tzid, %err, "unknown time zone, treating value as floating");
                floating.clone()
            }),
            Self::Date(_) | Self::Floating(_) => floating.clone(),
        }
    }

    /// The instant this value denotes; a date denotes its start of day.
    ///
    /// ## Errors
    /// If the wall-clock reading cannot be placed on the time line.
    pub fn to_timestamp(&self, floating: &TimeZone) -> Result<Timestamp, jiff::Error> {
        self.time_zone(floating).to_timestamp(self.civil())
    }

    /// Wall-clock reading of this value in another zone.
    ///
    /// Whole-day values are not converted.
    #[must_use]
    pub fn civil_in(&self, tz: &TimeZone, floating: &TimeZone) -> DateTime {
        if self.is_date() {
            return self.civil();
        }
        match self.to_timestamp(floating) {
            Ok(ts) => tz.to_datetime(ts),
            Err(_) => self.civil(),
        }
    }

    /// The same instant expressed as UTC; whole-day values are unchanged.
    ///
    /// ## Errors
    /// If the wall-clock reading cannot be placed on the time line.
    pub fn to_utc(&self, floating: &TimeZone) -> Result<Self, jiff::Error> {
        match self {
            Self::Date(_) | Self::Utc(_) => Ok(self.clone()),
            _ => {
                let ts = self.to_timestamp(floating)?;
                Ok(Self::Utc(TimeZone::UTC.to_datetime(ts)))
            }
        }
    }

    /// Normalized comparison used for occurrence identity.
    ///
    /// Dates compare by calendar day, date-times by instant. A date never
    /// equals a date-time.
    #[must_use]
    pub fn same_instant(&self, other: &Self, floating: &TimeZone) -> bool {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Date(_), _) | (_, Self::Date(_)) => false,
            (a, b) => match (a.to_timestamp(floating), b.to_timestamp(floating)) {
                (Ok(a), Ok(b)) => a == b,
                _ => a.civil() == b.civil(),
            },
        }
    }
}

impl Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.strftime("%Y%m%d")),
            Self::Floating(local) | Self::Zoned { local, .. } => {
                write!(f, "{}", local.strftime("%Y%m%dT%H%M%S"))
            }
            Self::Utc(local) => write!(f, "{}", local.strftime("%Y%m%dT%H%M%SZ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parsed {
    Date(Date),
    /// Wall-clock reading and whether it carried the UTC designator
    DateTime(DateTime, bool),
}

pub(crate) fn parse_date_or_date_time(text: &str) -> Result<Parsed, MalformedDateTime> {
    let stream = Stream::from_iter(text.chars());
    value_date_or_date_time::<'_, _, extra::Err<Rich<'_, char>>>()
        .parse(stream)
        .into_result()
        .map_err(|errs| MalformedDateTime {
            input: text.to_owned(),
            reasons: errs.into_iter().map(|e| e.to_string()).collect(),
        })
}

/// ```txt
/// date / date-time
/// ```
pub(crate) fn value_date_or_date_time<'src, I, E>() -> impl Parser<'src, I, Parsed, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_date()
        .then(just('T').ignore_then(value_time()).or_not())
        .map(|(date, time)| match time {
            Some((time, utc)) => Parsed::DateTime(date.to_datetime(time), utc),
            None => Parsed::Date(date),
        })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date               = date-value
///
/// date-value         = date-fullyear date-month date-mday
/// date-fullyear      = 4DIGIT
/// date-month         = 2DIGIT        ;01-12
/// date-mday          = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
///                                    ;based on month/year
/// ```
fn value_date<'src, I, E>() -> impl Parser<'src, I, Date, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            Date::new(year, month, day)
                .map_err(|_| E::Error::expected_found([ValueExpected::Date], None, span))
        })
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// time         = time-hour time-minute time-second [time-utc]
///
/// time-hour    = 2DIGIT        ;00-23
/// time-minute  = 2DIGIT        ;00-59
/// time-second  = 2DIGIT        ;00-60
/// ;The "60" value is used to account for positive "leap" seconds.
///
/// time-utc     = "Z"
/// ```
fn value_time<'src, I, E>() -> impl Parser<'src, I, (Time, bool), E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    time_hour()
        .then(time_minute())
        .then(time_second())
        .then(just('Z').or_not())
        .map(|(((hour, minute), second), utc)| {
            // NOTE: We contract leap second 60 to 59 for simplicity
            #[expect(clippy::cast_possible_wrap)]
            let time = jiff::civil::time(hour as i8, minute as i8, second.min(59) as i8, 0);
            (time, utc.is_some())
        })
}

fn time_hour<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),
    ))
}

fn time_minute<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    u8_0_5().then(u8_0_9()).map(|(a, b)| 10 * a + b)
}

fn time_second<'src, I, E>() -> impl Parser<'src, I, u8, E> + Copy
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| 10 * a + b),
        just('6').ignore_then(just('0').ignored().to(60)), // leap second
    ))
}
