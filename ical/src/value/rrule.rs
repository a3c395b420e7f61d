// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule as defined in RFC 5545 Section 3.3.10.
//!
//! Parsing only fails on text that does not follow the grammar. Structural
//! problems (missing FREQ, UNTIL together with COUNT, empty by-lists,
//! repeated parts) are collected and reported by [`RecurrenceRule::errors`],
//! leaving the decision to reject a rule to the caller.

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::extra::ParserExtra;
use chumsky::input::{Stream, ValueInput};
use chumsky::label::LabelError;
use chumsky::prelude::*;

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::datetime::{DateTimeValue, Parsed, value_date_or_date_time};
use crate::value::miscellaneous::{
    ValueExpected, i8_0_1, i8_0_3, i8_0_9, i8_1_2, i8_1_4, i8_1_9, i16_0_5, i16_0_6, i16_0_9,
    i16_1_2, i16_1_9, is_positive, u8_0_1, u8_0_2, u8_0_3, u8_0_5, u8_0_9, u8_1_9, u32_non_zero,
};

/// Recurrence rule
#[derive(Debug, Clone, Default)]
pub struct RecurrenceRule {
    freq: Option<Frequency>,
    until: Option<DateTimeValue>,
    count: Option<u32>,
    interval: Option<u32>,
    by_rules: Vec<ByRule>,
    week_start: Option<WeekDay>,
    /// Names of parts seen more than once while parsing
    duplicates: Vec<String>,
}

/// Equality is structural over the rule parts. INTERVAL and WKST compare by
/// their effective values, so an explicit default equals an omitted one.
impl PartialEq for RecurrenceRule {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq
            && self.until == other.until
            && self.count == other.count
            && self.interval() == other.interval()
            && self.by_rules == other.by_rules
            && self.week_start() == other.week_start()
    }
}

impl Eq for RecurrenceRule {}

/// Error when RRULE text does not follow the recurrence grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed RRULE `{input}`: {}", reasons.join("; "))]
pub struct MalformedRule {
    /// The offending text
    pub input: String,
    /// Parser diagnostics
    pub reasons: Vec<String>,
}

impl RecurrenceRule {
    /// A rule with only a frequency.
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq: Some(freq),
            ..Self::default()
        }
    }

    /// Parse the `FREQ=...;...` wire form, with or without a `RRULE:` prefix.
    ///
    /// ## Errors
    /// If the text does not follow the recurrence grammar.
    pub fn parse(text: &str) -> Result<Self, MalformedRule> {
        let body = text.trim();
        let body = body.strip_prefix("RRULE:").unwrap_or(body);
        let stream = Stream::from_iter(body.chars());
        let parts = value_rrule::<'_, _, extra::Err<Rich<'_, char>>>()
            .parse(stream)
            .into_result()
            .map_err(|errs| MalformedRule {
                input: text.to_owned(),
                reasons: errs.into_iter().map(|e| e.to_string()).collect(),
            })?;
        Ok(Self::from_parts(parts))
    }

    fn from_parts(parts: Vec<Part>) -> Self {
        let mut rule = Self::default();
        for part in parts {
            let name = part.name();
            let duplicate = match part {
                Part::Freq(v) => keep_first(&mut rule.freq, v),
                Part::Until(v) => keep_first(&mut rule.until, v),
                Part::Count(v) => keep_first(&mut rule.count, v),
                Part::Interval(v) => keep_first(&mut rule.interval, v),
                Part::Wkst(v) => keep_first(&mut rule.week_start, v),
                Part::By(v) => {
                    if rule.by_rule(v.kind()).is_some() {
                        true
                    } else {
                        rule.by_rules.push(v);
                        false
                    }
                }
            };
            if duplicate {
                rule.duplicates.push(name);
            }
        }
        rule
    }

    /// The recurrence frequency, absent only for an invalid rule.
    #[must_use]
    pub const fn frequency(&self) -> Option<Frequency> {
        self.freq
    }

    /// The UNTIL bound.
    #[must_use]
    pub const fn until(&self) -> Option<&DateTimeValue> {
        self.until.as_ref()
    }

    /// The COUNT bound.
    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    /// The INTERVAL, 1 unless given.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    /// By-unit filters in the order they were added.
    #[must_use]
    pub fn by_rules(&self) -> &[ByRule] {
        &self.by_rules
    }

    /// The by-unit filter of the given kind.
    #[must_use]
    pub fn by_rule(&self, kind: ByRuleKind) -> Option<&ByRule> {
        self.by_rules.iter().find(|r| r.kind() == kind)
    }

    /// The WKST, Monday unless given.
    #[must_use]
    pub fn week_start(&self) -> WeekDay {
        self.week_start.unwrap_or(WeekDay::Monday)
    }

    /// Whether two rules describe the same pattern, ignoring their bounds.
    #[must_use]
    pub fn same_pattern(&self, other: &Self) -> bool {
        self.freq == other.freq
            && self.interval() == other.interval()
            && self.by_rules == other.by_rules
            && self.week_start() == other.week_start()
    }

    /// Problems that make the rule invalid, in a stable order.
    ///
    /// Never fails; an empty list means the rule is valid.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.freq.is_none() {
            errors.push(format!(
                "RRULE:{KW_RRULE_FREQ} is not present.  FREQ is REQUIRED and MUST NOT occur more than once"
            ));
        }
        for rule in &self.by_rules {
            if rule.is_empty() {
                errors.push(format!(
                    "{}: value is null.  The RRULE part MUST have a value.",
                    rule.kind()
                ));
            }
        }
        if self.until.is_some() && self.count.is_some() {
            errors.push(format!(
                "RRULE:{KW_RRULE_UNTIL} and {KW_RRULE_COUNT} MUST NOT occur in the same RRULE"
            ));
        }
        if self.count == Some(0) {
            errors.push(format!("{KW_RRULE_COUNT}: value MUST be a positive integer"));
        }
        if self.interval == Some(0) {
            errors.push(format!("{KW_RRULE_INTERVAL}: value MUST be a positive integer"));
        }
        for name in &self.duplicates {
            errors.push(format!(
                "RRULE:{name} occurs more than once.  The RRULE part MUST NOT occur more than once"
            ));
        }
        errors
    }

    /// Shorthand for an empty [`errors`](Self::errors) list.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// Set the frequency.
    #[must_use]
    pub fn with_frequency(mut self, freq: Frequency) -> Self {
        self.freq = Some(freq);
        self
    }

    /// Set the UNTIL bound. COUNT is left as is.
    #[must_use]
    pub fn with_until(mut self, until: DateTimeValue) -> Self {
        self.until = Some(until);
        self
    }

    /// Set the COUNT bound. UNTIL is left as is.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the INTERVAL.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Add a by-unit filter, replacing one of the same kind in place.
    #[must_use]
    pub fn with_by_rule(mut self, rule: ByRule) -> Self {
        match self.by_rules.iter_mut().find(|r| r.kind() == rule.kind()) {
            Some(existing) => *existing = rule,
            None => self.by_rules.push(rule),
        }
        self
    }

    /// Set the WKST.
    #[must_use]
    pub fn with_week_start(mut self, day: WeekDay) -> Self {
        self.week_start = Some(day);
        self
    }

    /// Drop the UNTIL bound.
    #[must_use]
    pub fn without_until(mut self) -> Self {
        self.until = None;
        self
    }

    /// Drop the COUNT bound.
    #[must_use]
    pub fn without_count(mut self) -> Self {
        self.count = None;
        self
    }
}

impl FromStr for RecurrenceRule {
    type Err = MalformedRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.by_rules.len() + 4);
        if let Some(freq) = self.freq {
            parts.push(format!("{KW_RRULE_FREQ}={freq}"));
        }
        if let Some(until) = &self.until {
            parts.push(format!("{KW_RRULE_UNTIL}={until}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("{KW_RRULE_COUNT}={count}"));
        }
        if let Some(interval) = self.interval {
            parts.push(format!("{KW_RRULE_INTERVAL}={interval}"));
        }
        parts.extend(self.by_rules.iter().map(ToString::to_string));
        if let Some(wkst) = self.week_start {
            parts.push(format!("{KW_RRULE_WKST}={wkst}"));
        }
        write!(f, "{}", parts.join(";"))
    }
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            Frequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            Frequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            Frequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            Frequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            Frequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            Frequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, negative counts from the end
    pub occurrence: Option<i8>,
}

impl WeekDayNum {
    /// Every such weekday of the period.
    #[must_use]
    pub const fn every(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }

    /// The `n`th such weekday of the period.
    #[must_use]
    pub const fn nth(n: i8, day: WeekDay) -> Self {
        Self {
            day,
            occurrence: Some(n),
        }
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            Some(n) => write!(f, "{n}{}", self.day),
            None => write!(f, "{}", self.day),
        }
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

impl From<WeekDay> for jiff::civil::Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Sunday => Self::Sunday,
            WeekDay::Monday => Self::Monday,
            WeekDay::Tuesday => Self::Tuesday,
            WeekDay::Wednesday => Self::Wednesday,
            WeekDay::Thursday => Self::Thursday,
            WeekDay::Friday => Self::Friday,
            WeekDay::Saturday => Self::Saturday,
        }
    }
}

/// Kind of a by-unit filter; displays as its rule-part name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum ByRuleKind {
    BySecond,
    ByMinute,
    ByHour,
    ByDay,
    ByMonthDay,
    ByYearDay,
    ByWeekNo,
    ByMonth,
    BySetPos,
}

/// A by-unit filter with its value list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ByRule {
    /// Seconds, 0 to 60
    BySecond(Vec<u8>),
    /// Minutes, 0 to 59
    ByMinute(Vec<u8>),
    /// Hours, 0 to 23
    ByHour(Vec<u8>),
    /// Weekdays with optional ordinals
    ByDay(Vec<WeekDayNum>),
    /// Days of month, -31 to -1 and 1 to 31
    ByMonthDay(Vec<i8>),
    /// Days of year, -366 to -1 and 1 to 366
    ByYearDay(Vec<i16>),
    /// ISO-style week numbers, -53 to -1 and 1 to 53
    ByWeekNo(Vec<i8>),
    /// Months, 1 to 12
    ByMonth(Vec<u8>),
    /// Positions within the expanded set
    BySetPos(Vec<i16>),
}

impl ByRule {
    /// The rule-part kind.
    #[must_use]
    pub const fn kind(&self) -> ByRuleKind {
        match self {
            Self::BySecond(_) => ByRuleKind::BySecond,
            Self::ByMinute(_) => ByRuleKind::ByMinute,
            Self::ByHour(_) => ByRuleKind::ByHour,
            Self::ByDay(_) => ByRuleKind::ByDay,
            Self::ByMonthDay(_) => ByRuleKind::ByMonthDay,
            Self::ByYearDay(_) => ByRuleKind::ByYearDay,
            Self::ByWeekNo(_) => ByRuleKind::ByWeekNo,
            Self::ByMonth(_) => ByRuleKind::ByMonth,
            Self::BySetPos(_) => ByRuleKind::BySetPos,
        }
    }

    /// Whether the value list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        match self {
            Self::BySecond(v) | Self::ByMinute(v) | Self::ByHour(v) | Self::ByMonth(v) => {
                v.is_empty()
            }
            Self::ByMonthDay(v) | Self::ByWeekNo(v) => v.is_empty(),
            Self::ByYearDay(v) | Self::BySetPos(v) => v.is_empty(),
            Self::ByDay(v) => v.is_empty(),
        }
    }
}

impl Display for ByRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: Display>(values: &[T]) -> String {
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        }

        let values = match self {
            Self::BySecond(v) | Self::ByMinute(v) | Self::ByHour(v) | Self::ByMonth(v) => join(v),
            Self::ByMonthDay(v) | Self::ByWeekNo(v) => join(v),
            Self::ByYearDay(v) | Self::BySetPos(v) => join(v),
            Self::ByDay(v) => join(v),
        };
        write!(f, "{}={values}", self.kind())
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// recur           = recur-rule-part *( ";" recur-rule-part )
///                 ;
///                 ; The rule parts are not ordered in any
///                 ; particular sequence.
///                 ;
///                 ; The FREQ rule part is REQUIRED,
///                 ; but MUST NOT occur more than once.
///                 ;
///                 ; The UNTIL or COUNT rule parts are OPTIONAL,
///                 ; but they MUST NOT occur in the same 'recur'.
///                 ;
///                 ; The other rule parts are OPTIONAL,
///                 ; but MUST NOT occur more than once.
/// ```
fn value_rrule<'src, I, E>() -> impl Parser<'src, I, Vec<Part>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    recur_rrule_part()
        .separated_by(just(';'))
        .allow_trailing()
        .at_least(1)
        .collect()
}

#[derive(Debug, Clone)]
enum Part {
    Freq(Frequency),
    Until(DateTimeValue),
    Count(u32),
    Interval(u32),
    By(ByRule),
    Wkst(WeekDay),
}

impl Part {
    fn name(&self) -> String {
        match self {
            Part::Freq(_) => KW_RRULE_FREQ.to_owned(),
            Part::Until(_) => KW_RRULE_UNTIL.to_owned(),
            Part::Count(_) => KW_RRULE_COUNT.to_owned(),
            Part::Interval(_) => KW_RRULE_INTERVAL.to_owned(),
            Part::By(rule) => rule.kind().to_string(),
            Part::Wkst(_) => KW_RRULE_WKST.to_owned(),
        }
    }
}

/// Store `value` unless a value is already there; returns whether it was a
/// duplicate.
fn keep_first<T>(slot: &mut Option<T>, value: T) -> bool {
    if slot.is_some() {
        return true;
    }
    *slot = Some(value);
    false
}

/// ```txt
/// recur-rule-part = ( "FREQ" "=" freq )
///                 / ( "UNTIL" "=" enddate )
///                 / ( "COUNT" "=" 1*DIGIT )
///                 / ( "INTERVAL" "=" 1*DIGIT )
///                 / ( "BYSECOND" "=" byseclist )
///                 / ( "BYMINUTE" "=" byminlist )
///                 / ( "BYHOUR" "=" byhrlist )
///                 / ( "BYDAY" "=" bywdaylist )
///                 / ( "BYMONTHDAY" "=" bymodaylist )
///                 / ( "BYYEARDAY" "=" byyrdaylist )
///                 / ( "BYWEEKNO" "=" bywknolist )
///                 / ( "BYMONTH" "=" bymolist )
///                 / ( "BYSETPOS" "=" bysplist )
///                 / ( "WKST" "=" weekday )
/// ```
fn recur_rrule_part<'src, I, E>() -> impl Parser<'src, I, Part, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let kw = |kw| just(kw).ignore_then(just('='));

    let freq = kw(KW_RRULE_FREQ).ignore_then(freq()).map(Part::Freq);

    // UNTIL can be a date or date-time
    let until = kw(KW_RRULE_UNTIL).ignore_then(enddate()).map(Part::Until);

    let count = kw(KW_RRULE_COUNT)
        .ignore_then(u32_non_zero())
        .map(Part::Count);

    let interval = kw(KW_RRULE_INTERVAL)
        .ignore_then(u32_non_zero())
        .map(Part::Interval);

    // by-lists may be empty here, `RecurrenceRule::errors` reports them
    let by_second = kw(KW_RRULE_BYSECOND)
        .ignore_then(byseclist())
        .map(ByRule::BySecond);

    let by_minute = kw(KW_RRULE_BYMINUTE)
        .ignore_then(byminlist())
        .map(ByRule::ByMinute);

    let by_hour = kw(KW_RRULE_BYHOUR)
        .ignore_then(byhrlist())
        .map(ByRule::ByHour);

    let by_day = kw(KW_RRULE_BYDAY)
        .ignore_then(bywdaylist())
        .map(ByRule::ByDay);

    let by_month_day = kw(KW_RRULE_BYMONTHDAY)
        .ignore_then(bymodaylist())
        .map(ByRule::ByMonthDay);

    let by_year_day = kw(KW_RRULE_BYYEARDAY)
        .ignore_then(byyrdaylist())
        .map(ByRule::ByYearDay);

    let by_week_no = kw(KW_RRULE_BYWEEKNO)
        .ignore_then(bywknolist())
        .map(ByRule::ByWeekNo);

    let by_month = kw(KW_RRULE_BYMONTH)
        .ignore_then(bymolist())
        .map(ByRule::ByMonth);

    let by_set_pos = kw(KW_RRULE_BYSETPOS)
        .ignore_then(bysplist())
        .map(ByRule::BySetPos);

    let wkst = kw(KW_RRULE_WKST).ignore_then(weekday()).map(Part::Wkst);

    let by = choice((
        by_second,
        by_minute,
        by_hour,
        by_day,
        by_month_day,
        by_year_day,
        by_week_no,
        by_month,
        by_set_pos,
    ))
    .map(Part::By);

    choice((freq, until, count, interval, by, wkst))
}

/// ```txt
/// freq        = "SECONDLY" / "MINUTELY" / "HOURLY" / "DAILY"
///             / "WEEKLY" / "MONTHLY" / "YEARLY"
/// ```
fn freq<'src, I, E>() -> impl Parser<'src, I, Frequency, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_RRULE_FREQ_SECONDLY).to(Frequency::Secondly),
        just(KW_RRULE_FREQ_MINUTELY).to(Frequency::Minutely),
        just(KW_RRULE_FREQ_HOURLY).to(Frequency::Hourly),
        just(KW_RRULE_FREQ_DAILY).to(Frequency::Daily),
        just(KW_RRULE_FREQ_WEEKLY).to(Frequency::Weekly),
        just(KW_RRULE_FREQ_MONTHLY).to(Frequency::Monthly),
        just(KW_RRULE_FREQ_YEARLY).to(Frequency::Yearly),
    ))
}

/// ```txt
/// enddate     = date / date-time
/// ```
fn enddate<'src, I, E>() -> impl Parser<'src, I, DateTimeValue, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    value_date_or_date_time().map(|parsed| match parsed {
        Parsed::Date(date) => DateTimeValue::Date(date),
        Parsed::DateTime(local, true) => DateTimeValue::Utc(local),
        Parsed::DateTime(local, false) => DateTimeValue::Floating(local),
    })
}

/// ```txt
/// byseclist   = ( seconds *("," seconds) )
/// ```
fn byseclist<'src, I, E>() -> impl Parser<'src, I, Vec<u8>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    seconds().separated_by(just(',')).collect()
}

/// ```txt
/// seconds     = 1*2DIGIT       ;0 to 60
/// ```
fn seconds<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        just("60").to(60),                                // 60
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// byminlist   = ( minutes *("," minutes) )
/// ```
fn byminlist<'src, I, E>() -> impl Parser<'src, I, Vec<u8>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    minutes().separated_by(just(',')).collect()
}

/// ```txt
/// minutes     = 1*2DIGIT       ;0 to 59
/// ```
fn minutes<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_5().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-59
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// byhrlist    = ( hour *("," hour) )
/// ```
fn byhrlist<'src, I, E>() -> impl Parser<'src, I, Vec<u8>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    hour().separated_by(just(',')).collect()
}

/// ```txt
/// hour        = 1*2DIGIT       ;0 to 23
/// ```
fn hour<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        u8_0_1().then(u8_0_9()).map(|(a, b)| a * 10 + b), // 00-19
        just('2').ignore_then(u8_0_3()).map(|b| 20 + b),  // 20-23
        u8_0_9(),                                         // 0-9
    ))
}

/// ```txt
/// bywdaylist  = ( weekdaynum *("," weekdaynum) )
/// ```
fn bywdaylist<'src, I, E>() -> impl Parser<'src, I, Vec<WeekDayNum>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    weekdaynum().separated_by(just(',')).collect()
}

/// ```txt
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// plus        = "+"
/// minus       = "-"
/// ```
fn weekdaynum<'src, I, E>() -> impl Parser<'src, I, WeekDayNum, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordwk())
        .map(|(positive, n)| if positive { n } else { -n })
        .or_not()
        .then(weekday())
        .map(|(occurrence, day)| WeekDayNum { day, occurrence })
}

/// ```txt
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn ordwk<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_4().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-49
        just('5').ignore_then(i8_0_3()).map(|a| 50 + a),  // 50-53
        just('0').ignore_then(i8_1_9()),                  // 01-09
        i8_1_9(),                                         // 1-9
    ))
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src, I, E>() -> impl Parser<'src, I, WeekDay, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just(KW_DAY_SU).to(WeekDay::Sunday),
        just(KW_DAY_MO).to(WeekDay::Monday),
        just(KW_DAY_TU).to(WeekDay::Tuesday),
        just(KW_DAY_WE).to(WeekDay::Wednesday),
        just(KW_DAY_TH).to(WeekDay::Thursday),
        just(KW_DAY_FR).to(WeekDay::Friday),
        just(KW_DAY_SA).to(WeekDay::Saturday),
    ))
}

/// ```txt
/// bymodaylist = ( monthdaynum *("," monthdaynum) )
/// ```
fn bymodaylist<'src, I, E>() -> impl Parser<'src, I, Vec<i8>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    monthdaynum().separated_by(just(',')).collect()
}

/// ```txt
/// monthdaynum = [plus / minus] ordmoday
/// ```
fn monthdaynum<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordmoday())
        .map(|(positive, n)| if positive { n } else { -n })
}

/// ```txt
/// ordmoday    = 1*2DIGIT       ;1 to 31
/// ```
fn ordmoday<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        i8_1_2().then(i8_0_9()).map(|(a, b)| a * 10 + b), // 10-29
        just('3').ignore_then(i8_0_1()).map(|a| 30 + a),  // 30-31
        just('0').or_not().ignore_then(i8_1_9()),         // 1-9 / 01-09
    ))
}

/// ```txt
/// byyrdaylist = ( yeardaynum *("," yeardaynum) )
/// ```
fn byyrdaylist<'src, I, E>() -> impl Parser<'src, I, Vec<i16>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    yeardaynum().separated_by(just(',')).collect()
}

/// ```txt
/// yeardaynum  = [plus / minus] ordyrday
/// ```
fn yeardaynum<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordyrday())
        .map(|(positive, n)| if positive { n } else { -n })
}

/// ```txt
/// ordyrday    = 1*3DIGIT      ;1 to 366
/// ```
fn ordyrday<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let i16_1_99 = i16_1_9().then(i16_0_9().or_not()).map(|(a, b)| match b {
        Some(b) => a * 10 + b, // 10-99
        None => a,             // 1-9
    });

    choice((
        just('3').ignore_then(choice((
            just('6').ignore_then(i16_0_6()).map(|a| 360 + a), // 360- 366
            i16_0_5().then(i16_0_9()).map(|(a, b)| 300 + a * 10 + b), // 300-359
        ))),
        i16_1_2()
            .then(i16_0_9())
            .then(i16_0_9())
            .map(|((a, b), c)| a * 100 + b * 10 + c), // 100-299
        just('0').or_not().ignore_then(choice((
            just('0').ignore_then(i16_0_9()), // 01-09 / 001-009
            i16_1_99,                         // 1-9 / 10-99 / 01-09 / 010-099
        ))),
    ))
}

/// ```txt
/// bywknolist  = ( weeknum *("," weeknum) )
/// ```
fn bywknolist<'src, I, E>() -> impl Parser<'src, I, Vec<i8>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    weeknum().separated_by(just(',')).collect()
}

/// ```txt
/// weeknum     = [plus / minus] ordwk
/// ```
fn weeknum<'src, I, E>() -> impl Parser<'src, I, i8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    is_positive()
        .then(ordwk())
        .map(|(positive, n)| if positive { n } else { -n })
}

/// ```txt
/// bymolist    = ( monthnum *("," monthnum) )
/// ```
fn bymolist<'src, I, E>() -> impl Parser<'src, I, Vec<u8>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    monthnum().separated_by(just(',')).collect()
}

/// ```txt
/// monthnum    = 1*2DIGIT       ;1 to 12
/// ```
fn monthnum<'src, I, E>() -> impl Parser<'src, I, u8, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    choice((
        just('0').ignore_then(u8_1_9()),                 // 01-09
        just('1').ignore_then(u8_0_2()).map(|a| 10 + a), // 10-12
        u8_1_9(),                                        // 1-9
    ))
}

/// ```txt
/// bysplist    = ( setposday *("," setposday) )
/// ```
fn bysplist<'src, I, E>() -> impl Parser<'src, I, Vec<i16>, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    setposday().separated_by(just(',')).collect()
}

/// ```txt
/// setposday   = yeardaynum
/// ```
fn setposday<'src, I, E>() -> impl Parser<'src, I, i16, E>
where
    I: ValueInput<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    yeardaynum()
}
