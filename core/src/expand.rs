// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Occurrence expansion of recurring masters.
//!
//! Expansion runs in the series' own wall clock: DTSTART is stepped by
//! FREQ x INTERVAL, each period is expanded and limited by the BY* parts,
//! and the result is bounded by COUNT, UNTIL and the caller's window.
//! Exception dates are not applied, so the result is the set of instants a
//! RECURRENCE-ID may legitimately name.

use itipcal_ical::{ByRule, DateTimeValue, EventComponent, Frequency, RecurrenceRule};
use jiff::civil::{Date, DateTime, Time, Weekday};
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Span};

use crate::config::{Config, ConfigError};

/// Expansion of a master into its occurrences.
pub trait OccurrenceExpander {
    /// The zone floating values are resolved in.
    fn floating(&self) -> &TimeZone;

    /// Occurrences of `series` in ascending order, expressed in the value
    /// type and zone of its DTSTART, up to and including `window_end`.
    ///
    /// # Errors
    /// If expansion does not finish within the iteration limit.
    fn occurrences(
        &self,
        series: &EventComponent,
        window_end: Option<&DateTimeValue>,
    ) -> Result<Vec<DateTimeValue>, ExpandError>;

    /// Whether `instant` is one of the occurrences of `series`.
    ///
    /// # Errors
    /// If expansion does not finish within the iteration limit.
    fn produces(&self, series: &EventComponent, instant: &DateTimeValue) -> Result<bool, ExpandError> {
        let occurrences = self.occurrences(series, Some(instant))?;
        Ok(occurrences
            .iter()
            .any(|o| o.same_instant(instant, self.floating())))
    }

    /// The latest occurrence strictly before `point`.
    ///
    /// # Errors
    /// If expansion does not finish within the iteration limit.
    fn last_before(
        &self,
        series: &EventComponent,
        point: &DateTimeValue,
    ) -> Result<Option<DateTimeValue>, ExpandError> {
        let Some(start) = series.start() else {
            return Ok(None);
        };
        let point = frame_civil(start, point, self.floating());
        Ok(self
            .occurrences(series, Some(&start.with_civil(point)))?
            .into_iter()
            .rfind(|o| o.civil() < point))
    }

    /// The final occurrence, `None` for an unbounded rule.
    ///
    /// # Errors
    /// If expansion does not finish within the iteration limit.
    fn last_occurrence(&self, series: &EventComponent) -> Result<Option<DateTimeValue>, ExpandError> {
        match series.rrule() {
            Some(rule) if rule.until().is_none() && rule.count().is_none() => Ok(None),
            _ => Ok(self.occurrences(series, None)?.pop()),
        }
    }
}

/// Errors from expanding a rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    /// The rule did not finish within the configured iteration limit
    #[error("expansion of `{uid}` exceeded {limit} iterations")]
    LimitExceeded {
        /// The series being expanded
        uid: String,
        /// The configured limit
        limit: usize,
    },
}

/// Expander for RFC 5545 recurrence rules.
#[derive(Debug, Clone)]
pub struct RuleExpander {
    floating: TimeZone,
    limit: usize,
}

impl RuleExpander {
    /// Expander resolving floating values in `floating`, giving up after
    /// `limit` iterations.
    #[must_use]
    pub const fn new(floating: TimeZone, limit: usize) -> Self {
        Self { floating, limit }
    }

    /// Expander set up from configuration.
    ///
    /// # Errors
    /// If the configured zone is unknown.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(config.time_zone()?, config.expansion_limit))
    }
}

impl OccurrenceExpander for RuleExpander {
    fn floating(&self) -> &TimeZone {
        &self.floating
    }

    fn occurrences(
        &self,
        series: &EventComponent,
        window_end: Option<&DateTimeValue>,
    ) -> Result<Vec<DateTimeValue>, ExpandError> {
        let Some(start) = series.start() else {
            return Ok(Vec::new());
        };
        let window = window_end.map(|end| bound_civil(start, end, &self.floating));

        let pattern = series
            .rrule()
            .and_then(|rule| Pattern::new(rule, start.civil(), start.is_date()));
        let Some(pattern) = pattern else {
            if series.rrule().is_some() {
                tracing::debug!(uid = %series.uid(), "rule without FREQ, treating as single occurrence");
            }
            let inside = window.is_none_or(|w| start.civil() <= w);
            return Ok(if inside { vec![start.clone()] } else { Vec::new() });
        };

        let until = series
            .rrule()
            .and_then(RecurrenceRule::until)
            .map(|until| bound_civil(start, until, &self.floating));
        let bound = match (window, until) {
            (Some(w), Some(u)) => Some(w.min(u)),
            (w, u) => w.or(u),
        };
        let count = series.rrule().and_then(RecurrenceRule::count);

        let civil = pattern.expand(bound, count, self.limit).ok_or_else(|| {
            tracing::warn!(uid = %series.uid(), limit = self.limit, "expansion limit exceeded");
            ExpandError::LimitExceeded {
                uid: series.uid().to_owned(),
                limit: self.limit,
            }
        })?;
        Ok(civil.into_iter().map(|dt| start.with_civil(dt)).collect())
    }
}

/// `value` expressed in the value type and zone of `reference`.
#[must_use]
pub fn express_in(
    reference: &DateTimeValue,
    value: &DateTimeValue,
    floating: &TimeZone,
) -> DateTimeValue {
    reference.with_civil(frame_civil(reference, value, floating))
}

/// `value` read on the wall clock of `start`.
fn frame_civil(start: &DateTimeValue, value: &DateTimeValue, floating: &TimeZone) -> DateTime {
    if value.is_date() {
        return value.civil();
    }
    value.civil_in(&start.time_zone(floating), floating)
}

/// Inclusive upper bound on the wall clock of `start`; a date bounds the
/// whole day.
fn bound_civil(start: &DateTimeValue, value: &DateTimeValue, floating: &TimeZone) -> DateTime {
    if value.is_date() {
        return value.date().to_datetime(Time::MAX);
    }
    frame_civil(start, value, floating)
}

/// A rule with the by-lists resolved against DTSTART.
#[derive(Debug)]
struct Pattern {
    freq: Frequency,
    interval: i64,
    start: DateTime,
    date_only: bool,
    week_start: Weekday,
    months: Vec<i8>,
    week_numbers: Vec<i8>,
    year_days: Vec<i16>,
    month_days: Vec<i8>,
    week_days: Vec<(Weekday, Option<i8>)>,
    hours: Vec<i8>,
    minutes: Vec<i8>,
    seconds: Vec<i8>,
    set_positions: Vec<i16>,
}

/// One FREQ x INTERVAL step.
#[derive(Debug)]
struct Period {
    /// Earliest wall-clock reading the period can produce
    start: DateTime,
    /// Candidate days, ascending; for a week-numbered year, whole weeks
    days: Vec<Date>,
    /// The period's own reading for sub-daily frequencies
    fixed: Option<DateTime>,
}

impl Pattern {
    fn new(rule: &RecurrenceRule, start: DateTime, date_only: bool) -> Option<Self> {
        let mut pattern = Self {
            freq: rule.frequency()?,
            interval: i64::from(rule.interval().max(1)),
            start,
            date_only,
            week_start: rule.week_start().into(),
            months: Vec::new(),
            week_numbers: Vec::new(),
            year_days: Vec::new(),
            month_days: Vec::new(),
            week_days: Vec::new(),
            hours: Vec::new(),
            minutes: Vec::new(),
            seconds: Vec::new(),
            set_positions: Vec::new(),
        };

        for by in rule.by_rules() {
            match by {
                ByRule::BySecond(v) => pattern.seconds = small(v),
                ByRule::ByMinute(v) => pattern.minutes = small(v),
                ByRule::ByHour(v) => pattern.hours = small(v),
                ByRule::ByDay(v) => {
                    pattern.week_days = v.iter().map(|d| (d.day.into(), d.occurrence)).collect();
                }
                ByRule::ByMonthDay(v) => pattern.month_days.clone_from(v),
                ByRule::ByYearDay(v) => pattern.year_days.clone_from(v),
                ByRule::ByWeekNo(v) => pattern.week_numbers.clone_from(v),
                ByRule::ByMonth(v) => pattern.months = small(v),
                ByRule::BySetPos(v) => pattern.set_positions.clone_from(v),
            }
        }

        let day_limited = !pattern.week_numbers.is_empty()
            || !pattern.year_days.is_empty()
            || !pattern.month_days.is_empty()
            || !pattern.week_days.is_empty();
        if !day_limited {
            match pattern.freq {
                Frequency::Yearly => {
                    if pattern.months.is_empty() {
                        pattern.months = vec![start.month()];
                    }
                    pattern.month_days = vec![start.day()];
                }
                Frequency::Monthly => pattern.month_days = vec![start.day()],
                Frequency::Weekly => pattern.week_days = vec![(start.weekday(), None)],
                _ => {}
            }
        }

        pattern.hours.sort_unstable();
        pattern.minutes.sort_unstable();
        pattern.seconds.sort_unstable();
        Some(pattern)
    }

    /// Occurrences up to `bound`; `None` when the limit is hit first.
    fn expand(&self, bound: Option<DateTime>, count: Option<u32>, limit: usize) -> Option<Vec<DateTime>> {
        let count = count.map(|c| usize::try_from(c).unwrap_or(usize::MAX));
        let mut out = Vec::new();

        for n in 0..limit {
            let step = i64::try_from(n).ok()?.checked_mul(self.interval)?;
            let Some(period) = self.period(step) else {
                return Some(out);
            };
            if bound.is_some_and(|b| period.start > b) {
                return Some(out);
            }

            for dt in self.candidates(&period) {
                if dt < self.start {
                    continue;
                }
                if bound.is_some_and(|b| dt > b) {
                    return Some(out);
                }
                out.push(dt);
                if count.is_some_and(|c| out.len() >= c) {
                    return Some(out);
                }
            }
        }
        None
    }

    fn period(&self, step: i64) -> Option<Period> {
        let date = self.start.date();
        match self.freq {
            Frequency::Yearly => {
                let year = i16::try_from(i64::from(date.year()) + step).ok()?;
                let jan1 = Date::new(year, 1, 1).ok()?;
                let days = if self.week_numbers.is_empty() {
                    day_range(jan1, i64::from(jan1.days_in_year()))
                } else {
                    let first = add_days(jan1, week_one_offset(year, self.week_start)?)?;
                    let next = add_days(
                        Date::new(year.checked_add(1)?, 1, 1).ok()?,
                        week_one_offset(year.checked_add(1)?, self.week_start)?,
                    )?;
                    day_range(first, i64::from(first.until(next).ok()?.get_days()))
                };
                let start = days.first()?.to_datetime(Time::midnight());
                Some(Period { start, days, fixed: None })
            }
            Frequency::Monthly => {
                let months = i64::from(date.year()) * 12 + i64::from(date.month() - 1) + step;
                let year = i16::try_from(months.div_euclid(12)).ok()?;
                let month = i8::try_from(months.rem_euclid(12) + 1).ok()?;
                let first = Date::new(year, month, 1).ok()?;
                let days = day_range(first, i64::from(first.days_in_month()));
                Some(Period {
                    start: first.to_datetime(Time::midnight()),
                    days,
                    fixed: None,
                })
            }
            Frequency::Weekly => {
                let back = i64::from(days_since(date.weekday(), self.week_start));
                let first = add_days(date, step.checked_mul(7)?.checked_sub(back)?)?;
                Some(Period {
                    start: first.to_datetime(Time::midnight()),
                    days: day_range(first, 7),
                    fixed: None,
                })
            }
            Frequency::Daily => {
                let day = add_days(date, step)?;
                Some(Period {
                    start: day.to_datetime(Time::midnight()),
                    days: vec![day],
                    fixed: None,
                })
            }
            Frequency::Hourly => {
                let base = date.at(self.start.hour(), 0, 0, 0);
                sub_daily(base, SignedDuration::from_hours(step))
            }
            Frequency::Minutely => {
                let base = date.at(self.start.hour(), self.start.minute(), 0, 0);
                sub_daily(base, SignedDuration::from_mins(step))
            }
            Frequency::Secondly => {
                let base = date.at(self.start.hour(), self.start.minute(), self.start.second(), 0);
                sub_daily(base, SignedDuration::from_secs(step))
            }
        }
    }

    fn candidates(&self, period: &Period) -> Vec<DateTime> {
        let times = self.times(period.fixed);
        let mut set: Vec<DateTime> = period
            .days
            .iter()
            .enumerate()
            .filter(|(i, day)| self.day_matches(**day, *i, period.days.len()))
            .flat_map(|(_, day)| times.iter().map(move |t| day.to_datetime(*t)))
            .collect();
        set.sort_unstable();
        set.dedup();

        if self.set_positions.is_empty() {
            return set;
        }
        let len = i64::try_from(set.len()).unwrap_or(i64::MAX);
        let mut picked: Vec<DateTime> = self
            .set_positions
            .iter()
            .filter_map(|&pos| {
                let pos = i64::from(pos);
                let index = if pos > 0 { pos - 1 } else { len + pos };
                usize::try_from(index).ok().and_then(|i| set.get(i).copied())
            })
            .collect();
        picked.sort_unstable();
        picked.dedup();
        picked
    }

    /// `index` and `span` place `day` within a week-numbered year.
    fn day_matches(&self, day: Date, index: usize, span: usize) -> bool {
        if !self.months.is_empty() && !self.months.contains(&day.month()) {
            return false;
        }

        if !self.week_numbers.is_empty() {
            let week = i64::try_from(index / 7 + 1).unwrap_or(i64::MAX);
            let weeks = i64::try_from(span / 7).unwrap_or(i64::MAX);
            let hit = self.week_numbers.iter().any(|&n| {
                let n = i64::from(n);
                if n > 0 { n == week } else { weeks + n + 1 == week }
            });
            if !hit {
                return false;
            }
        }

        if !self.year_days.is_empty() {
            let doy = day.day_of_year();
            let days = day.days_in_year();
            if !self
                .year_days
                .iter()
                .any(|&n| if n > 0 { n == doy } else { days + n + 1 == doy })
            {
                return false;
            }
        }

        if !self.month_days.is_empty() {
            let dom = day.day();
            let days = day.days_in_month();
            if !self
                .month_days
                .iter()
                .any(|&n| if n > 0 { n == dom } else { days + n + 1 == dom })
            {
                return false;
            }
        }

        if !self.week_days.is_empty() {
            let hit = self.week_days.iter().any(|&(weekday, occurrence)| {
                if day.weekday() != weekday {
                    return false;
                }
                match occurrence {
                    Some(n) if self.ordinal_in_month() => {
                        nth_matches(n, day.day(), day.days_in_month())
                    }
                    Some(n) if self.ordinal_in_year() => {
                        nth_matches_year(n, day.day_of_year(), day.days_in_year())
                    }
                    _ => true,
                }
            });
            if !hit {
                return false;
            }
        }

        true
    }

    fn ordinal_in_month(&self) -> bool {
        self.freq == Frequency::Monthly
            || (self.freq == Frequency::Yearly && !self.months.is_empty())
    }

    fn ordinal_in_year(&self) -> bool {
        self.freq == Frequency::Yearly && self.week_numbers.is_empty()
    }

    fn times(&self, fixed: Option<DateTime>) -> Vec<Time> {
        if self.date_only {
            return vec![Time::midnight()];
        }

        let (own_hour, own_minute, own_second) = match (self.freq, fixed) {
            (Frequency::Hourly, Some(dt)) => (Some(dt.hour()), None, None),
            (Frequency::Minutely, Some(dt)) => (Some(dt.hour()), Some(dt.minute()), None),
            (Frequency::Secondly, Some(dt)) => (Some(dt.hour()), Some(dt.minute()), Some(dt.second())),
            _ => (None, None, None),
        };
        let hours = pick(own_hour, &self.hours, self.start.hour());
        let minutes = pick(own_minute, &self.minutes, self.start.minute());
        let seconds = pick(own_second, &self.seconds, self.start.second());

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for &h in &hours {
            for &m in &minutes {
                for &s in &seconds {
                    // BYSECOND=60 names a leap second, which civil time cannot hold
                    if let Ok(t) = Time::new(h, m, s, 0) {
                        times.push(t);
                    }
                }
            }
        }
        times
    }
}

fn sub_daily(base: DateTime, delta: SignedDuration) -> Option<Period> {
    let fixed = base.checked_add(delta).ok()?;
    Some(Period {
        start: fixed,
        days: vec![fixed.date()],
        fixed: Some(fixed),
    })
}

/// Values of a time unit: the period's own value if the list allows it,
/// otherwise the list, otherwise the DTSTART value.
fn pick(own: Option<i8>, list: &[i8], default: i8) -> Vec<i8> {
    match own {
        Some(v) if list.is_empty() || list.contains(&v) => vec![v],
        Some(_) => Vec::new(),
        None if list.is_empty() => vec![default],
        None => list.to_vec(),
    }
}

fn small(values: &[u8]) -> Vec<i8> {
    values.iter().filter_map(|&v| i8::try_from(v).ok()).collect()
}

fn nth_matches(n: i8, day: i8, days: i8) -> bool {
    if n > 0 {
        (day - 1) / 7 + 1 == n
    } else {
        (days - day) / 7 + 1 == -n
    }
}

fn nth_matches_year(n: i8, day: i16, days: i16) -> bool {
    let n = i16::from(n);
    if n > 0 {
        (day - 1) / 7 + 1 == n
    } else {
        (days - day) / 7 + 1 == -n
    }
}

/// Days from `week_start` forward to `day`, 0 to 6.
fn days_since(day: Weekday, week_start: Weekday) -> i8 {
    (day.to_monday_zero_offset() - week_start.to_monday_zero_offset()).rem_euclid(7)
}

/// Offset from January 1 to the first day of week 1, the first week with at
/// least four days in the year.
fn week_one_offset(year: i16, week_start: Weekday) -> Option<i64> {
    let jan1 = Date::new(year, 1, 1).ok()?;
    let into_week = i64::from(days_since(jan1.weekday(), week_start));
    Some(if into_week <= 3 { -into_week } else { 7 - into_week })
}

fn add_days(date: Date, days: i64) -> Option<Date> {
    let span = Span::new().try_days(days).ok()?;
    date.checked_add(span).ok()
}

fn day_range(first: Date, len: i64) -> Vec<Date> {
    (0..len).map_while(|i| add_days(first, i)).collect()
}
