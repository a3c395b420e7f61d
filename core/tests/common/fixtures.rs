// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.
//!
//! Events are built as iCalendar text so every test also goes through the
//! message parser, the way an embedder would feed the reconciler.

use itipcal_core::{CalendarStore, Config, Reconciler};

/// Uid of the daily series used throughout the tests.
pub const DAILY1_UID: &str = "20150110T080000-004@jfxtras.org";

/// Uid of the whole-day series.
pub const WHOLE_DAY_UID: &str = "20150110T080000-010@jfxtras.org";

/// Zone floating values are resolved in.
pub const TEST_ZONE: &str = "America/Los_Angeles";

/// Configuration with a fixed zone and a test uid domain.
///
/// # Panics
///
/// Panics if the fixture text stops parsing.
#[must_use]
pub fn test_config() -> Config {
    format!(
        r#"
default_timezone = "{TEST_ZONE}"
expansion_limit = 50000
uid_domain = "test.itipcal"
"#
    )
    .parse()
    .unwrap()
}

/// A reconciler and an empty store sharing [`test_config`].
#[must_use]
pub fn setup() -> (Reconciler, CalendarStore) {
    let config = test_config();
    let reconciler = Reconciler::from_config(&config).unwrap();
    let store = CalendarStore::new(config.time_zone().unwrap());
    (reconciler, store)
}

/// Wrap VEVENT blocks into one VCALENDAR with `method`.
#[must_use]
pub fn message(method: &str, events: &[String]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_owned(),
        format!("METHOD:{method}"),
        "PRODID:-//jfxtras//test//EN".to_owned(),
        "VERSION:2.0".to_owned(),
    ];
    lines.extend(events.iter().cloned());
    lines.push("END:VCALENDAR".to_owned());
    lines.join("\r\n") + "\r\n"
}

/// Builder for VEVENT text.
#[derive(Debug, Clone)]
pub struct EventText {
    lines: Vec<String>,
}

impl EventText {
    /// An event with only a UID.
    #[must_use]
    pub fn new(uid: &str) -> Self {
        Self {
            lines: vec![format!("UID:{uid}")],
        }
    }

    /// Add a raw property line.
    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Render as a VEVENT block.
    #[must_use]
    pub fn build(self) -> String {
        let mut out = vec!["BEGIN:VEVENT".to_owned()];
        out.extend(self.lines);
        out.push("END:VEVENT".to_owned());
        out.join("\r\n")
    }
}

/// The daily series: floating 10:00 to 11:00 starting 2015-11-09.
#[must_use]
pub fn daily1() -> EventText {
    EventText::new(DAILY1_UID)
        .line("CATEGORIES:group05")
        .line("DTSTART:20151109T100000")
        .line("DTEND:20151109T110000")
        .line("DESCRIPTION:Daily1 Description")
        .line("SUMMARY:Daily1 Summary")
        .line("DTSTAMP:20150110T080000Z")
        .line("ORGANIZER;CN=Papa Smurf:mailto:papa@smurf.org")
        .line("RRULE:FREQ=DAILY")
}

/// The daily series anchored in [`TEST_ZONE`].
#[must_use]
pub fn daily1_zoned() -> EventText {
    EventText::new(DAILY1_UID)
        .line(format!("DTSTART;TZID={TEST_ZONE}:20151109T100000"))
        .line(format!("DTEND;TZID={TEST_ZONE}:20151109T110000"))
        .line("SUMMARY:Daily1 Summary")
        .line("DTSTAMP:20150110T080000Z")
        .line("RRULE:FREQ=DAILY")
}

/// A whole-day series every other day starting 2015-11-08.
#[must_use]
pub fn whole_day() -> EventText {
    EventText::new(WHOLE_DAY_UID)
        .line("DTSTART;VALUE=DATE:20151108")
        .line("DTEND;VALUE=DATE:20151109")
        .line("SUMMARY:WholeDay1 Summary")
        .line("DTSTAMP:20150110T080000Z")
        .line("RRULE:FREQ=DAILY;INTERVAL=2")
}

/// A revised instance of the daily series.
#[must_use]
pub fn daily1_instance(recurrence_id: &str, start: &str, end: &str, summary: &str) -> EventText {
    EventText::new(DAILY1_UID)
        .line(format!("RECURRENCE-ID:{recurrence_id}"))
        .line(format!("DTSTART:{start}"))
        .line(format!("DTEND:{end}"))
        .line(format!("SUMMARY:{summary}"))
        .line("DTSTAMP:20160516T080000Z")
}
