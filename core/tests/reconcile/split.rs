// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! This-and-future edits: RECURRENCE-ID with `RANGE=THISANDFUTURE`.

use itipcal_core::{Action, CalendarStore, Reconciler};
use itipcal_ical::{DateTimeValue, EventComponent};

use crate::common::{
    DAILY1_UID, EventText, TEST_ZONE, WHOLE_DAY_UID, assert_no_failures, assert_unique_identities,
    daily1, daily1_instance, daily1_zoned, exception_ids, message, setup, whole_day,
};

fn with_exceptions(days: &[&str]) -> (Reconciler, CalendarStore) {
    let (reconciler, mut store) = setup();
    let mut events = vec![daily1().build()];
    for day in days {
        let rid = format!("2016{day}T100000");
        let start = format!("2016{day}T130000");
        let end = format!("2016{day}T140000");
        events.push(daily1_instance(&rid, &start, &end, "Moved").build());
    }
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &events));
    assert_no_failures(&log);
    (reconciler, store)
}

fn continuations<'a>(store: &'a CalendarStore, of: &'a str) -> Vec<&'a EventComponent> {
    store.related_to(of).collect()
}

#[test]
fn split_creates_continuation_and_moves_later_exceptions() {
    let (reconciler, mut store) = with_exceptions(&["0517"]);

    let edit = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160516T100000")
        .line("DTSTART:20160516T120000")
        .line("DTEND:20160516T130000")
        .line("SUMMARY:Afternoon")
        .line("DTSTAMP:20160516T090000Z")
        .build();
    let log = reconciler.apply_message(&mut store, &message("REQUEST", &[edit]));

    assert_no_failures(&log);
    assert_unique_identities(&store);

    let original = store.master(DAILY1_UID).unwrap();
    let rule = original.rrule().unwrap();
    assert_eq!(rule.until().unwrap().to_string(), "20160515T100000");
    assert_eq!(original.sequence(), 1);

    let found = continuations(&store, DAILY1_UID);
    assert_eq!(found.len(), 1);
    let continuation = found[0];
    let new_uid = continuation.uid().to_owned();
    assert!(new_uid.ends_with("@test.itipcal"));
    assert_eq!(continuation.related_to(), [DAILY1_UID]);
    assert_eq!(continuation.summary(), Some("Afternoon"));
    assert_eq!(continuation.rrule().unwrap().to_string(), "FREQ=DAILY");

    // the exception follows the two hour move of the series
    assert!(exception_ids(&store, DAILY1_UID).is_empty());
    assert_eq!(exception_ids(&store, &new_uid), ["20160517T120000"]);
    let moved = store.exceptions(&new_uid).next().unwrap();
    assert_eq!(moved.start().unwrap().to_string(), "20160517T150000");
    assert_eq!(moved.end().unwrap().to_string(), "20160517T160000");
    assert_eq!(moved.dtstamp().unwrap().to_string(), "20160516T090000Z");
    assert_eq!(moved.summary(), Some("Moved"));

    assert!(log.contains(&Action::Truncated {
        uid: DAILY1_UID.to_owned(),
        until: "20160515T100000".to_owned(),
    }));
    assert!(log.contains(&Action::Reparented {
        from: DAILY1_UID.to_owned(),
        to: new_uid,
        recurrence_id: "20160517T120000".to_owned(),
    }));
}

#[test]
fn split_conserves_exceptions() {
    let (reconciler, mut store) = with_exceptions(&["0510", "0517", "0520"]);

    let edit = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160516T100000")
        .line("SUMMARY:Renamed")
        .build();
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[edit]));
    assert_no_failures(&log);

    let found = continuations(&store, DAILY1_UID);
    let continuation = found[0];
    let new_uid = continuation.uid().to_owned();
    // start and rule come from the split point and the original series
    assert_eq!(continuation.start().unwrap().to_string(), "20160516T100000");
    assert_eq!(continuation.end().unwrap().to_string(), "20160516T110000");

    assert_eq!(exception_ids(&store, DAILY1_UID), ["20160510T100000"]);
    assert_eq!(
        exception_ids(&store, &new_uid),
        ["20160517T100000", "20160520T100000"]
    );
    assert_eq!(store.len(), 5);
}

#[test]
fn cancel_this_and_future_truncates_in_series_zone() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1_zoned().build()]));

    let cancel = EventText::new(DAILY1_UID)
        .line(format!(
            "RECURRENCE-ID;TZID={TEST_ZONE};RANGE=THISANDFUTURE:20160515T100000"
        ))
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel]));

    assert_eq!(
        log,
        [Action::Truncated {
            uid: DAILY1_UID.to_owned(),
            until: "20160514T170000Z".to_owned(),
        }]
    );
    assert_eq!(store.len(), 1);
    let master = store.master(DAILY1_UID).unwrap();
    assert!(master.rrule().unwrap().count().is_none());
}

#[test]
fn cancel_this_and_future_removes_later_exceptions() {
    let (reconciler, mut store) = with_exceptions(&["0510", "0517"]);

    let cancel = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160516T100000")
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel]));

    assert_no_failures(&log);
    assert_eq!(exception_ids(&store, DAILY1_UID), ["20160510T100000"]);
    assert!(continuations(&store, DAILY1_UID).is_empty());
    assert_eq!(
        store.master(DAILY1_UID).unwrap().rrule().unwrap().until().unwrap().to_string(),
        "20160515T100000"
    );
}

#[test]
fn split_at_first_occurrence_edits_whole_series() {
    let (reconciler, mut store) = with_exceptions(&[]);

    let edit = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20151109T100000")
        .line("DTSTART:20151109T100000")
        .line("DTEND:20151109T110000")
        .line("RRULE:FREQ=DAILY")
        .line("SUMMARY:Everything")
        .build();
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[edit]));

    assert_eq!(
        log,
        [Action::Replaced {
            uid: DAILY1_UID.to_owned(),
            recurrence_id: None,
        }]
    );
    assert_eq!(store.len(), 1);
    let master = store.master(DAILY1_UID).unwrap();
    assert_eq!(master.summary(), Some("Everything"));
    assert!(master.recurrence_id().is_none());
}

#[test]
fn later_split_follows_continuation_chain() {
    let (reconciler, mut store) = with_exceptions(&[]);

    let first = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160516T100000")
        .line("DTSTART:20160516T120000")
        .line("DTEND:20160516T130000")
        .build();
    reconciler.apply_message(&mut store, &message("REQUEST", &[first]));
    let middle = continuations(&store, DAILY1_UID)[0].uid().to_owned();

    // addressed through the original uid, produced only by the continuation
    let second = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160520T120000")
        .line("SUMMARY:Late")
        .build();
    let log = reconciler.apply_message(&mut store, &message("REQUEST", &[second]));

    assert_no_failures(&log);
    assert_unique_identities(&store);
    assert_eq!(store.iter().filter(|c| c.is_master()).count(), 3);

    let truncated = store.master(&middle).unwrap();
    assert_eq!(
        truncated.rrule().unwrap().until().unwrap().to_string(),
        "20160519T120000"
    );
    let last = continuations(&store, &middle);
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].summary(), Some("Late"));
}

#[test]
fn split_point_outside_series_is_unresolvable() {
    let (reconciler, mut store) = with_exceptions(&["0517"]);
    let before: Vec<EventComponent> = store.iter().cloned().collect();

    let edit = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160516T093000")
        .build();
    let log = reconciler.apply_message(&mut store, &message("REQUEST", &[edit]));

    assert!(matches!(&log[..], [Action::Failed { uid: Some(_), .. }]));
    let after: Vec<EventComponent> = store.iter().cloned().collect();
    assert_eq!(before, after);
}

#[test]
fn truncation_keeps_the_start_value_type() {
    let (reconciler, mut store) = with_exceptions(&[]);
    reconciler.apply_message(&mut store, &message("PUBLISH", &[whole_day().build()]));

    let floating = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID;RANGE=THISANDFUTURE:20160516T100000")
        .build();
    let date = EventText::new(WHOLE_DAY_UID)
        .line("RECURRENCE-ID;VALUE=DATE;RANGE=THISANDFUTURE:20160516")
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[floating, date]));
    assert_no_failures(&log);

    let until = |uid| store.master(uid).unwrap().rrule().unwrap().until().cloned();
    assert!(matches!(until(DAILY1_UID), Some(DateTimeValue::Floating(_))));
    assert_eq!(until(DAILY1_UID).unwrap().to_string(), "20160515T100000");
    assert!(matches!(until(WHOLE_DAY_UID), Some(DateTimeValue::Date(_))));
    assert_eq!(until(WHOLE_DAY_UID).unwrap().to_string(), "20160514");
}

#[test]
fn two_block_split_with_related_continuation() {
    let (reconciler, mut store) = with_exceptions(&["0510", "0517"]);
    let new_uid = "20160516T090000-005@jfxtras.org";

    let bounded = EventText::new(DAILY1_UID)
        .line("DTSTART:20151109T100000")
        .line("DTEND:20151109T110000")
        .line("SUMMARY:Daily1 Summary")
        .line("DTSTAMP:20150110T080000Z")
        .line("RRULE:FREQ=DAILY;UNTIL=20160515T100000")
        .line("SEQUENCE:1")
        .build();
    let continuation = EventText::new(new_uid)
        .line("DTSTART:20160516T090000")
        .line("DTEND:20160516T103000")
        .line("SUMMARY:Daily1 Summary")
        .line("DTSTAMP:20160516T080000Z")
        .line("RRULE:FREQ=DAILY")
        .line(format!("RELATED-TO:{DAILY1_UID}"))
        .build();
    let instance = EventText::new(new_uid)
        .line("RECURRENCE-ID:20160518T090000")
        .line("DTSTART:20160518T130000")
        .line("DTEND:20160518T143000")
        .line("SUMMARY:Moved 18")
        .build();
    let text = message("REQUEST", &[bounded]) + &message("PUBLISH", &[continuation, instance]);

    let log = reconciler.apply_message(&mut store, &text);

    assert_no_failures(&log);
    assert_unique_identities(&store);

    let original = store.master(DAILY1_UID).unwrap();
    assert_eq!(original.sequence(), 1);
    assert_eq!(
        original.rrule().unwrap().until().unwrap().to_string(),
        "20160515T100000"
    );
    // exceptions past the new bound go with the revised rule
    assert_eq!(exception_ids(&store, DAILY1_UID), ["20160510T100000"]);
    assert!(log.contains(&Action::Removed {
        uid: DAILY1_UID.to_owned(),
        recurrence_id: Some("20160517T100000".to_owned()),
    }));

    let found = continuations(&store, DAILY1_UID);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].uid(), new_uid);
    assert_eq!(found[0].related_to(), [DAILY1_UID]);
    assert_eq!(exception_ids(&store, new_uid), ["20160518T090000"]);
    assert!(log.contains(&Action::Inserted {
        uid: new_uid.to_owned(),
        recurrence_id: Some("20160518T090000".to_owned()),
    }));
}

#[test]
fn two_block_split_from_whole_day_to_timed() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[whole_day().build()]));
    let new_uid = "20160516T090000-011@jfxtras.org";

    let bounded = EventText::new(WHOLE_DAY_UID)
        .line("DTSTART;VALUE=DATE:20151108")
        .line("DTEND;VALUE=DATE:20151109")
        .line("SUMMARY:WholeDay1 Summary")
        .line("DTSTAMP:20150110T080000Z")
        .line("RRULE:FREQ=DAILY;INTERVAL=2;UNTIL=20160514")
        .line("SEQUENCE:1")
        .build();
    let timed = EventText::new(new_uid)
        .line("DTSTART:20160516T090000")
        .line("DTEND:20160516T103000")
        .line("SUMMARY:WholeDay1 Summary")
        .line("DTSTAMP:20160516T080000Z")
        .line("RRULE:FREQ=DAILY;INTERVAL=2")
        .line(format!("RELATED-TO:{WHOLE_DAY_UID}"))
        .build();
    let text = message("REQUEST", &[bounded]) + &message("PUBLISH", &[timed]);

    let log = reconciler.apply_message(&mut store, &text);

    assert_no_failures(&log);
    assert_unique_identities(&store);
    assert_eq!(store.len(), 2);

    let original = store.master(WHOLE_DAY_UID).unwrap();
    assert!(matches!(original.start(), Some(DateTimeValue::Date(_))));
    assert_eq!(
        original.rrule().unwrap().until().unwrap().to_string(),
        "20160514"
    );

    let found = continuations(&store, WHOLE_DAY_UID);
    assert_eq!(found.len(), 1);
    assert!(matches!(found[0].start(), Some(DateTimeValue::Floating(_))));
    assert_eq!(found[0].related_to(), [WHOLE_DAY_UID]);
}
