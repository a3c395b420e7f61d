// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Single-occurrence edits: RECURRENCE-ID without RANGE.

use itipcal_core::Action;

use crate::common::{
    DAILY1_UID, EventText, TEST_ZONE, WHOLE_DAY_UID, assert_no_failures, assert_unique_identities,
    daily1, daily1_instance, daily1_zoned, exception_ids, message, setup, whole_day,
};

#[test]
fn publish_instance_inserts_then_replaces() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1().build()]));

    let first = daily1_instance("20160517T100000", "20160517T130000", "20160517T140000", "Lunch");
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[first.build()]));
    assert_eq!(
        log,
        [Action::Inserted {
            uid: DAILY1_UID.to_owned(),
            recurrence_id: Some("20160517T100000".to_owned()),
        }]
    );

    let second = daily1_instance("20160517T100000", "20160517T150000", "20160517T160000", "Tea");
    let log = reconciler.apply_message(&mut store, &message("REQUEST", &[second.build()]));
    assert_eq!(
        log,
        [Action::Replaced {
            uid: DAILY1_UID.to_owned(),
            recurrence_id: Some("20160517T100000".to_owned()),
        }]
    );

    assert_unique_identities(&store);
    assert_eq!(store.len(), 2);
    let exception = store.exceptions(DAILY1_UID).next().unwrap();
    assert_eq!(exception.summary(), Some("Tea"));
}

#[test]
fn cancel_occurrence_adds_exdate() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1().build()]));

    let cancel = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID:20160517T100000")
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel.clone()]));

    assert_eq!(
        log,
        [Action::ExcludedDate {
            uid: DAILY1_UID.to_owned(),
            date: "20160517T100000".to_owned(),
        }]
    );
    let master = store.master(DAILY1_UID).unwrap();
    assert_eq!(master.exception_dates().len(), 1);
    assert_eq!(master.sequence(), 0);
    let rule = master.rrule().unwrap();
    assert!(rule.until().is_none());
    assert!(rule.count().is_none());
    assert_eq!(store.len(), 1);

    // a second cancel of the same occurrence changes nothing
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel]));
    assert!(matches!(&log[..], [Action::Ignored { .. }]));
    assert_eq!(store.master(DAILY1_UID).unwrap().exception_dates().len(), 1);
}

#[test]
fn exdate_takes_the_master_zone() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1_zoned().build()]));

    let cancel = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID:20160517T170000Z")
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel]));

    assert_no_failures(&log);
    let master = store.master(DAILY1_UID).unwrap();
    let exdate = &master.exception_dates()[0];
    assert_eq!(exdate.tzid(), Some(TEST_ZONE));
    assert_eq!(exdate.to_string(), "20160517T100000");
}

#[test]
fn cancel_stored_exception_removes_it() {
    let (reconciler, mut store) = setup();
    let publish = message(
        "PUBLISH",
        &[
            daily1().build(),
            daily1_instance("20160517T100000", "20160517T130000", "20160517T140000", "Lunch").build(),
        ],
    );
    reconciler.apply_message(&mut store, &publish);

    let cancel = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID:20160517T100000")
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel]));

    assert_eq!(
        log,
        [Action::Removed {
            uid: DAILY1_UID.to_owned(),
            recurrence_id: Some("20160517T100000".to_owned()),
        }]
    );
    assert!(exception_ids(&store, DAILY1_UID).is_empty());
    assert!(store.master(DAILY1_UID).unwrap().exception_dates().is_empty());
}

#[test]
fn cancel_whole_day_occurrence() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[whole_day().build()]));

    let cancel = EventText::new(WHOLE_DAY_UID)
        .line("RECURRENCE-ID;VALUE=DATE:20151110")
        .build();
    let log = reconciler.apply_message(&mut store, &message("CANCEL", &[cancel]));

    assert_no_failures(&log);
    let master = store.master(WHOLE_DAY_UID).unwrap();
    assert!(master.exception_dates()[0].is_date());
    assert_eq!(master.exception_dates()[0].to_string(), "20151110");
}

#[test]
fn occurrence_outside_series_is_unresolvable() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1().build(), whole_day().build()]));

    let off_pattern = daily1_instance("20160517T093000", "20160517T093000", "20160517T103000", "Odd");
    let off_day = EventText::new(WHOLE_DAY_UID)
        .line("RECURRENCE-ID;VALUE=DATE:20151109")
        .line("SUMMARY:Not a series day")
        .build();
    let unknown = EventText::new("nobody@example.com")
        .line("RECURRENCE-ID:20160517T100000")
        .build();
    let log = reconciler.apply_message(
        &mut store,
        &message("PUBLISH", &[off_pattern.build(), off_day, unknown]),
    );

    assert_eq!(log.len(), 3);
    assert!(log.iter().all(Action::is_failure));
    assert!(matches!(
        &log[0],
        Action::Failed { uid: Some(uid), recurrence_id: Some(rid), .. }
            if uid == DAILY1_UID && rid == "20160517T093000"
    ));
    assert_eq!(store.len(), 2);
}
