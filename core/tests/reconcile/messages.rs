// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Message-level behavior: block order, methods, failures and the log.

use itipcal_core::{Action, StoreQuery};
use itipcal_ical::{EventComponent, Method, parse_message};

use crate::common::{
    DAILY1_UID, EventText, WHOLE_DAY_UID, assert_unique_identities, daily1, daily1_instance,
    message, setup, whole_day,
};

#[test]
fn blocks_apply_in_arrival_order() {
    let (reconciler, mut store) = setup();
    let cancel = EventText::new(DAILY1_UID)
        .line("RECURRENCE-ID:20160517T100000")
        .build();
    let text = message("PUBLISH", &[daily1().build()]) + &message("CANCEL", &[cancel]);

    let log = reconciler.apply_message(&mut store, &text);

    assert!(matches!(
        &log[..],
        [Action::Inserted { .. }, Action::ExcludedDate { .. }]
    ));
    assert_eq!(store.master(DAILY1_UID).unwrap().exception_dates().len(), 1);
}

#[test]
fn unreconciled_methods_are_ignored() {
    let (reconciler, mut store) = setup();
    for method in ["REPLY", "ADD", "REFRESH", "COUNTER", "DECLINECOUNTER"] {
        let log = reconciler.apply_message(&mut store, &message(method, &[daily1().build()]));
        assert!(
            matches!(&log[..], [Action::Ignored { method: m, .. }] if m == method),
            "{method}: {log:?}"
        );
    }
    assert!(store.is_empty());
}

#[test]
fn malformed_block_does_not_stop_the_message() {
    let (reconciler, mut store) = setup();
    let without_method = format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{}\r\nEND:VCALENDAR\r\n",
        whole_day().build()
    );
    let text = without_method + &message("PUBLISH", &[daily1().build()]);

    let log = reconciler.apply_message(&mut store, &text);

    assert_eq!(log.len(), 2);
    assert!(matches!(&log[0], Action::Failed { uid: None, .. }));
    assert!(matches!(&log[1], Action::Inserted { .. }));
    assert!(store.master(WHOLE_DAY_UID).is_none());
}

#[test]
fn failed_component_does_not_stop_its_siblings() {
    let (reconciler, mut store) = setup();
    let no_uid = "BEGIN:VEVENT\r\nSUMMARY:Anonymous\r\nEND:VEVENT".to_owned();
    let orphan = daily1_instance("20160517T100000", "20160517T130000", "20160517T140000", "Orphan");
    let text = message("PUBLISH", &[no_uid, orphan.build(), whole_day().build()]);

    let log = reconciler.apply_message(&mut store, &text);

    assert_eq!(log.iter().filter(|a| a.is_failure()).count(), 2);
    assert!(log.contains(&Action::Inserted {
        uid: WHOLE_DAY_UID.to_owned(),
        recurrence_id: None,
    }));
    assert_eq!(store.len(), 1);
}

#[test]
fn invalid_rule_is_kept_with_problems() {
    let (reconciler, mut store) = setup();
    let conflicting = EventText::new(DAILY1_UID)
        .line("DTSTART:20151109T100000")
        .line("RRULE:FREQ=DAILY;COUNT=3;UNTIL=20151120T100000")
        .build();

    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[conflicting]));

    assert!(matches!(&log[..], [Action::Inserted { .. }]));
    let master = store.master(DAILY1_UID).unwrap();
    assert!(!master.rrule().unwrap().is_valid());
    assert!(!master.problems().is_empty());
}

#[test]
fn apply_accepts_prebuilt_components() {
    let (reconciler, mut store) = setup();
    let components: Vec<EventComponent> = parse_message(&message("PUBLISH", &[daily1().build()]))
        .into_iter()
        .flat_map(|block| block.unwrap().components)
        .collect();

    let log = reconciler.apply(&mut store, Method::Request, &components);

    assert!(matches!(&log[..], [Action::Inserted { .. }]));
    assert_unique_identities(&store);
}

#[test]
fn log_serializes_for_embedders() {
    let (reconciler, mut store) = setup();
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1().build()]));

    let json = serde_json::to_value(&log).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "action": "inserted",
            "uid": DAILY1_UID,
            "recurrence_id": null,
        }])
    );
}

#[test]
fn enumerates_store_by_start() {
    let (reconciler, mut store) = setup();
    let text = message(
        "PUBLISH",
        &[
            daily1().build(),
            daily1_instance("20160517T100000", "20160517T130000", "20160517T140000", "Lunch").build(),
            whole_day().build(),
        ],
    );
    reconciler.apply_message(&mut store, &text);

    let all: Vec<_> = store
        .enumerate(&StoreQuery::all())
        .iter()
        .map(|c| (c.uid(), c.recurrence_id().is_some()))
        .collect();
    assert_eq!(
        all,
        [(WHOLE_DAY_UID, false), (DAILY1_UID, false), (DAILY1_UID, true)]
    );

    let daily = store.enumerate(&StoreQuery::all().with_uid(DAILY1_UID));
    assert_eq!(daily.len(), 2);
}
