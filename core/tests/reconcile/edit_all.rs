// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Whole-series edits: components without RECURRENCE-ID.

use itipcal_core::Action;
use itipcal_ical::{EventComponent, parse_message};

use crate::common::{
    DAILY1_UID, EventText, assert_no_failures, assert_unique_identities, daily1, daily1_instance,
    exception_ids, message, setup,
};

fn components(text: &str) -> Vec<EventComponent> {
    parse_message(text)
        .into_iter()
        .flat_map(|block| block.unwrap().components)
        .collect()
}

fn daily1_with_exceptions() -> String {
    message(
        "PUBLISH",
        &[
            daily1().build(),
            daily1_instance("20160517T100000", "20160517T130000", "20160517T140000", "Moved 17").build(),
            daily1_instance("20160519T100000", "20160519T080000", "20160519T090000", "Moved 19").build(),
        ],
    )
}

#[test]
fn publish_inserts_new_series() {
    let (reconciler, mut store) = setup();

    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[daily1().build()]));

    assert_eq!(
        log,
        [Action::Inserted {
            uid: DAILY1_UID.to_owned(),
            recurrence_id: None,
        }]
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.master(DAILY1_UID).unwrap().summary(), Some("Daily1 Summary"));
}

#[test]
fn publish_all_twice_is_idempotent() {
    let (reconciler, mut store) = setup();
    let text = daily1_with_exceptions();

    reconciler.apply_message(&mut store, &text);
    let once: Vec<EventComponent> = store.iter().cloned().collect();
    let log = reconciler.apply_message(&mut store, &text);
    let twice: Vec<EventComponent> = store.iter().cloned().collect();

    assert_no_failures(&log);
    assert_eq!(once, twice);
    assert!(log.iter().all(|a| matches!(a, Action::Replaced { .. })));
}

#[test]
fn reanchors_exceptions_onto_incoming_ids() {
    let (reconciler, mut store) = setup();
    let master = EventText::new(DAILY1_UID)
        .line("DTSTART:20151109T090000")
        .line("DTEND:20151109T103000")
        .line("SUMMARY:Daily1 Summary")
        .line("RRULE:FREQ=DAILY")
        .build();
    let stored = message(
        "PUBLISH",
        &[
            master.clone(),
            daily1_instance("20160517T100000", "20160517T100000", "20160517T113000", "Old 17").build(),
            daily1_instance("20160519T100000", "20160519T100000", "20160519T113000", "Old 19").build(),
        ],
    );
    for component in components(&stored) {
        store.insert(component);
    }

    let incoming = message(
        "PUBLISH",
        &[
            master,
            daily1_instance("20160517T090000", "20160517T123000", "20160517T140000", "New 17").build(),
            daily1_instance("20160519T090000", "20160519T073000", "20160519T090000", "New 19").build(),
        ],
    );
    let log = reconciler.apply_message(&mut store, &incoming);

    assert_no_failures(&log);
    assert_unique_identities(&store);
    assert_eq!(
        exception_ids(&store, DAILY1_UID),
        ["20160517T090000", "20160519T090000"]
    );
    let revised: Vec<_> = store.exceptions(DAILY1_UID).collect();
    assert_eq!(revised[0].summary(), Some("New 17"));
    assert_eq!(revised[0].start().unwrap().to_string(), "20160517T123000");
    assert_eq!(revised[1].summary(), Some("New 19"));
    assert_eq!(revised[1].end().unwrap().to_string(), "20160519T090000");

    let reanchored = log
        .iter()
        .filter(|a| matches!(a, Action::Reanchored { .. }))
        .count();
    assert_eq!(reanchored, 2);
}

#[test]
fn reanchors_by_start_time_shift() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &daily1_with_exceptions());

    let moved_master = EventText::new(DAILY1_UID)
        .line("DTSTART:20151109T090000")
        .line("DTEND:20151109T100000")
        .line("SUMMARY:Daily1 Earlier")
        .line("RRULE:FREQ=DAILY")
        .build();
    let incoming = message(
        "REQUEST",
        &[
            moved_master,
            daily1_instance("20160517T090000", "20160517T120000", "20160517T130000", "Moved 17").build(),
        ],
    );
    let log = reconciler.apply_message(&mut store, &incoming);

    assert_no_failures(&log);
    assert_unique_identities(&store);
    // 19 has no revised counterpart in the message and keeps its id
    assert_eq!(
        exception_ids(&store, DAILY1_UID),
        ["20160517T090000", "20160519T100000"]
    );
    assert!(log.contains(&Action::Reanchored {
        uid: DAILY1_UID.to_owned(),
        from: "20160517T100000".to_owned(),
        to: "20160517T090000".to_owned(),
    }));
}

#[test]
fn master_only_edit_keeps_exception_ids() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &daily1_with_exceptions());

    let edited = daily1().line("LOCATION:Room 2").build();
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[edited]));

    assert_eq!(
        log,
        [Action::Replaced {
            uid: DAILY1_UID.to_owned(),
            recurrence_id: None,
        }]
    );
    assert_eq!(
        exception_ids(&store, DAILY1_UID),
        ["20160517T100000", "20160519T100000"]
    );
}

#[test]
fn bounding_the_rule_drops_later_exceptions() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &daily1_with_exceptions());

    let bounded = EventText::new(DAILY1_UID)
        .line("DTSTART:20151109T100000")
        .line("DTEND:20151109T110000")
        .line("SUMMARY:Daily1 Summary")
        .line("RRULE:FREQ=DAILY;UNTIL=20160518T100000")
        .build();
    let log = reconciler.apply_message(&mut store, &message("PUBLISH", &[bounded]));

    assert_no_failures(&log);
    assert_eq!(exception_ids(&store, DAILY1_UID), ["20160517T100000"]);
    assert!(log.contains(&Action::Removed {
        uid: DAILY1_UID.to_owned(),
        recurrence_id: Some("20160519T100000".to_owned()),
    }));
}

#[test]
fn dropping_the_rule_drops_all_exceptions() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &daily1_with_exceptions());

    let single = EventText::new(DAILY1_UID)
        .line("DTSTART:20151109T100000")
        .line("DTEND:20151109T110000")
        .line("SUMMARY:Just once")
        .build();
    reconciler.apply_message(&mut store, &message("PUBLISH", &[single]));

    assert_eq!(store.len(), 1);
    assert!(store.master(DAILY1_UID).unwrap().rrule().is_none());
}

#[test]
fn cancel_master_removes_whole_series() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &daily1_with_exceptions());

    let cancel = message("CANCEL", &[EventText::new(DAILY1_UID).build()]);
    let log = reconciler.apply_message(&mut store, &cancel);

    assert!(store.is_empty());
    assert_eq!(log.len(), 3);
    assert!(log.iter().all(|a| matches!(a, Action::Removed { .. })));

    let log = reconciler.apply_message(&mut store, &cancel);
    assert!(matches!(&log[..], [Action::Ignored { .. }]));
}

#[test]
fn publish_then_cancel_recurrences_in_one_message() {
    let (reconciler, mut store) = setup();
    reconciler.apply_message(&mut store, &daily1_with_exceptions());

    let earlier = daily1()
        .line("SEQUENCE:1")
        .build()
        .replace("DTSTART:20151109T100000", "DTSTART:20151109T090000")
        .replace("DTEND:20151109T110000", "DTEND:20151109T103000");
    let cancel = |rid: &str| {
        EventText::new(DAILY1_UID)
            .line(format!("RECURRENCE-ID:{rid}"))
            .build()
    };
    let text = message("PUBLISH", &[earlier])
        + &message("CANCEL", &[cancel("20160517T100000"), cancel("20160519T100000")]);

    let log = reconciler.apply_message(&mut store, &text);

    // no revised instances in the first block, so the stored ids stay put
    // and the second block removes them
    assert_eq!(
        log,
        [
            Action::Replaced {
                uid: DAILY1_UID.to_owned(),
                recurrence_id: None,
            },
            Action::Removed {
                uid: DAILY1_UID.to_owned(),
                recurrence_id: Some("20160517T100000".to_owned()),
            },
            Action::Removed {
                uid: DAILY1_UID.to_owned(),
                recurrence_id: Some("20160519T100000".to_owned()),
            },
        ]
    );
    assert_eq!(store.len(), 1);
    let master = store.master(DAILY1_UID).unwrap();
    assert_eq!(master.sequence(), 1);
    assert_eq!(master.start().unwrap().to_string(), "20151109T090000");
    assert_eq!(master.end().unwrap().to_string(), "20151109T103000");
    assert!(master.exception_dates().is_empty());
}
