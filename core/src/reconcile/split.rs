// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Splitting a series at a `RANGE=THISANDFUTURE` occurrence.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use itipcal_ical::{DateTimeValue, EventComponent, RecurrenceRule};
use jiff::tz::TimeZone;

use crate::expand::{OccurrenceExpander, express_in};
use crate::reconcile::{Action, ReconcileError, compare};
use crate::store::CalendarStore;

/// Find the stored series producing `split_point`.
///
/// The search starts at the component's own uid and the uids it names in
/// RELATED-TO, then walks continuation links in both directions, so a
/// series that was already split can be addressed by any of its parts.
pub(super) fn locate_series<E: OccurrenceExpander>(
    expander: &E,
    store: &CalendarStore,
    component: &EventComponent,
    split_point: &DateTimeValue,
) -> Result<String, ReconcileError> {
    let mut queue: VecDeque<String> = std::iter::once(component.uid())
        .chain(component.related_to().iter().map(String::as_str))
        .map(ToOwned::to_owned)
        .collect();
    let mut seen = HashSet::new();

    while let Some(uid) = queue.pop_front() {
        if !seen.insert(uid.clone()) {
            continue;
        }
        let Some(master) = store.master(&uid) else {
            continue;
        };
        if expander.produces(master, split_point)? {
            return Ok(uid);
        }
        queue.extend(store.related_to(&uid).map(|c| c.uid().to_owned()));
        queue.extend(master.related_to().iter().cloned());
    }

    Err(ReconcileError::unresolvable(component.uid(), split_point))
}

/// The master bounded to end at `previous`, its last occurrence kept.
///
/// UNTIL takes DTSTART's value type; a zoned DTSTART gets a UTC UNTIL.
pub(super) fn truncate(
    master: &EventComponent,
    previous: &DateTimeValue,
    floating: &TimeZone,
) -> Result<EventComponent, ReconcileError> {
    let until = match master.start() {
        Some(DateTimeValue::Zoned { .. }) => previous.to_utc(floating)?,
        _ => previous.clone(),
    };
    let rule = master
        .rrule()
        .cloned()
        .map(|rule| rule.without_count().with_until(until));
    Ok(master
        .clone()
        .with_rrule(rule)
        .with_sequence(master.sequence().saturating_add(1)))
}

/// The new series carrying the edited occurrences from `split_point` on.
///
/// Missing DTSTART and RRULE are taken from `master`, the start moved to
/// the split point and the rule stripped of its COUNT.
pub(super) fn continuation(
    component: &EventComponent,
    master: &EventComponent,
    uid: &str,
    split_point: &DateTimeValue,
    floating: &TimeZone,
) -> Result<EventComponent, ReconcileError> {
    let mut continuation = component
        .clone()
        .with_uid(uid)
        .with_recurrence_id(None)
        .with_range(None)
        .with_related_to(master.uid());

    if continuation.rrule().is_none() {
        let rule = master.rrule().cloned().map(RecurrenceRule::without_count);
        continuation = continuation.with_rrule(rule);
    }

    if continuation.start().is_none() {
        let master_start = master.start().ok_or_else(|| ReconcileError::MissingStart {
            uid: master.uid().to_owned(),
        })?;
        let start = express_in(master_start, split_point, floating);
        let moved = start.civil().duration_since(master_start.civil());
        if continuation.end().is_none() {
            let end = master.end().map(|end| end.shifted(moved)).transpose()?;
            continuation = continuation.with_end(end);
        }
        continuation = continuation.with_start(Some(start));
    }
    Ok(continuation)
}

/// Move the master's exceptions at or after `split_point` to the
/// continuation, shifted by the difference between the continuation's
/// DTSTART and the split point.
pub(super) fn reparent(
    store: &mut CalendarStore,
    master: &EventComponent,
    continuation: &EventComponent,
    split_point: &DateTimeValue,
    log: &mut Vec<Action>,
) -> Result<(), ReconcileError> {
    let floating = store.floating().clone();
    let (Some(master_start), Some(continuation_start)) = (master.start(), continuation.start())
    else {
        return Err(ReconcileError::MissingStart {
            uid: master.uid().to_owned(),
        });
    };

    let split_civil = express_in(master_start, split_point, &floating).civil();
    let delta = express_in(master_start, continuation_start, &floating)
        .civil()
        .duration_since(split_civil);

    let moving: Vec<EventComponent> = store
        .exceptions(master.uid())
        .filter(|c| {
            c.recurrence_id()
                .is_some_and(|rid| compare(rid, split_point, &floating) != Ordering::Less)
        })
        .cloned()
        .collect();

    for exception in moving {
        let Some(rid) = exception.recurrence_id().cloned() else {
            continue;
        };
        let civil = express_in(master_start, &rid, &floating).civil().checked_add(delta)?;
        let new_rid = express_in(continuation_start, &master_start.with_civil(civil), &floating);

        let start = exception.start().map(|s| s.shifted(delta)).transpose()?;
        let end = exception.end().map(|e| e.shifted(delta)).transpose()?;
        let dtstamp = continuation
            .dtstamp()
            .or(exception.dtstamp())
            .cloned();
        let moved = exception
            .with_uid(continuation.uid())
            .with_recurrence_id(Some(new_rid.clone()))
            .with_start(start)
            .with_end(end)
            .with_dtstamp(dtstamp);

        store.replace_at(master.uid(), Some(&rid), moved);
        tracing::debug!(from = %master.uid(), to = %continuation.uid(), rid = %new_rid, "re-parented exception");
        log.push(Action::Reparented {
            from: master.uid().to_owned(),
            to: continuation.uid().to_owned(),
            recurrence_id: new_rid.to_string(),
        });
    }
    Ok(())
}
