// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Re-anchoring of stored exceptions after the master's DTSTART or rule
//! changed, so that revised instances sent in the same block replace them
//! instead of piling up next to them.

use itipcal_ical::{DateTimeValue, EventComponent};

use crate::expand::express_in;
use crate::reconcile::{Action, ReconcileError};
use crate::store::CalendarStore;

/// Move stored exceptions of `incoming`'s series onto the recurrence ids of
/// `instances` that they were revised into.
///
/// Each stored exception is paired with at most one incoming id:
///
/// 1. its id shifted by the DTSTART move, if that lands on exactly one
///    incoming id;
/// 2. with an unchanged rule, the single incoming id on the same local day.
///
/// Exceptions whose target is unclear, or already taken in the store, are
/// left alone and reported as [`Action::Ambiguous`].
pub(super) fn reanchor(
    store: &mut CalendarStore,
    previous: &EventComponent,
    incoming: &EventComponent,
    instances: &[&EventComponent],
    log: &mut Vec<Action>,
) -> Result<(), ReconcileError> {
    if instances.is_empty() {
        return Ok(());
    }
    let floating = store.floating().clone();
    let uid = incoming.uid();

    let targets: Vec<&DateTimeValue> = instances
        .iter()
        .filter_map(|c| c.recurrence_id())
        .collect();
    let mut claimed = vec![false; targets.len()];

    let stored: Vec<DateTimeValue> = store
        .exceptions(uid)
        .filter_map(EventComponent::recurrence_id)
        .filter(|rid| !targets.iter().any(|t| t.same_instant(rid, &floating)))
        .cloned()
        .collect();

    let delta = match (previous.start(), incoming.start()) {
        (Some(old), Some(new)) => {
            let moved = express_in(old, new, &floating);
            Some(moved.civil().duration_since(old.civil()))
        }
        _ => None,
    }
    .filter(|d| !d.is_zero());

    let same_pattern = match (previous.rrule(), incoming.rrule()) {
        (Some(a), Some(b)) => a.same_pattern(b),
        (None, None) => true,
        _ => false,
    };

    for rid in stored {
        let mut target = None;
        if let Some(delta) = delta {
            let shifted = rid.shifted(delta)?;
            let hits = unclaimed(&targets, &claimed, |t| t.same_instant(&shifted, &floating));
            if let [i] = hits[..] {
                target = Some(i);
            }
        }

        if target.is_none() {
            let day = rid.date();
            let hits = unclaimed(&targets, &claimed, |t| {
                express_in(&rid, t, &floating).date() == day
            });
            match hits[..] {
                [] => continue,
                [i] if same_pattern => target = Some(i),
                _ => {
                    ambiguous(log, uid, &rid, same_pattern, hits.len());
                    continue;
                }
            }
        }

        let Some(i) = target else { continue };
        let Some(&to) = targets.get(i) else { continue };
        if store.get(uid, Some(to)).is_some() {
            log.push(Action::Ambiguous {
                uid: uid.to_owned(),
                recurrence_id: rid.to_string(),
                reason: format!("{to} is already stored"),
            });
            continue;
        }

        let Some(exception) = store.get(uid, Some(&rid)).cloned() else {
            continue;
        };
        if let Some(slot) = claimed.get_mut(i) {
            *slot = true;
        }
        store.replace_at(
            uid,
            Some(&rid),
            exception.with_recurrence_id(Some(to.clone())),
        );
        tracing::debug!(uid = %uid, from = %rid, to = %to, "re-anchored exception");
        log.push(Action::Reanchored {
            uid: uid.to_owned(),
            from: rid.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

fn unclaimed(
    targets: &[&DateTimeValue],
    claimed: &[bool],
    pred: impl Fn(&DateTimeValue) -> bool,
) -> Vec<usize> {
    targets
        .iter()
        .zip(claimed)
        .enumerate()
        .filter_map(|(i, (&t, &taken))| (!taken && pred(t)).then_some(i))
        .collect()
}

fn ambiguous(log: &mut Vec<Action>, uid: &str, rid: &DateTimeValue, same_pattern: bool, hits: usize) {
    let reason = if same_pattern {
        format!("{hits} revised instances fall on the same day")
    } else {
        "the recurrence rule changed".to_owned()
    };
    tracing::warn!(uid = %uid, rid = %rid, %reason, "cannot re-anchor exception");
    log.push(Action::Ambiguous {
        uid: uid.to_owned(),
        recurrence_id: rid.to_string(),
        reason,
    });
}
