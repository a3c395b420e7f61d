// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Custom assertion helpers for integration tests.

use itipcal_core::{Action, CalendarStore};

/// Asserts that no two stored components share an identity.
///
/// # Panics
///
/// Panics listing the duplicated identities.
pub fn assert_unique_identities(store: &CalendarStore) {
    let duplicates = store.duplicate_identities();
    assert!(duplicates.is_empty(), "duplicate identities: {duplicates:?}");
}

/// Asserts that no log entry reports a failure.
///
/// # Panics
///
/// Panics showing the whole log.
pub fn assert_no_failures(log: &[Action]) {
    assert!(!log.iter().any(Action::is_failure), "unexpected failure in {log:#?}");
}

/// Recurrence ids of the stored exceptions of `uid`, in store order.
#[must_use]
pub fn exception_ids(store: &CalendarStore, uid: &str) -> Vec<String> {
    store
        .exceptions(uid)
        .filter_map(|c| c.recurrence_id())
        .map(ToString::to_string)
        .collect()
}
