// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use itipcal_ical::DateTimeValue;

/// One entry of the reconciliation log.
///
/// Recurrence ids and dates are kept in their iCalendar text form so the log
/// can be serialized as is.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// A component was added to the store
    Inserted {
        /// Series uid
        uid: String,
        /// Recurrence id, absent for a master
        recurrence_id: Option<String>,
    },

    /// A stored component's content was swapped
    Replaced {
        /// Series uid
        uid: String,
        /// Recurrence id, absent for a master
        recurrence_id: Option<String>,
    },

    /// A component was deleted
    Removed {
        /// Series uid
        uid: String,
        /// Recurrence id, absent for a master
        recurrence_id: Option<String>,
    },

    /// An occurrence was excluded with an EXDATE
    ExcludedDate {
        /// Series uid
        uid: String,
        /// The excluded instant
        date: String,
    },

    /// A series' rule was bounded with UNTIL
    Truncated {
        /// Series uid
        uid: String,
        /// The new UNTIL
        until: String,
    },

    /// A continuation series was split off
    Split {
        /// The truncated series
        uid: String,
        /// The new series
        continuation: String,
        /// The split point
        at: String,
    },

    /// An exception moved to a continuation series
    Reparented {
        /// Previous series uid
        from: String,
        /// New series uid
        to: String,
        /// Recurrence id in the new series
        recurrence_id: String,
    },

    /// An exception's recurrence id was rewritten after an edit of the whole
    /// series
    Reanchored {
        /// Series uid
        uid: String,
        /// Previous recurrence id
        from: String,
        /// New recurrence id
        to: String,
    },

    /// An exception could not be re-anchored unambiguously and was kept
    Ambiguous {
        /// Series uid
        uid: String,
        /// Recurrence id left in place
        recurrence_id: String,
        /// Why no single target was chosen
        reason: String,
    },

    /// A component that required no change or that the method does not
    /// reconcile
    Ignored {
        /// Series uid
        uid: String,
        /// The block's method
        method: String,
        /// Why nothing was done
        reason: String,
    },

    /// A component or block could not be applied
    Failed {
        /// Series uid, when known
        uid: Option<String>,
        /// Recurrence id, when known
        recurrence_id: Option<String>,
        /// The error
        reason: String,
    },
}

impl Action {
    /// Whether this entry reports a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub(crate) fn inserted(uid: &str, rid: Option<&DateTimeValue>) -> Self {
        Self::Inserted {
            uid: uid.to_owned(),
            recurrence_id: rid.map(ToString::to_string),
        }
    }

    pub(crate) fn replaced(uid: &str, rid: Option<&DateTimeValue>) -> Self {
        Self::Replaced {
            uid: uid.to_owned(),
            recurrence_id: rid.map(ToString::to_string),
        }
    }

    pub(crate) fn removed(uid: &str, rid: Option<&DateTimeValue>) -> Self {
        Self::Removed {
            uid: uid.to_owned(),
            recurrence_id: rid.map(ToString::to_string),
        }
    }

    pub(crate) fn failed(uid: Option<&str>, rid: Option<&DateTimeValue>, reason: impl ToString) -> Self {
        Self::Failed {
            uid: uid.map(ToOwned::to_owned),
            recurrence_id: rid.map(ToString::to_string),
            reason: reason.to_string(),
        }
    }
}
