// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Keep a calendar store consistent under iTIP scheduling messages.

mod config;
mod expand;
mod reconcile;
mod store;
mod uid;

pub use crate::config::{Config, ConfigError, DEFAULT_EXPANSION_LIMIT, DEFAULT_UID_DOMAIN};
pub use crate::expand::{ExpandError, OccurrenceExpander, RuleExpander, express_in};
pub use crate::reconcile::{Action, ReconcileError, Reconciler};
pub use crate::store::{CalendarStore, StoreQuery};
pub use crate::uid::continuation_uid;
