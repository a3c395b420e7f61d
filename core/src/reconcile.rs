// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of iTIP messages against a [`CalendarStore`].
//!
//! Each incoming component is classified by its identity:
//!
//! - no RECURRENCE-ID: the master, inserted or replacing the whole series;
//! - RECURRENCE-ID alone: one occurrence, replaced, inserted, removed or
//!   excluded;
//! - RECURRENCE-ID with `RANGE=THISANDFUTURE`: the series is split at that
//!   occurrence.
//!
//! Blocks are applied in order, each against the store left by the previous
//! one. A component that cannot be applied is reported in the log and the
//! rest of the message still goes through; changes made before a failure are
//! kept.

mod action;
mod reanchor;
mod split;

use std::cmp::Ordering;

use itipcal_ical::{
    DateTimeValue, EventComponent, Method, RecurrenceRange, parse_message,
};
use jiff::tz::TimeZone;

use crate::config::{Config, ConfigError};
use crate::expand::{ExpandError, OccurrenceExpander, RuleExpander, express_in};
use crate::store::CalendarStore;

pub use crate::reconcile::action::Action;

/// Errors that fail a single incoming component.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// No stored series produces the addressed occurrence
    #[error("no series of `{uid}` produces occurrence {recurrence_id}")]
    UnresolvableEdit {
        /// The incoming uid
        uid: String,
        /// The addressed occurrence
        recurrence_id: String,
    },

    /// The series has no DTSTART to anchor occurrences on
    #[error("series `{uid}` has no DTSTART")]
    MissingStart {
        /// The series uid
        uid: String,
    },

    /// Rule expansion failed
    #[error(transparent)]
    Expand(#[from] ExpandError),

    /// Date arithmetic left the supported range
    #[error("date arithmetic failed: {0}")]
    Time(#[from] jiff::Error),
}

impl ReconcileError {
    fn unresolvable(uid: &str, rid: &DateTimeValue) -> Self {
        Self::UnresolvableEdit {
            uid: uid.to_owned(),
            recurrence_id: rid.to_string(),
        }
    }
}

/// Applies scheduling messages to a store.
#[derive(Debug, Clone)]
pub struct Reconciler<E = RuleExpander> {
    expander: E,
    uid_domain: String,
}

impl Reconciler<RuleExpander> {
    /// Reconciler set up from configuration.
    ///
    /// # Errors
    /// If the configured zone is unknown.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            RuleExpander::from_config(config)?,
            config.uid_domain.clone(),
        ))
    }
}

impl<E: OccurrenceExpander> Reconciler<E> {
    /// Reconciler using `expander`, naming continuation series under
    /// `uid_domain`.
    #[must_use]
    pub fn new(expander: E, uid_domain: impl Into<String>) -> Self {
        Self {
            expander,
            uid_domain: uid_domain.into(),
        }
    }

    /// The expander used for occurrence identity.
    #[must_use]
    pub const fn expander(&self) -> &E {
        &self.expander
    }

    /// Parse `text` and apply its blocks in order.
    ///
    /// Malformed blocks and rejected components are reported as
    /// [`Action::Failed`] entries.
    #[tracing::instrument(skip_all, fields(len = text.len()))]
    pub fn apply_message(&self, store: &mut CalendarStore, text: &str) -> Vec<Action> {
        let mut log = Vec::new();
        for block in parse_message(text) {
            match block {
                Ok(block) => {
                    for err in &block.rejected {
                        log.push(Action::failed(None, None, err));
                    }
                    log.extend(self.apply(store, block.method, &block.components));
                }
                Err(err) => {
                    tracing::warn!(%err, "skipping malformed block");
                    log.push(Action::failed(None, None, &err));
                }
            }
        }
        log
    }

    /// Apply one block's components.
    ///
    /// Masters are applied before exception instances so that instances are
    /// checked against the revised series.
    #[tracing::instrument(skip(self, store, components), fields(count = components.len()))]
    pub fn apply(
        &self,
        store: &mut CalendarStore,
        method: Method,
        components: &[EventComponent],
    ) -> Vec<Action> {
        let mut log = Vec::new();
        if !matches!(method, Method::Publish | Method::Request | Method::Cancel) {
            for component in components {
                tracing::debug!(uid = %component.uid(), ?method, "method not reconciled");
                log.push(Action::Ignored {
                    uid: component.uid().to_owned(),
                    method: method.to_string(),
                    reason: "method is not reconciled".to_owned(),
                });
            }
            return log;
        }

        let cancel = method == Method::Cancel;
        let (masters, instances): (Vec<&EventComponent>, Vec<&EventComponent>) =
            components.iter().partition(|c| c.is_master());

        for component in masters.iter().chain(&instances) {
            for problem in component.problems() {
                tracing::debug!(uid = %component.uid(), %problem, "incoming component problem");
            }

            let result = match (component.recurrence_id(), component.range()) {
                (None, _) => self.apply_master(store, cancel, component, &instances, &mut log),
                (Some(rid), None) => self.apply_instance(store, cancel, component, rid, &mut log),
                (Some(rid), Some(RecurrenceRange::ThisAndFuture)) => {
                    self.apply_this_and_future(store, cancel, component, rid, &instances, &mut log)
                }
            };

            if let Err(err) = result {
                tracing::warn!(uid = %component.uid(), %err, "failed to apply component");
                log.push(Action::failed(
                    Some(component.uid()),
                    component.recurrence_id(),
                    &err,
                ));
            }
        }

        let duplicates = store.duplicate_identities();
        if !duplicates.is_empty() {
            tracing::error!(?duplicates, "store holds duplicate identities");
        }
        log
    }

    /// A component without RECURRENCE-ID.
    fn apply_master(
        &self,
        store: &mut CalendarStore,
        cancel: bool,
        component: &EventComponent,
        instances: &[&EventComponent],
        log: &mut Vec<Action>,
    ) -> Result<(), ReconcileError> {
        let uid = component.uid();
        if cancel {
            let removed = store.remove_series(uid);
            if removed.is_empty() {
                log.push(Action::Ignored {
                    uid: uid.to_owned(),
                    method: Method::Cancel.to_string(),
                    reason: "no stored series".to_owned(),
                });
            }
            for c in &removed {
                log.push(Action::removed(c.uid(), c.recurrence_id()));
            }
            return Ok(());
        }

        let incoming = component.clone().with_range(None);
        let Some(previous) = store.master(uid).cloned() else {
            store.insert(incoming);
            log.push(Action::inserted(uid, None));
            return Ok(());
        };

        if store.replace(incoming.clone()).is_ok() {
            log.push(Action::replaced(uid, None));
        }

        let same_block: Vec<&EventComponent> = instances
            .iter()
            .copied()
            .filter(|c| c.uid() == uid && c.range().is_none())
            .collect();
        reanchor::reanchor(store, &previous, &incoming, &same_block, log)?;
        self.prune_exceptions(store, &incoming, log)
    }

    /// Drop exceptions the revised master can no longer produce because its
    /// rule ends before them or is gone.
    fn prune_exceptions(
        &self,
        store: &mut CalendarStore,
        master: &EventComponent,
        log: &mut Vec<Action>,
    ) -> Result<(), ReconcileError> {
        let uid = master.uid();
        let floating = store.floating().clone();
        let stale: Vec<Option<DateTimeValue>> = match master.rrule() {
            None => store.exceptions(uid).map(|c| c.recurrence_id().cloned()).collect(),
            Some(rule) if rule.until().is_some() || rule.count().is_some() => {
                let Some(last) = self.expander.last_occurrence(master)? else {
                    return Ok(());
                };
                store
                    .exceptions(uid)
                    .filter_map(EventComponent::recurrence_id)
                    .filter(|rid| compare(rid, &last, &floating) == Ordering::Greater)
                    .map(|rid| Some(rid.clone()))
                    .collect()
            }
            Some(_) => Vec::new(),
        };

        for rid in stale {
            if store.remove(uid, rid.as_ref()).is_some() {
                tracing::debug!(uid = %uid, "removing exception outside the revised series");
                log.push(Action::removed(uid, rid.as_ref()));
            }
        }
        Ok(())
    }

    /// A component with RECURRENCE-ID and no RANGE.
    fn apply_instance(
        &self,
        store: &mut CalendarStore,
        cancel: bool,
        component: &EventComponent,
        rid: &DateTimeValue,
        log: &mut Vec<Action>,
    ) -> Result<(), ReconcileError> {
        let uid = component.uid();

        if cancel {
            if store.remove(uid, Some(rid)).is_some() {
                log.push(Action::removed(uid, Some(rid)));
                return Ok(());
            }
            return self.exclude_date(store, uid, rid, log);
        }

        if store.replace(component.clone()).is_ok() {
            log.push(Action::replaced(uid, Some(rid)));
            return Ok(());
        }

        let master = store
            .master(uid)
            .ok_or_else(|| ReconcileError::unresolvable(uid, rid))?;
        if !self.expander.produces(master, rid)? {
            return Err(ReconcileError::unresolvable(uid, rid));
        }
        store.insert(component.clone());
        log.push(Action::inserted(uid, Some(rid)));
        Ok(())
    }

    /// Add an EXDATE to the master, leaving its bounds alone.
    fn exclude_date(
        &self,
        store: &mut CalendarStore,
        uid: &str,
        rid: &DateTimeValue,
        log: &mut Vec<Action>,
    ) -> Result<(), ReconcileError> {
        let floating = store.floating().clone();
        let master = store
            .master(uid)
            .ok_or_else(|| ReconcileError::unresolvable(uid, rid))?;
        if !self.expander.produces(master, rid)? {
            return Err(ReconcileError::unresolvable(uid, rid));
        }

        if master
            .exception_dates()
            .iter()
            .any(|d| d.same_instant(rid, &floating))
        {
            log.push(Action::Ignored {
                uid: uid.to_owned(),
                method: Method::Cancel.to_string(),
                reason: format!("{rid} is already excluded"),
            });
            return Ok(());
        }

        let start = master.start().ok_or_else(|| ReconcileError::MissingStart {
            uid: uid.to_owned(),
        })?;
        let date = express_in(start, rid, &floating);
        let revised = master.clone().with_exception_date(date.clone());
        if store.replace(revised).is_ok() {
            log.push(Action::ExcludedDate {
                uid: uid.to_owned(),
                date: date.to_string(),
            });
        }
        Ok(())
    }

    /// A component with `RANGE=THISANDFUTURE`.
    fn apply_this_and_future(
        &self,
        store: &mut CalendarStore,
        cancel: bool,
        component: &EventComponent,
        split_point: &DateTimeValue,
        instances: &[&EventComponent],
        log: &mut Vec<Action>,
    ) -> Result<(), ReconcileError> {
        let series_uid = split::locate_series(&self.expander, store, component, split_point)?;
        let Some(master) = store.master(&series_uid).cloned() else {
            return Err(ReconcileError::unresolvable(component.uid(), split_point));
        };

        let Some(previous) = self.expander.last_before(&master, split_point)? else {
            // nothing remains before the split: the edit covers the whole series
            if cancel {
                for c in store.remove_series(&series_uid) {
                    log.push(Action::removed(c.uid(), c.recurrence_id()));
                }
                return Ok(());
            }
            let whole = component
                .clone()
                .with_uid(series_uid)
                .with_recurrence_id(None)
                .with_range(None);
            return self.apply_master(store, false, &whole, instances, log);
        };

        let truncated = split::truncate(&master, &previous, store.floating())?;
        let until = truncated
            .rrule()
            .and_then(|r| r.until())
            .map(ToString::to_string)
            .unwrap_or_default();
        if store.replace(truncated).is_ok() {
            log.push(Action::Truncated {
                uid: series_uid.clone(),
                until,
            });
        }

        if cancel {
            let floating = store.floating().clone();
            let doomed: Vec<DateTimeValue> = store
                .exceptions(&series_uid)
                .filter_map(EventComponent::recurrence_id)
                .filter(|rid| compare(rid, split_point, &floating) != Ordering::Less)
                .cloned()
                .collect();
            for rid in doomed {
                if store.remove(&series_uid, Some(&rid)).is_some() {
                    log.push(Action::removed(&series_uid, Some(&rid)));
                }
            }
            return Ok(());
        }

        let continuation_uid = match store.master(component.uid()) {
            None => component.uid().to_owned(),
            Some(_) => crate::uid::continuation_uid(jiff::Timestamp::now(), &self.uid_domain),
        };
        let continuation =
            split::continuation(component, &master, &continuation_uid, split_point, store.floating())?;
        store.insert(continuation.clone());
        log.push(Action::Split {
            uid: series_uid.clone(),
            continuation: continuation_uid.clone(),
            at: split_point.to_string(),
        });

        split::reparent(store, &master, &continuation, split_point, log)
    }
}

/// Order two values on the wall clock of `a`.
pub(crate) fn compare(a: &DateTimeValue, b: &DateTimeValue, floating: &TimeZone) -> Ordering {
    a.civil().cmp(&express_in(a, b, floating).civil())
}
