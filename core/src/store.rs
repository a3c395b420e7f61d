// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use itipcal_ical::{DateTimeValue, EventComponent, same_recurrence_id};
use jiff::Timestamp;
use jiff::tz::TimeZone;

/// The calendar being edited, in insertion order.
///
/// Identity is the pair (uid, recurrence-id). The store does not enforce
/// uniqueness on its own; [`CalendarStore::duplicate_identities`] reports
/// violations.
#[derive(Debug, Clone)]
pub struct CalendarStore {
    components: Vec<EventComponent>,
    floating: TimeZone,
}

impl CalendarStore {
    /// An empty store. Floating values are resolved in `floating`.
    #[must_use]
    pub fn new(floating: TimeZone) -> Self {
        Self {
            components: Vec::new(),
            floating,
        }
    }

    /// The zone floating values are resolved in.
    #[must_use]
    pub const fn floating(&self) -> &TimeZone {
        &self.floating
    }

    /// Append a component.
    pub fn insert(&mut self, component: EventComponent) {
        self.components.push(component);
    }

    /// Swap the component with the same identity as `component`, keeping its
    /// position. Returns the previous component, or gives `component` back
    /// when nothing matches.
    ///
    /// # Errors
    /// Returns `component` unchanged if no stored component has its identity.
    pub fn replace(&mut self, component: EventComponent) -> Result<EventComponent, EventComponent> {
        match self.position(component.uid(), component.recurrence_id()) {
            Some(i) => Ok(std::mem::replace(&mut self.components[i], component)),
            None => Err(component),
        }
    }

    /// Replace the component at `(uid, rid)` with `component`, whose identity
    /// may differ. Returns the previous component.
    pub fn replace_at(
        &mut self,
        uid: &str,
        rid: Option<&DateTimeValue>,
        component: EventComponent,
    ) -> Option<EventComponent> {
        let i = self.position(uid, rid)?;
        Some(std::mem::replace(&mut self.components[i], component))
    }

    /// Remove and return the component at `(uid, rid)`.
    pub fn remove(&mut self, uid: &str, rid: Option<&DateTimeValue>) -> Option<EventComponent> {
        let i = self.position(uid, rid)?;
        Some(self.components.remove(i))
    }

    /// Remove every component of a series, returning them in store order.
    pub fn remove_series(&mut self, uid: &str) -> Vec<EventComponent> {
        let (removed, kept) = std::mem::take(&mut self.components)
            .into_iter()
            .partition(|c| c.uid() == uid);
        self.components = kept;
        removed
    }

    /// The component at `(uid, rid)`.
    #[must_use]
    pub fn get(&self, uid: &str, rid: Option<&DateTimeValue>) -> Option<&EventComponent> {
        self.position(uid, rid).map(|i| &self.components[i])
    }

    /// The master of a series.
    #[must_use]
    pub fn master(&self, uid: &str) -> Option<&EventComponent> {
        self.get(uid, None)
    }

    /// All components sharing `uid`, in store order.
    pub fn series<'a>(&'a self, uid: &'a str) -> impl Iterator<Item = &'a EventComponent> {
        self.components.iter().filter(move |c| c.uid() == uid)
    }

    /// Exception instances of a series, in store order.
    pub fn exceptions<'a>(&'a self, uid: &'a str) -> impl Iterator<Item = &'a EventComponent> {
        self.series(uid).filter(|c| !c.is_master())
    }

    /// Masters whose RELATED-TO names `uid`.
    pub fn related_to<'a>(&'a self, uid: &'a str) -> impl Iterator<Item = &'a EventComponent> {
        self.components
            .iter()
            .filter(move |c| c.is_master() && c.related_to().iter().any(|r| r == uid))
    }

    /// All components in store order.
    pub fn iter(&self) -> impl Iterator<Item = &EventComponent> {
        self.components.iter()
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Identities held by more than one component, as (uid, recurrence-id).
    #[must_use]
    pub fn duplicate_identities(&self) -> Vec<(String, Option<DateTimeValue>)> {
        let mut duplicates: Vec<(String, Option<DateTimeValue>)> = Vec::new();
        for (i, a) in self.components.iter().enumerate() {
            let seen_later = self.components[i + 1..]
                .iter()
                .any(|b| a.matches(b, &self.floating));
            let reported = duplicates.iter().any(|(uid, rid)| {
                uid == a.uid() && same_recurrence_id(rid.as_ref(), a.recurrence_id(), &self.floating)
            });
            if seen_later && !reported {
                duplicates.push((a.uid().to_owned(), a.recurrence_id().cloned()));
            }
        }
        duplicates
    }

    /// Components matching `query`, sorted by start instant.
    ///
    /// Ties keep insertion order; components without a start sort last.
    #[must_use]
    pub fn enumerate(&self, query: &StoreQuery) -> Vec<&EventComponent> {
        let mut found: Vec<(Option<Timestamp>, &EventComponent)> = self
            .components
            .iter()
            .filter(|c| query.uid.as_deref().is_none_or(|uid| c.uid() == uid))
            .map(|c| (self.start_instant(c), c))
            .filter(|(start, _)| query.contains(*start))
            .collect();
        found.sort_by_key(|(start, _)| (start.is_none(), *start));
        found.into_iter().map(|(_, c)| c).collect()
    }

    fn start_instant(&self, component: &EventComponent) -> Option<Timestamp> {
        component
            .start()
            .and_then(|start| start.to_timestamp(&self.floating).ok())
    }

    fn position(&self, uid: &str, rid: Option<&DateTimeValue>) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.uid() == uid && same_recurrence_id(c.recurrence_id(), rid, &self.floating))
    }
}

impl<'a> IntoIterator for &'a CalendarStore {
    type Item = &'a EventComponent;
    type IntoIter = std::slice::Iter<'a, EventComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

/// Filter for [`CalendarStore::enumerate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    /// Only components of this series
    pub uid: Option<String>,

    /// Only components starting at or after this instant
    pub start_from: Option<Timestamp>,

    /// Only components starting before this instant
    pub start_before: Option<Timestamp>,
}

impl StoreQuery {
    /// Every component.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one series.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Restrict to starts in `[from, before)`.
    #[must_use]
    pub fn with_window(mut self, from: Timestamp, before: Timestamp) -> Self {
        self.start_from = Some(from);
        self.start_before = Some(before);
        self
    }

    fn contains(&self, start: Option<Timestamp>) -> bool {
        if self.start_from.is_none() && self.start_before.is_none() {
            return true;
        }
        let Some(start) = start else {
            return false;
        };
        self.start_from.is_none_or(|from| start >= from)
            && self.start_before.is_none_or(|before| start < before)
    }
}
