//! Append-only event log with single-slot deduplication.
//!
//! A candidate is dropped when its kind equals the kind of the most
//! recently appended event. Anything else is appended, so the same kind
//! reappears after a different one intervenes.

use serde::{Deserialize, Serialize};

use crate::events::Event;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless it repeats the last entry's kind. Returns whether it was kept.
    pub fn append(&mut self, event: Event) -> bool {
        if self.last().is_some_and(|last| last.kind == event.kind) {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Chronological copy of the current contents.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
