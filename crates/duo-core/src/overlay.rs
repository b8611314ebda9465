//! In-memory lookups over exception and completion rows.
//!
//! Built once per query from a bulk load so that per-occurrence checks are
//! O(1) instead of one store round-trip each.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::models::{CompletionDetail, EventException, Overlay, TaskException};
use crate::recurrence::normalize_to_minute;

/// Cancelled event occurrences, keyed by `(event_id, whole-minute instant)`.
#[derive(Debug, Default, Clone)]
pub struct EventExceptionSet {
    keys: HashSet<(Uuid, DateTime<Utc>)>,
}

impl EventExceptionSet {
    pub fn new(exceptions: &[EventException]) -> Self {
        exceptions.iter().map(|ex| (ex.event_id, ex.exception_at)).collect()
    }

    pub fn is_excepted(&self, event_id: Uuid, instant: DateTime<Utc>) -> bool {
        self.keys.contains(&(event_id, normalize_to_minute(instant)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(Uuid, DateTime<Utc>)> for EventExceptionSet {
    fn from_iter<I: IntoIterator<Item = (Uuid, DateTime<Utc>)>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|(event_id, instant)| (event_id, normalize_to_minute(instant)))
                .collect(),
        }
    }
}

/// Exceptions and completions for task occurrences, keyed by `(task_id, date)`.
#[derive(Debug, Default, Clone)]
pub struct TaskOverlayIndex {
    exceptions: HashMap<(Uuid, NaiveDate), TaskException>,
    completions: HashMap<(Uuid, NaiveDate), CompletionDetail>,
}

impl TaskOverlayIndex {
    pub fn new(exceptions: Vec<TaskException>, completions: Vec<CompletionDetail>) -> Self {
        let mut index = Self {
            exceptions: HashMap::with_capacity(exceptions.len()),
            completions: HashMap::with_capacity(completions.len()),
        };
        for ex in exceptions {
            index.exceptions.insert((ex.task_id, ex.exception_date), ex);
        }
        for completion in completions {
            index
                .completions
                .insert((completion.task_id, completion.due_date), completion);
        }
        index
    }

    /// The single overlay shown for an occurrence: the exception if any,
    /// otherwise the completion if any.
    pub fn overlay_for(&self, task_id: Uuid, date: NaiveDate) -> Overlay {
        if let Some(exception) = self.exceptions.get(&(task_id, date)) {
            return Overlay::Exception(exception.clone());
        }
        match self.completions.get(&(task_id, date)) {
            Some(completion) => Overlay::Completion(completion.clone()),
            None => Overlay::None,
        }
    }
}
