//! Range form of the engine: calendar events between two instants.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

use crate::models::{CalendarEvent, EventOccurrence};
use crate::overlay::EventExceptionSet;
use crate::recurrence::{normalize_to_minute, RuleExpander};

/// Flattens event definitions into concrete occurrences inside `[range_start, range_end]`.
///
/// # Arguments
/// * `events` - Every event definition of the couple, undated
/// * `exceptions` - Cancelled `(event_id, instant)` pairs for the range
/// * `range_start`, `range_end` - Inclusive UTC bounds
/// * `limit` - Cap on instants expanded per definition
///
/// # Returns
/// * Occurrences sorted by `(occurrence_start, event_id)`, each pair at most once
///
/// # Behavior
/// - Every occurrence lasts as long as its definition
/// - A definition without a rule yields its own start, if in range
/// - A stored rule that no longer parses is logged and skipped
pub fn materialize_events(
    events: &[CalendarEvent],
    exceptions: &EventExceptionSet,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    limit: u16,
) -> Vec<EventOccurrence> {
    let mut seen: HashSet<(Uuid, DateTime<Utc>)> = HashSet::new();
    let mut occurrences = Vec::new();

    for event in events {
        let duration = event.duration();

        let instants = match &event.rrule {
            Some(rule) => match RuleExpander::new(event.starts_at, rule) {
                Ok(expander) => expander.with_limit(limit).between(range_start, range_end),
                Err(e) => {
                    warn!(event_id = %event.id, error = %e, "Skipping event with malformed rule");
                    continue;
                }
            },
            None => {
                let start = normalize_to_minute(event.starts_at);
                if range_start <= start && start <= range_end {
                    vec![start]
                } else {
                    Vec::new()
                }
            }
        };

        for instant in instants {
            if exceptions.is_excepted(event.id, instant) || !seen.insert((event.id, instant)) {
                continue;
            }
            occurrences.push(EventOccurrence {
                event: event.clone(),
                occurrence_start: instant,
                occurrence_end: instant + duration,
            });
        }
    }

    occurrences.sort_by(|a, b| {
        a.occurrence_start
            .cmp(&b.occurrence_start)
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
    occurrences
}
