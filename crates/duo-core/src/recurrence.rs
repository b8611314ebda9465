use chrono::{DateTime, Duration, Timelike, Utc};
use rrule::{RRuleSet, Tz as RRuleTz};
use tracing::warn;

use crate::error::CoreError;
use crate::window::DayWindow;

/// Upper bound on instants produced by a single expansion.
pub const DEFAULT_EXPANSION_LIMIT: u16 = 5000;

/// Truncates an instant to the start of its UTC minute.
///
/// Rule expansion can carry sub-minute drift; every instant leaving the
/// expander, and every instant compared against an exception, goes through
/// here.
#[inline]
pub fn normalize_to_minute(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .unwrap_or(instant)
}

/// RuleExpander: RFC 5545 recurrence evaluation anchored at a definition's start.
///
/// Responsibilities:
/// 1. Parse the RRULE once, with the anchor serialized as a UTC `DTSTART`
/// 2. Produce every occurrence inside a closed UTC range
/// 3. Answer whether any occurrence falls inside a single day
///
/// Both ends of every range are inclusive, for point and range queries alike.
#[derive(Debug, Clone)]
pub struct RuleExpander {
    anchor: DateTime<Utc>,
    rrule_set: RRuleSet,
    limit: u16,
}

impl RuleExpander {
    /// Creates a new RuleExpander for `rule` anchored at `anchor`.
    ///
    /// # Arguments
    /// * `anchor` - The definition's first due instant, used as `DTSTART`
    /// * `rule` - RRULE value text, e.g. `FREQ=WEEKLY;BYDAY=MO`
    ///
    /// # Returns
    /// * `Result<Self, CoreError>` - the expander, or `InvalidRRule` if the
    ///   rule does not parse
    pub fn new(anchor: DateTime<Utc>, rule: &str) -> Result<Self, CoreError> {
        let rule = rule.trim();
        let rule = rule.strip_prefix("RRULE:").unwrap_or(rule);

        if rule.is_empty() {
            return Err(CoreError::InvalidRRule("Recurrence rule is empty".to_string()));
        }
        if rule.contains("DTSTART") || rule.contains('\n') {
            return Err(CoreError::InvalidRRule(format!(
                "Recurrence rule must be a single RRULE value without DTSTART: '{}'",
                rule
            )));
        }

        let rrule_string = format!("DTSTART:{}\nRRULE:{}", anchor.format("%Y%m%dT%H%M%SZ"), rule);

        let rrule_set = rrule_string.parse::<RRuleSet>().map_err(|e| {
            CoreError::InvalidRRule(format!("Failed to parse RRULE '{}': {}", rule, e))
        })?;

        Ok(Self {
            anchor,
            rrule_set,
            limit: DEFAULT_EXPANSION_LIMIT,
        })
    }

    /// Caps the number of instants a single expansion may produce.
    pub fn with_limit(mut self, limit: u16) -> Self {
        self.limit = limit.max(1);
        self
    }

    /// Checks that `rule` parses when anchored at `anchor`.
    pub fn validate(anchor: DateTime<Utc>, rule: &str) -> Result<(), CoreError> {
        Self::new(anchor, rule).map(|_| ())
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    /// Every occurrence in `[start, end]`, ascending, whole-minute, deduplicated.
    ///
    /// # Behavior
    /// - Widen the bounds by one second before asking the rule set, so the
    ///   result does not depend on whether the grammar's bounds are exclusive
    /// - Filter back to the closed range on the raw instants
    /// - Normalize to whole minutes and drop duplicates created by normalizing
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if end < start {
            return Vec::new();
        }

        let raw = self.raw_between(start, end, self.limit);
        if raw.len() >= self.limit as usize {
            warn!(
                anchor = %self.anchor,
                limit = self.limit,
                "Recurrence expansion hit its limit; later occurrences are dropped"
            );
        }

        let mut occurrences: Vec<DateTime<Utc>> = raw
            .into_iter()
            .filter(|dt| start <= *dt && *dt <= end)
            .map(normalize_to_minute)
            .collect();
        occurrences.dedup();
        occurrences
    }

    /// Number of occurrences in `[start, end]`.
    pub fn count_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
        self.between(start, end).len()
    }

    /// Whether any occurrence falls inside `[start, end]`.
    pub fn has_occurrence_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        if end < start {
            return false;
        }
        // At most one instant can sit in the one-second widening before `start`
        self.raw_between(start, end, 2)
            .into_iter()
            .any(|dt| start <= dt && dt <= end)
    }

    /// Whether any occurrence falls on the day of `window`.
    #[inline]
    pub fn has_occurrence_within(&self, window: &DayWindow) -> bool {
        self.has_occurrence_between(window.start, window.end)
    }

    fn raw_between(&self, start: DateTime<Utc>, end: DateTime<Utc>, limit: u16) -> Vec<DateTime<Utc>> {
        let after = (start - Duration::seconds(1)).with_timezone(&RRuleTz::UTC);
        let before = (end + Duration::seconds(1)).with_timezone(&RRuleTz::UTC);

        let bounded_rrule = self.rrule_set.clone().after(after).before(before);
        let (occurrences_vec, _) = bounded_rrule.all(limit);

        occurrences_vec
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc))
            .collect()
    }
}
