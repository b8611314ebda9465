//! Monthly planned-versus-completed aggregation.

use chrono::Duration;
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use crate::models::{Member, MemberCount, MemberSummary, Task};
use crate::recurrence::RuleExpander;
use crate::window::MonthWindow;

/// Number of task occurrences that should have happened in `month`.
///
/// Soft-deleted tasks are included up to their deletion instant, so months
/// before a deletion keep their planned count.
pub fn count_planned(tasks: &[Task], month: &MonthWindow, limit: u16) -> u64 {
    tasks
        .iter()
        .map(|task| planned_for_task(task, month, limit))
        .sum()
}

fn planned_for_task(task: &Task, month: &MonthWindow, limit: u16) -> u64 {
    if task.deleted_before(month.start) {
        return 0;
    }
    let anchor = task.anchor();
    if anchor > month.end {
        return 0;
    }

    // The deletion instant itself no longer produces an occurrence
    let end = match task.deleted_at {
        Some(deleted_at) if month.contains(deleted_at) => deleted_at - Duration::nanoseconds(1),
        _ => month.end,
    };

    match &task.rrule {
        Some(rule) => match RuleExpander::new(anchor, rule) {
            Ok(expander) => expander.with_limit(limit).count_between(month.start, end) as u64,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Not counting task with malformed rule");
                0
            }
        },
        None if month.contains_date(task.start_date) && anchor <= end => 1,
        None => 0,
    }
}

/// Joins per-member counts onto the member list so that every member
/// appears, with zero when they completed nothing.
pub fn member_summaries(members: &[Member], counts: &[MemberCount]) -> Vec<MemberSummary> {
    let by_member: HashMap<Uuid, i64> = counts.iter().map(|c| (c.member_id, c.completed)).collect();

    members
        .iter()
        .map(|member| MemberSummary {
            member_id: member.id,
            display_name: member.display_name.clone(),
            completed: by_member
                .get(&member.id)
                .copied()
                .unwrap_or(0)
                .max(0) as u64,
        })
        .collect()
}
