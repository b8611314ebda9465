//! Point form of the engine: which tasks are due on one day.

use chrono::NaiveDate;
use tracing::warn;

use crate::models::{DayTask, Task};
use crate::overlay::TaskOverlayIndex;
use crate::recurrence::RuleExpander;
use crate::window::DayWindow;

/// Resolves the tasks due on `date`, each with at most one overlay.
///
/// A task deleted during `date` is still due if its occurrence falls strictly
/// before the deletion instant. The result is ordered by title, then id.
pub fn resolve_day(
    tasks: &[Task],
    overlays: &TaskOverlayIndex,
    date: NaiveDate,
    limit: u16,
) -> Vec<DayTask> {
    let day = DayWindow::of(date);

    let mut due: Vec<DayTask> = tasks
        .iter()
        .filter(|task| is_due(task, &day, limit))
        .map(|task| DayTask {
            task: task.clone(),
            date,
            overlay: overlays.overlay_for(task.id, date),
        })
        .collect();

    due.sort_by(|a, b| a.task.title.cmp(&b.task.title).then_with(|| a.task.id.cmp(&b.task.id)));
    due
}

fn is_due(task: &Task, day: &DayWindow, limit: u16) -> bool {
    if task.start_date > day.date {
        return false;
    }

    let window = match task.deleted_at {
        Some(deleted_at) => match day.clipped_at(deleted_at) {
            Some(window) => window,
            None => return false,
        },
        None => *day,
    };

    match &task.rrule {
        Some(rule) => match RuleExpander::new(task.anchor(), rule) {
            Ok(expander) => expander.with_limit(limit).has_occurrence_within(&window),
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "Skipping task with malformed rule");
                false
            }
        },
        None => task.start_date == day.date,
    }
}
