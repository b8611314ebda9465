//! The occurrence engine: loads definitions and overlays through a
//! [`Repository`] and computes occurrences from that snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{
    CalendarEvent, Completion, Couple, DayTask, EventException, EventOccurrence, MemberSummary,
    MonthlySummary, NewCompletion, NewEventException, NewTaskException, Task, TaskException,
};
use crate::overlay::{EventExceptionSet, TaskOverlayIndex};
use crate::recurrence::DEFAULT_EXPANSION_LIMIT;
use crate::repository::Repository;
use crate::window::{end_of_day, start_of_day, DayWindow, MonthWindow};

pub mod calendar;
pub mod day;
pub mod summary;

pub use calendar::materialize_events;
pub use day::resolve_day;
pub use summary::{count_planned, member_summaries};

/// Tuning knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Cap on instants produced by one rule expansion
    pub expansion_limit: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expansion_limit: DEFAULT_EXPANSION_LIMIT,
        }
    }
}

/// Stateless query and mutation surface over a repository.
///
/// Every call loads its own snapshot; nothing is cached between calls.
pub struct OccurrenceEngine<R: Repository> {
    repo: R,
    config: EngineConfig,
}

impl<R: Repository> OccurrenceEngine<R> {
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, EngineConfig::default())
    }

    pub fn with_config(repo: R, config: EngineConfig) -> Self {
        Self { repo, config }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Calendar occurrences from the start of `start_date` to the end of
    /// `end_date`, both inclusive.
    pub async fn get_occurrences(
        &self,
        couple_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<EventOccurrence>, CoreError> {
        if end_date < start_date {
            return Err(CoreError::InvalidInput(format!(
                "End date {} is before start date {}",
                end_date, start_date
            )));
        }
        self.require_couple(couple_id).await?;

        let range_start = start_of_day(start_date);
        let range_end = end_of_day(end_date);

        let events = self.repo.find_events(couple_id).await?;
        let exceptions = self
            .repo
            .find_event_exceptions_in_range(couple_id, range_start, range_end)
            .await?;
        let exception_set = EventExceptionSet::new(&exceptions);

        debug!(
            %couple_id,
            %range_start,
            %range_end,
            events = events.len(),
            exceptions = exception_set.len(),
            "Materializing calendar"
        );

        Ok(materialize_events(
            &events,
            &exception_set,
            range_start,
            range_end,
            self.config.expansion_limit,
        ))
    }

    /// Tasks due on `date`, each with its exception or completion.
    pub async fn get_tasks_for_day(&self, couple_id: Uuid, date: NaiveDate) -> Result<Vec<DayTask>, CoreError> {
        self.require_couple(couple_id).await?;

        let window = DayWindow::of(date);
        let tasks = self.repo.find_tasks_active_at(couple_id, window.start).await?;
        let exceptions = self.repo.find_task_exceptions_for_day(couple_id, date).await?;
        let completions = self.repo.find_completions_for_day(couple_id, date).await?;

        debug!(%couple_id, %date, tasks = tasks.len(), "Resolving day");

        let overlays = TaskOverlayIndex::new(exceptions, completions);
        Ok(resolve_day(&tasks, &overlays, date, self.config.expansion_limit))
    }

    /// Planned versus completed occurrences for one month.
    ///
    /// # Arguments
    /// * `year` - 2000 to 2100
    /// * `month` - 1 to 12
    ///
    /// # Returns
    /// * Totals plus one entry per member of the couple, zero counts included
    pub async fn get_monthly_summary(&self, couple_id: Uuid, year: i32, month: u32) -> Result<MonthlySummary, CoreError> {
        let window = MonthWindow::for_summary(year, month)?;
        self.require_couple(couple_id).await?;

        let tasks = self.repo.find_all_tasks(couple_id).await?;
        let total_planned = count_planned(&tasks, &window, self.config.expansion_limit);

        let counts = self.repo.summarize_by_month(couple_id, &window).await?;
        let members = self.repo.list_members(couple_id).await?;
        let members = member_summaries(&members, &counts);
        let total_completed = counts.iter().map(|c| c.completed.max(0) as u64).sum();

        Ok(MonthlySummary {
            year,
            month,
            total_planned,
            total_completed,
            members,
        })
    }

    /// All-time completions per member.
    pub async fn get_member_stats(&self, couple_id: Uuid) -> Result<Vec<MemberSummary>, CoreError> {
        self.require_couple(couple_id).await?;
        let counts = self.repo.summarize_all_time(couple_id).await?;
        let members = self.repo.list_members(couple_id).await?;
        Ok(member_summaries(&members, &counts))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Marks the occurrence of `task_id` due on `due_date` as done by `actor_id`.
    pub async fn complete_task(
        &self,
        couple_id: Uuid,
        actor_id: Uuid,
        task_id: Uuid,
        due_date: NaiveDate,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Completion, CoreError> {
        self.require_member(couple_id, actor_id).await?;
        self.owned_task(couple_id, task_id).await?;

        self.repo
            .add_completion(NewCompletion {
                task_id,
                due_date,
                completed_by: actor_id,
                completed_at,
            })
            .await
    }

    pub async fn undo_completion(&self, couple_id: Uuid, actor_id: Uuid, completion_id: Uuid) -> Result<(), CoreError> {
        self.require_member(couple_id, actor_id).await?;
        self.repo.remove_completion(couple_id, completion_id).await
    }

    /// Cancels one task occurrence, dropping its completion if there was one.
    pub async fn skip_task_occurrence(
        &self,
        couple_id: Uuid,
        actor_id: Uuid,
        task_id: Uuid,
        date: NaiveDate,
    ) -> Result<TaskException, CoreError> {
        self.require_member(couple_id, actor_id).await?;
        self.owned_task(couple_id, task_id).await?;

        self.repo
            .add_task_exception(NewTaskException {
                task_id,
                exception_date: date,
                created_by: actor_id,
            })
            .await
    }

    pub async fn restore_task_occurrence(&self, couple_id: Uuid, actor_id: Uuid, exception_id: Uuid) -> Result<(), CoreError> {
        self.require_member(couple_id, actor_id).await?;
        self.repo.remove_task_exception(couple_id, exception_id).await
    }

    /// Cancels the occurrence of `event_id` starting at `instant`.
    pub async fn skip_event_occurrence(
        &self,
        couple_id: Uuid,
        actor_id: Uuid,
        event_id: Uuid,
        instant: DateTime<Utc>,
    ) -> Result<EventException, CoreError> {
        self.require_member(couple_id, actor_id).await?;
        self.owned_event(couple_id, event_id).await?;

        self.repo
            .add_event_exception(NewEventException {
                event_id,
                exception_at: instant,
                created_by: actor_id,
            })
            .await
    }

    pub async fn restore_event_occurrence(&self, couple_id: Uuid, actor_id: Uuid, exception_id: Uuid) -> Result<(), CoreError> {
        self.require_member(couple_id, actor_id).await?;
        self.repo.remove_event_exception(couple_id, exception_id).await
    }

    // ========================================================================
    // Ownership checks
    // ========================================================================

    async fn require_couple(&self, couple_id: Uuid) -> Result<Couple, CoreError> {
        self.repo
            .find_couple_by_id(couple_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Couple with id {} not found", couple_id)))
    }

    async fn require_member(&self, couple_id: Uuid, actor_id: Uuid) -> Result<(), CoreError> {
        self.require_couple(couple_id).await?;
        match self.repo.find_member_by_id(actor_id).await? {
            Some(member) if member.couple_id == couple_id => Ok(()),
            _ => Err(CoreError::Unauthorized(format!(
                "Member {} does not belong to couple {}",
                actor_id, couple_id
            ))),
        }
    }

    async fn owned_task(&self, couple_id: Uuid, task_id: Uuid) -> Result<Task, CoreError> {
        let task = self
            .repo
            .find_task_by_id(task_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", task_id)))?;
        if task.couple_id != couple_id {
            return Err(CoreError::Unauthorized(format!(
                "Task {} does not belong to couple {}",
                task_id, couple_id
            )));
        }
        Ok(task)
    }

    async fn owned_event(&self, couple_id: Uuid, event_id: Uuid) -> Result<CalendarEvent, CoreError> {
        let event = self
            .repo
            .find_event_by_id(event_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Event with id {} not found", event_id)))?;
        if event.couple_id != couple_id {
            return Err(CoreError::Unauthorized(format!(
                "Event {} does not belong to couple {}",
                event_id, couple_id
            )));
        }
        Ok(event)
    }
}
