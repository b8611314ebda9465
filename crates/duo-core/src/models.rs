use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Couples and Members
// ============================================================================

/// The owning group of every definition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Couple {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An actor belonging to a couple.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Member {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Definitions
// ============================================================================

/// A recurring (or one-off) household task.
///
/// The anchor is `start_date` at 00:00:00 UTC. A task without `rrule` has
/// exactly one occurrence, on `start_date`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub rrule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft deletion. Occurrences at or after this instant are no longer generated.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// The rule anchor: midnight UTC of the start date.
    pub fn anchor(&self) -> DateTime<Utc> {
        crate::window::start_of_day(self.start_date)
    }

    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }

    /// True if the task was soft-deleted at or before `instant`, so it
    /// generates nothing from `instant` on.
    pub fn deleted_before(&self, instant: DateTime<Utc>) -> bool {
        self.deleted_at.is_some_and(|deleted| deleted <= instant)
    }
}

/// A calendar event, optionally recurring.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_all_day: bool,
    pub category_id: Option<Uuid>,
    pub rrule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Length of every occurrence, measured from the minute the definition
    /// starts in, since occurrences start on whole minutes.
    pub fn duration(&self) -> Duration {
        self.ends_at - crate::recurrence::normalize_to_minute(self.starts_at)
    }

    pub fn is_recurring(&self) -> bool {
        self.rrule.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct NewTaskData {
    pub couple_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub rrule: Option<String>,
}

/// Field-level partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskData {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<NaiveDate>,
    pub rrule: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewEventData {
    pub couple_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_all_day: bool,
    pub category_id: Option<Uuid>,
    pub rrule: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateEventData {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_all_day: Option<bool>,
    pub category_id: Option<Option<Uuid>>,
    pub rrule: Option<Option<String>>,
}

// ============================================================================
// Overlays
// ============================================================================

/// Cancellation of the task occurrence due on `exception_date`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct TaskException {
    pub id: Uuid,
    pub task_id: Uuid,
    pub exception_date: NaiveDate,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Cancellation of the event occurrence starting at `exception_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct EventException {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Whole-minute UTC instant of the cancelled occurrence.
    pub exception_at: DateTime<Utc>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTaskException {
    pub task_id: Uuid,
    pub exception_date: NaiveDate,
    pub created_by: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewEventException {
    pub event_id: Uuid,
    pub exception_at: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Record that the task occurrence due on `due_date` was done.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Completion {
    pub id: Uuid,
    pub task_id: Uuid,
    /// The occurrence being completed, not the time of completion.
    pub due_date: NaiveDate,
    pub completed_by: Uuid,
    pub completed_at: DateTime<Utc>,
}

/// A completion joined with the completing member's name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct CompletionDetail {
    pub id: Uuid,
    pub task_id: Uuid,
    pub due_date: NaiveDate,
    pub completed_by: Uuid,
    pub completed_by_name: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompletion {
    pub task_id: Uuid,
    pub due_date: NaiveDate,
    pub completed_by: Uuid,
    /// Defaults to the repository clock when absent.
    pub completed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Computed Occurrences (never persisted)
// ============================================================================

/// One concrete instance of a calendar event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventOccurrence {
    pub event: CalendarEvent,
    pub occurrence_start: DateTime<Utc>,
    pub occurrence_end: DateTime<Utc>,
}

/// What, if anything, overlays a due task occurrence. An exception always
/// wins over a completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "record", rename_all = "lowercase")]
pub enum Overlay {
    None,
    Exception(TaskException),
    Completion(CompletionDetail),
}

impl Overlay {
    pub fn completion(&self) -> Option<&CompletionDetail> {
        match self {
            Overlay::Completion(completion) => Some(completion),
            _ => None,
        }
    }

    pub fn exception(&self) -> Option<&TaskException> {
        match self {
            Overlay::Exception(exception) => Some(exception),
            _ => None,
        }
    }
}

/// A task due on a given day, with its overlay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayTask {
    pub task: Task,
    pub date: NaiveDate,
    pub overlay: Overlay,
}

impl DayTask {
    pub fn is_completed(&self) -> bool {
        matches!(self.overlay, Overlay::Completion(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.overlay, Overlay::Exception(_))
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Raw per-actor completion count as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct MemberCount {
    pub member_id: Uuid,
    pub completed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberSummary {
    pub member_id: Uuid,
    pub display_name: String,
    pub completed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_planned: u64,
    pub total_completed: u64,
    pub members: Vec<MemberSummary>,
}
