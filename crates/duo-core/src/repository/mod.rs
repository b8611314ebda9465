use crate::clock::{Clock, SystemClock};
use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{
    CalendarEvent, Completion, CompletionDetail, Couple, EventException, Member, MemberCount,
    NewCompletion, NewEventData, NewEventException, NewTaskData, NewTaskException, Task,
    TaskException, UpdateEventData, UpdateTaskData,
};
use crate::window::MonthWindow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

// Re-export domain modules
pub mod couples;
pub mod tasks;
pub mod events;
pub mod exceptions;
pub mod completions;

/// Domain-specific trait for couples and their members
#[async_trait]
pub trait CoupleRepository {
    async fn create_couple(&self, name: String) -> Result<Couple, CoreError>;
    async fn find_couple_by_id(&self, id: Uuid) -> Result<Option<Couple>, CoreError>;
    async fn add_member(&self, couple_id: Uuid, display_name: String) -> Result<Member, CoreError>;
    async fn find_member_by_id(&self, id: Uuid) -> Result<Option<Member>, CoreError>;
    async fn list_members(&self, couple_id: Uuid) -> Result<Vec<Member>, CoreError>;
}

/// Domain-specific trait for recurring household task definitions
#[async_trait]
pub trait TaskRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError>;
    /// Tasks not soft-deleted before `at`.
    async fn find_tasks_active_at(&self, couple_id: Uuid, at: DateTime<Utc>) -> Result<Vec<Task>, CoreError>;
    /// Every task of the couple, soft-deleted ones included.
    async fn find_all_tasks(&self, couple_id: Uuid) -> Result<Vec<Task>, CoreError>;
    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError>;
    async fn soft_delete_task(&self, id: Uuid) -> Result<Task, CoreError>;
}

/// Domain-specific trait for calendar event definitions
#[async_trait]
pub trait EventRepository {
    async fn add_event(&self, data: NewEventData) -> Result<CalendarEvent, CoreError>;
    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<CalendarEvent>, CoreError>;
    async fn find_events(&self, couple_id: Uuid) -> Result<Vec<CalendarEvent>, CoreError>;
    async fn update_event(&self, id: Uuid, data: UpdateEventData) -> Result<CalendarEvent, CoreError>;
    async fn delete_event(&self, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for the exception overlay
#[async_trait]
pub trait ExceptionRepository {
    async fn add_task_exception(&self, data: NewTaskException) -> Result<TaskException, CoreError>;
    async fn task_exception_exists(&self, task_id: Uuid, date: NaiveDate) -> Result<bool, CoreError>;
    async fn find_task_exceptions_for_day(&self, couple_id: Uuid, date: NaiveDate) -> Result<Vec<TaskException>, CoreError>;
    async fn remove_task_exception(&self, couple_id: Uuid, id: Uuid) -> Result<(), CoreError>;

    async fn add_event_exception(&self, data: NewEventException) -> Result<EventException, CoreError>;
    async fn event_exception_exists(&self, event_id: Uuid, instant: DateTime<Utc>) -> Result<bool, CoreError>;
    async fn find_event_exceptions_in_range(&self, couple_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<EventException>, CoreError>;
    async fn remove_event_exception(&self, couple_id: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Domain-specific trait for the completion overlay
#[async_trait]
pub trait CompletionRepository {
    async fn add_completion(&self, data: NewCompletion) -> Result<Completion, CoreError>;
    async fn find_completion(&self, task_id: Uuid, due_date: NaiveDate) -> Result<Option<Completion>, CoreError>;
    async fn find_completions_for_day(&self, couple_id: Uuid, date: NaiveDate) -> Result<Vec<CompletionDetail>, CoreError>;
    async fn summarize_by_month(&self, couple_id: Uuid, month: &MonthWindow) -> Result<Vec<MemberCount>, CoreError>;
    async fn summarize_all_time(&self, couple_id: Uuid) -> Result<Vec<MemberCount>, CoreError>;
    async fn remove_completion(&self, couple_id: Uuid, id: Uuid) -> Result<(), CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    CoupleRepository +
    TaskRepository +
    EventRepository +
    ExceptionRepository +
    CompletionRepository +
    Send +
    Sync
{
    // Individual domain operations are defined in their respective traits
}

/// SQLite implementation of the repository pattern
pub struct SqliteRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl SqliteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    /// Uses `clock` for every timestamp the repository writes.
    pub fn with_clock(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Repository for SqliteRepository {}
