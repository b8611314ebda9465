use crate::error::{is_unique_violation, CoreError};
use crate::models::{EventException, NewEventException, NewTaskException, TaskException};
use crate::recurrence::normalize_to_minute;
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[async_trait]
impl super::ExceptionRepository for SqliteRepository {
    async fn add_task_exception(&self, data: NewTaskException) -> Result<TaskException, CoreError> {
        let mut tx = self.pool().begin().await?;

        // A skipped occurrence cannot stay completed
        sqlx::query("DELETE FROM task_completions WHERE task_id = $1 AND due_date = $2")
            .bind(data.task_id)
            .bind(data.exception_date)
            .execute(&mut *tx)
            .await?;

        let exception: TaskException = sqlx::query_as(
            r#"INSERT INTO task_exceptions (id, task_id, exception_date, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.task_id)
        .bind(data.exception_date)
        .bind(data.created_by)
        .bind(self.now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::AlreadyExists(format!(
                    "Task {} is already skipped on {}",
                    data.task_id, data.exception_date
                ))
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(exception)
    }

    async fn task_exception_exists(&self, task_id: Uuid, date: NaiveDate) -> Result<bool, CoreError> {
        let row = sqlx::query("SELECT 1 FROM task_exceptions WHERE task_id = $1 AND exception_date = $2")
            .bind(task_id)
            .bind(date)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn find_task_exceptions_for_day(&self, couple_id: Uuid, date: NaiveDate) -> Result<Vec<TaskException>, CoreError> {
        let exceptions = sqlx::query_as(
            r#"SELECT te.* FROM task_exceptions te
            INNER JOIN tasks t ON t.id = te.task_id
            WHERE t.couple_id = $1 AND te.exception_date = $2
            "#,
        )
        .bind(couple_id)
        .bind(date)
        .fetch_all(self.pool())
        .await?;
        Ok(exceptions)
    }

    async fn remove_task_exception(&self, couple_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query(
            r#"DELETE FROM task_exceptions
            WHERE id = $1 AND task_id IN (SELECT id FROM tasks WHERE couple_id = $2)
            "#,
        )
        .bind(id)
        .bind(couple_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Task exception with id {} not found", id)));
        }
        Ok(())
    }

    async fn add_event_exception(&self, data: NewEventException) -> Result<EventException, CoreError> {
        let exception_at = normalize_to_minute(data.exception_at);

        let exception = sqlx::query_as(
            r#"INSERT INTO event_exceptions (id, event_id, exception_at, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.event_id)
        .bind(exception_at)
        .bind(data.created_by)
        .bind(self.now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::AlreadyExists(format!(
                    "Event {} is already cancelled at {}",
                    data.event_id, exception_at
                ))
            } else {
                e.into()
            }
        })?;

        Ok(exception)
    }

    async fn event_exception_exists(&self, event_id: Uuid, instant: DateTime<Utc>) -> Result<bool, CoreError> {
        let row = sqlx::query("SELECT 1 FROM event_exceptions WHERE event_id = $1 AND exception_at = $2")
            .bind(event_id)
            .bind(normalize_to_minute(instant))
            .fetch_optional(self.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn find_event_exceptions_in_range(
        &self,
        couple_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventException>, CoreError> {
        // Widened to whole minutes so a normalized key at the range edge is kept
        let exceptions = sqlx::query_as(
            r#"SELECT ee.* FROM event_exceptions ee
            INNER JOIN calendar_events e ON e.id = ee.event_id
            WHERE e.couple_id = $1 AND ee.exception_at >= $2 AND ee.exception_at <= $3
            "#,
        )
        .bind(couple_id)
        .bind(normalize_to_minute(start))
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(exceptions)
    }

    async fn remove_event_exception(&self, couple_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query(
            r#"DELETE FROM event_exceptions
            WHERE id = $1 AND event_id IN (SELECT id FROM calendar_events WHERE couple_id = $2)
            "#,
        )
        .bind(id)
        .bind(couple_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Event exception with id {} not found", id)));
        }
        Ok(())
    }
}
