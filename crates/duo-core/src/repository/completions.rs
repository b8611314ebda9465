use crate::error::{is_unique_violation, CoreError};
use crate::models::{Completion, CompletionDetail, MemberCount, NewCompletion};
use crate::repository::SqliteRepository;
use crate::window::MonthWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

#[async_trait]
impl super::CompletionRepository for SqliteRepository {
    async fn add_completion(&self, data: NewCompletion) -> Result<Completion, CoreError> {
        let completed_at = data.completed_at.unwrap_or_else(|| self.now());

        // UNIQUE(task_id, due_date) decides between concurrent completions
        let completion = sqlx::query_as(
            r#"INSERT INTO task_completions (id, task_id, due_date, completed_by, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.task_id)
        .bind(data.due_date)
        .bind(data.completed_by)
        .bind(completed_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::TaskAlreadyCompleted(format!(
                    "Task {} is already completed for {}",
                    data.task_id, data.due_date
                ))
            } else {
                e.into()
            }
        })?;

        Ok(completion)
    }

    async fn find_completion(&self, task_id: Uuid, due_date: NaiveDate) -> Result<Option<Completion>, CoreError> {
        let completion = sqlx::query_as("SELECT * FROM task_completions WHERE task_id = $1 AND due_date = $2")
            .bind(task_id)
            .bind(due_date)
            .fetch_optional(self.pool())
            .await?;
        Ok(completion)
    }

    async fn find_completions_for_day(&self, couple_id: Uuid, date: NaiveDate) -> Result<Vec<CompletionDetail>, CoreError> {
        let completions = sqlx::query_as(
            r#"SELECT c.id, c.task_id, c.due_date, c.completed_by, m.display_name AS completed_by_name, c.completed_at
            FROM task_completions c
            INNER JOIN tasks t ON t.id = c.task_id
            INNER JOIN members m ON m.id = c.completed_by
            WHERE t.couple_id = $1 AND c.due_date = $2
            "#,
        )
        .bind(couple_id)
        .bind(date)
        .fetch_all(self.pool())
        .await?;
        Ok(completions)
    }

    async fn summarize_by_month(&self, couple_id: Uuid, month: &MonthWindow) -> Result<Vec<MemberCount>, CoreError> {
        let counts: Vec<MemberCount> = sqlx::query_as(
            r#"SELECT c.completed_by AS member_id, COUNT(*) AS completed
            FROM task_completions c
            INNER JOIN tasks t ON t.id = c.task_id
            WHERE t.couple_id = $1 AND c.due_date >= $2 AND c.due_date <= $3
            GROUP BY c.completed_by
            "#,
        )
        .bind(couple_id)
        .bind(month.first_day)
        .bind(month.last_day)
        .fetch_all(self.pool())
        .await?;

        debug!(%couple_id, year = month.year, month = month.month, members = counts.len(), "Summarized completions");
        Ok(counts)
    }

    async fn summarize_all_time(&self, couple_id: Uuid) -> Result<Vec<MemberCount>, CoreError> {
        // Soft-deleted tasks still count here
        let counts = sqlx::query_as(
            r#"SELECT c.completed_by AS member_id, COUNT(*) AS completed
            FROM task_completions c
            INNER JOIN tasks t ON t.id = c.task_id
            WHERE t.couple_id = $1
            GROUP BY c.completed_by
            "#,
        )
        .bind(couple_id)
        .fetch_all(self.pool())
        .await?;
        Ok(counts)
    }

    async fn remove_completion(&self, couple_id: Uuid, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query(
            r#"DELETE FROM task_completions
            WHERE id = $1 AND task_id IN (SELECT id FROM tasks WHERE couple_id = $2)
            "#,
        )
        .bind(id)
        .bind(couple_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Completion with id {} not found", id)));
        }
        Ok(())
    }
}
