use crate::error::CoreError;
use crate::models::{NewTaskData, Task, UpdateTaskData};
use crate::recurrence::RuleExpander;
use crate::repository::SqliteRepository;
use crate::window::start_of_day;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

#[async_trait]
impl super::TaskRepository for SqliteRepository {
    async fn add_task(&self, data: NewTaskData) -> Result<Task, CoreError> {
        let title = normalize_title(&data.title)?;
        let rrule = normalize_rule(data.rrule);
        if let Some(rule) = &rrule {
            RuleExpander::validate(start_of_day(data.start_date), rule)?;
        }
        self.ensure_member_of(data.couple_id, data.author_id).await?;

        let now = self.now();
        let task = sqlx::query_as(
            r#"INSERT INTO tasks (id, couple_id, author_id, title, description, start_date, rrule, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.couple_id)
        .bind(data.author_id)
        .bind(title)
        .bind(data.description)
        .bind(data.start_date)
        .bind(rrule)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(task)
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, CoreError> {
        let task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(task)
    }

    async fn find_tasks_active_at(&self, couple_id: Uuid, at: DateTime<Utc>) -> Result<Vec<Task>, CoreError> {
        let tasks: Vec<Task> = sqlx::query_as(
            r#"SELECT * FROM tasks
            WHERE couple_id = $1 AND (deleted_at IS NULL OR deleted_at > $2)
            ORDER BY title, id
            "#,
        )
        .bind(couple_id)
        .bind(at)
        .fetch_all(self.pool())
        .await?;

        debug!(%couple_id, %at, count = tasks.len(), "Loaded active tasks");
        Ok(tasks)
    }

    async fn find_all_tasks(&self, couple_id: Uuid) -> Result<Vec<Task>, CoreError> {
        let tasks = sqlx::query_as("SELECT * FROM tasks WHERE couple_id = $1 ORDER BY title, id")
            .bind(couple_id)
            .fetch_all(self.pool())
            .await?;
        Ok(tasks)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTaskData) -> Result<Task, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current: Task = sqlx::query_as("SELECT * FROM tasks WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", id)))?;

        let title = match &data.title {
            Some(title) => normalize_title(title)?,
            None => current.title,
        };
        let description = data.description.unwrap_or(current.description);
        let start_date = data.start_date.unwrap_or(current.start_date);
        let rrule = match data.rrule {
            Some(rule) => normalize_rule(rule),
            None => current.rrule,
        };

        // A new anchor can change how the rule expands, so re-check either way
        if let Some(rule) = &rrule {
            RuleExpander::validate(start_of_day(start_date), rule)?;
        }

        let task = sqlx::query_as(
            r#"UPDATE tasks
            SET title = $1, description = $2, start_date = $3, rrule = $4, updated_at = $5
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(start_date)
        .bind(rrule)
        .bind(self.now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(task)
    }

    async fn soft_delete_task(&self, id: Uuid) -> Result<Task, CoreError> {
        let now = self.now();
        let task = sqlx::query_as(
            r#"UPDATE tasks
            SET deleted_at = $1, updated_at = $1
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Task with id {} not found", id)))?;

        Ok(task)
    }
}

pub(crate) fn normalize_title(title: &str) -> Result<String, CoreError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidInput("Title cannot be empty".to_string()));
    }
    Ok(title.to_string())
}

/// Blank rules are stored as "no rule".
pub(crate) fn normalize_rule(rule: Option<String>) -> Option<String> {
    rule.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}
