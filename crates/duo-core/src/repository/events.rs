use crate::error::CoreError;
use crate::models::{CalendarEvent, NewEventData, UpdateEventData};
use crate::recurrence::RuleExpander;
use crate::repository::tasks::{normalize_rule, normalize_title};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[async_trait]
impl super::EventRepository for SqliteRepository {
    async fn add_event(&self, data: NewEventData) -> Result<CalendarEvent, CoreError> {
        let title = normalize_title(&data.title)?;
        let rrule = normalize_rule(data.rrule);
        validate_event_shape(data.starts_at, data.ends_at, rrule.as_deref())?;
        self.ensure_member_of(data.couple_id, data.author_id).await?;

        let now = self.now();
        let event = sqlx::query_as(
            r#"INSERT INTO calendar_events
                (id, couple_id, author_id, title, description, starts_at, ends_at, is_all_day, category_id, rrule, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.couple_id)
        .bind(data.author_id)
        .bind(title)
        .bind(data.description)
        .bind(data.starts_at)
        .bind(data.ends_at)
        .bind(data.is_all_day)
        .bind(data.category_id)
        .bind(rrule)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(event)
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<CalendarEvent>, CoreError> {
        let event = sqlx::query_as("SELECT * FROM calendar_events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(event)
    }

    async fn find_events(&self, couple_id: Uuid) -> Result<Vec<CalendarEvent>, CoreError> {
        let events = sqlx::query_as(
            "SELECT * FROM calendar_events WHERE couple_id = $1 ORDER BY starts_at, id",
        )
        .bind(couple_id)
        .fetch_all(self.pool())
        .await?;
        Ok(events)
    }

    async fn update_event(&self, id: Uuid, data: UpdateEventData) -> Result<CalendarEvent, CoreError> {
        let mut tx = self.pool().begin().await?;

        let current: CalendarEvent = sqlx::query_as("SELECT * FROM calendar_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Event with id {} not found", id)))?;

        let title = match &data.title {
            Some(title) => normalize_title(title)?,
            None => current.title,
        };
        let starts_at = data.starts_at.unwrap_or(current.starts_at);
        let ends_at = data.ends_at.unwrap_or(current.ends_at);
        let rrule = match data.rrule {
            Some(rule) => normalize_rule(rule),
            None => current.rrule,
        };
        validate_event_shape(starts_at, ends_at, rrule.as_deref())?;

        let event = sqlx::query_as(
            r#"UPDATE calendar_events
            SET title = $1, description = $2, starts_at = $3, ends_at = $4, is_all_day = $5,
                category_id = $6, rrule = $7, updated_at = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(data.description.unwrap_or(current.description))
        .bind(starts_at)
        .bind(ends_at)
        .bind(data.is_all_day.unwrap_or(current.is_all_day))
        .bind(data.category_id.unwrap_or(current.category_id))
        .bind(rrule)
        .bind(self.now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), CoreError> {
        // Exceptions go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Event with id {} not found", id)));
        }
        Ok(())
    }
}

fn validate_event_shape(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    rrule: Option<&str>,
) -> Result<(), CoreError> {
    if ends_at < starts_at {
        return Err(CoreError::InvalidInput(format!(
            "Event ends ({}) before it starts ({})",
            ends_at, starts_at
        )));
    }
    if let Some(rule) = rrule {
        RuleExpander::validate(starts_at, rule)?;
    }
    Ok(())
}
