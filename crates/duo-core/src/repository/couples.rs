use crate::error::CoreError;
use crate::models::{Couple, Member};
use crate::repository::SqliteRepository;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl super::CoupleRepository for SqliteRepository {
    async fn create_couple(&self, name: String) -> Result<Couple, CoreError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CoreError::InvalidInput("Couple name cannot be empty".to_string()));
        }

        let couple = sqlx::query_as(
            r#"INSERT INTO couples (id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(self.now())
        .fetch_one(self.pool())
        .await?;

        Ok(couple)
    }

    async fn find_couple_by_id(&self, id: Uuid) -> Result<Option<Couple>, CoreError> {
        let couple = sqlx::query_as("SELECT * FROM couples WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(couple)
    }

    async fn add_member(&self, couple_id: Uuid, display_name: String) -> Result<Member, CoreError> {
        let display_name = display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(CoreError::InvalidInput("Member name cannot be empty".to_string()));
        }

        let couple_exists = sqlx::query("SELECT 1 FROM couples WHERE id = $1")
            .bind(couple_id)
            .fetch_optional(self.pool())
            .await?
            .is_some();
        if !couple_exists {
            return Err(CoreError::NotFound(format!("Couple with id {} not found", couple_id)));
        }

        let member = sqlx::query_as(
            r#"INSERT INTO members (id, couple_id, display_name, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, couple_id, display_name, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(couple_id)
        .bind(display_name)
        .bind(self.now())
        .fetch_one(self.pool())
        .await?;

        Ok(member)
    }

    async fn find_member_by_id(&self, id: Uuid) -> Result<Option<Member>, CoreError> {
        let member = sqlx::query_as("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(member)
    }

    async fn list_members(&self, couple_id: Uuid) -> Result<Vec<Member>, CoreError> {
        let members = sqlx::query_as(
            "SELECT * FROM members WHERE couple_id = $1 ORDER BY created_at, id",
        )
        .bind(couple_id)
        .fetch_all(self.pool())
        .await?;
        Ok(members)
    }
}

impl SqliteRepository {
    /// Fails with `Unauthorized` unless `member_id` belongs to `couple_id`.
    pub(crate) async fn ensure_member_of(&self, couple_id: Uuid, member_id: Uuid) -> Result<(), CoreError> {
        let is_member = sqlx::query("SELECT 1 FROM members WHERE id = $1 AND couple_id = $2")
            .bind(member_id)
            .bind(couple_id)
            .fetch_optional(self.pool())
            .await?
            .is_some();

        if !is_member {
            return Err(CoreError::Unauthorized(format!(
                "Member {} does not belong to couple {}",
                member_id, couple_id
            )));
        }
        Ok(())
    }
}
