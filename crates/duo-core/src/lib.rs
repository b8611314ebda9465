//! # Duo Core Library
//!
//! Recurrence and occurrence engine for a couple's shared household: recurring
//! chores, a shared calendar, and who did what.
//!
//! Definitions are stored once, with a start anchor and an optional RFC 5545
//! `RRULE`. Occurrences are never stored; they are computed on every query
//! and overlaid with exceptions (a skipped occurrence) and completions (a
//! done occurrence).
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Definitions, overlays and computed occurrences
//! - [`repository`]: Data access layer with Repository pattern
//! - [`recurrence`]: Rule expansion anchored at a definition's start
//! - [`window`]: UTC day and month windows
//! - [`overlay`]: In-memory exception and completion lookups
//! - [`engine`]: Range, day and monthly summary queries plus overlay mutations
//! - [`clock`]: Injected time source
//! - [`error`]: Error types with stable codes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use duo_core::{
//!     db, engine::OccurrenceEngine, models::NewTaskData,
//!     repository::{CoupleRepository, SqliteRepository, TaskRepository},
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = db::establish_connection("duo.db").await?;
//!     let repo = SqliteRepository::new(pool);
//!
//!     let couple = repo.create_couple("Alex & Sam".to_string()).await?;
//!     let alex = repo.add_member(couple.id, "Alex".to_string()).await?;
//!
//!     repo.add_task(NewTaskData {
//!         couple_id: couple.id,
//!         author_id: alex.id,
//!         title: "Water the plants".to_string(),
//!         description: None,
//!         start_date: NaiveDate::from_ymd_opt(2025, 11, 18).unwrap(),
//!         rrule: Some("FREQ=DAILY".to_string()),
//!     })
//!     .await?;
//!
//!     let engine = OccurrenceEngine::new(repo);
//!     let due = engine
//!         .get_tasks_for_day(couple.id, NaiveDate::from_ymd_opt(2025, 11, 19).unwrap())
//!         .await?;
//!     println!("{} task(s) due", due.len());
//!
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod overlay;
pub mod recurrence;
pub mod repository;
pub mod window;
