use anyhow::{anyhow, Result};
use duo_core::engine::OccurrenceEngine;
use duo_core::error::CoreError;
use duo_core::repository::SqliteRepository;
use owo_colors::{OwoColorize, Style};
use serde::Serialize;
use uuid::Uuid;

pub mod calendar;
pub mod couple;
pub mod day;
pub mod event;
pub mod member;
pub mod overlay;
pub mod summary;
pub mod task;

/// What every command runs against.
pub struct Context {
    pub engine: OccurrenceEngine<SqliteRepository>,
    pub couple: Option<Uuid>,
    pub json: bool,
}

impl Context {
    pub fn repo(&self) -> &SqliteRepository {
        self.engine.repository()
    }

    /// The couple from `--couple` or the config.
    pub fn couple_id(&self) -> Result<Uuid> {
        self.couple.ok_or_else(|| {
            anyhow!(CoreError::InvalidInput(
                "No couple selected. Pass --couple <ID> or set default_couple in duo.toml".to_string()
            ))
        })
    }

    /// Prints `value` as JSON with `--json`, otherwise through `render`.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, render: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }
}

pub(crate) fn success(message: impl std::fmt::Display) {
    let success_style = Style::new().green().bold();
    println!("{} {}", "✓".style(success_style), message);
}

pub(crate) fn detail(label: &str, value: impl std::fmt::Display) {
    let info_style = Style::new().blue();
    println!("  {} {}: {}", "→".style(info_style), label, value.yellow());
}
