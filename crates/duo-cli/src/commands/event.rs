use anyhow::{anyhow, Result};
use chrono::Duration;
use dialoguer::Confirm;
use duo_core::error::CoreError;
use duo_core::models::NewEventData;
use duo_core::repository::EventRepository;
use owo_colors::OwoColorize;

use super::{detail, success, Context};
use crate::cli::{AddEventCommand, DeleteCommand, EventCommand, EventSubcommand};
use crate::parser::{build_rrule, parse_instant};

pub async fn event_command(ctx: &Context, command: EventCommand) -> Result<()> {
    match command.command {
        EventSubcommand::Add(add) => add_event(ctx, add).await,
        EventSubcommand::Delete(delete) => delete_event(ctx, delete).await,
    }
}

async fn add_event(ctx: &Context, command: AddEventCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let starts_at = parse_instant(&command.start)?;
    let ends_at = match &command.end {
        Some(end) => parse_instant(end)?,
        None => starts_at + Duration::minutes(command.minutes),
    };
    let rrule = build_rrule(&command.recurrence)?;

    let event = ctx
        .repo()
        .add_event(NewEventData {
            couple_id,
            author_id: command.author,
            title: command.title,
            description: command.description,
            starts_at,
            ends_at,
            is_all_day: command.all_day,
            category_id: command.category,
            rrule,
        })
        .await?;

    ctx.emit(&event, |event| {
        success(format!("Created event: {}", event.title.bright_white().bold()));
        detail("Event ID", event.id);
        detail("Starts", event.starts_at.format("%Y-%m-%d %H:%M UTC"));
        if let Some(rule) = &event.rrule {
            detail("Repeats", rule);
        }
    })
}

async fn delete_event(ctx: &Context, command: DeleteCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let event = ctx
        .repo()
        .find_event_by_id(command.id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Event with id {} not found", command.id))))?;

    if event.couple_id != couple_id {
        return Err(anyhow!(CoreError::Unauthorized(format!(
            "Event {} does not belong to couple {}",
            event.id, couple_id
        ))));
    }

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Delete event '{}' and every one of its occurrences?",
                event.title
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    ctx.repo().delete_event(event.id).await?;
    ctx.emit(&event, |event| {
        success(format!("Deleted event: {}", event.title));
    })
}
