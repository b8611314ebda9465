use anyhow::{anyhow, Result};
use chrono::Utc;
use dialoguer::Confirm;
use duo_core::error::CoreError;
use duo_core::models::{NewTaskData, Task, UpdateTaskData};
use duo_core::repository::TaskRepository;
use owo_colors::OwoColorize;
use uuid::Uuid;

use super::{detail, success, Context};
use crate::cli::{AddTaskCommand, DeleteCommand, EditTaskCommand, TaskCommand, TaskSubcommand};
use crate::parser::{build_rrule, parse_date};

pub async fn task_command(ctx: &Context, command: TaskCommand) -> Result<()> {
    match command.command {
        TaskSubcommand::Add(add) => add_task(ctx, add).await,
        TaskSubcommand::Edit(edit) => edit_task(ctx, edit).await,
        TaskSubcommand::Delete(delete) => delete_task(ctx, delete).await,
    }
}

async fn add_task(ctx: &Context, command: AddTaskCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let start_date = match &command.start {
        Some(start) => parse_date(start)?,
        None => Utc::now().date_naive(),
    };
    let rrule = build_rrule(&command.recurrence)?;

    let task = ctx
        .repo()
        .add_task(NewTaskData {
            couple_id,
            author_id: command.author,
            title: command.title,
            description: command.description,
            start_date,
            rrule,
        })
        .await?;

    ctx.emit(&task, |task| {
        if task.is_recurring() {
            success(format!("Created recurring task: {}", task.title.bright_white().bold()));
        } else {
            success(format!("Created task: {}", task.title.bright_white().bold()));
        }
        detail("Task ID", task.id);
        detail("Starts", task.start_date);
        if let Some(rule) = &task.rrule {
            detail("Repeats", rule);
        }
    })
}

async fn edit_task(ctx: &Context, command: EditTaskCommand) -> Result<()> {
    owned_task(ctx, command.id).await?;

    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };
    let rrule = if command.recurrence_clear {
        Some(None)
    } else {
        command.recurrence.map(Some)
    };
    let start_date = command.start.as_deref().map(parse_date).transpose()?;

    let update = UpdateTaskData {
        title: command.title,
        description,
        start_date,
        rrule,
    };

    let task = ctx.repo().update_task(command.id, update).await?;
    ctx.emit(&task, |task| {
        success(format!("Updated task: {}", task.title));
    })
}

async fn delete_task(ctx: &Context, command: DeleteCommand) -> Result<()> {
    let task = owned_task(ctx, command.id).await?;

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete task '{}'?", task.title))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let task = ctx.repo().soft_delete_task(task.id).await?;
    ctx.emit(&task, |task| {
        success(format!("Deleted task: {}", task.title));
    })
}

async fn owned_task(ctx: &Context, id: Uuid) -> Result<Task> {
    let couple_id = ctx.couple_id()?;
    let task = ctx
        .repo()
        .find_task_by_id(id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Task with id {} not found", id))))?;

    if task.couple_id != couple_id {
        return Err(anyhow!(CoreError::Unauthorized(format!(
            "Task {} does not belong to couple {}",
            id, couple_id
        ))));
    }
    Ok(task)
}
