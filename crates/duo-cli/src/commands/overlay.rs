use anyhow::Result;
use chrono::Utc;
use serde_json::json;

use super::{detail, success, Context};
use crate::cli::{DoneCommand, SkipCommand, SkipSubcommand, UndoCommand, UnskipCommand, UnskipSubcommand};
use crate::parser::{parse_date, parse_instant};

pub async fn done(ctx: &Context, command: DoneCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let due_date = match &command.date {
        Some(date) => parse_date(date)?,
        None => Utc::now().date_naive(),
    };

    let completion = ctx
        .engine
        .complete_task(couple_id, command.actor, command.id, due_date, None)
        .await?;

    ctx.emit(&completion, |completion| {
        success(format!("Completed task for {}", completion.due_date));
        detail("Completion ID", completion.id);
    })
}

pub async fn undo(ctx: &Context, command: UndoCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    ctx.engine.undo_completion(couple_id, command.actor, command.id).await?;
    ctx.emit(&json!({ "undone": command.id }), |_| {
        success("Completion undone");
    })
}

pub async fn skip(ctx: &Context, command: SkipCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;

    match command.command {
        SkipSubcommand::Task(skip) => {
            let date = parse_date(&skip.date)?;
            let exception = ctx
                .engine
                .skip_task_occurrence(couple_id, skip.actor, skip.id, date)
                .await?;
            ctx.emit(&exception, |exception| {
                success(format!("Skipped task on {}", exception.exception_date));
                detail("Exception ID", exception.id);
            })
        }
        SkipSubcommand::Event(skip) => {
            let at = parse_instant(&skip.at)?;
            let exception = ctx
                .engine
                .skip_event_occurrence(couple_id, skip.actor, skip.id, at)
                .await?;
            ctx.emit(&exception, |exception| {
                success(format!(
                    "Cancelled event occurrence at {}",
                    exception.exception_at.format("%Y-%m-%d %H:%M UTC")
                ));
                detail("Exception ID", exception.id);
            })
        }
    }
}

pub async fn unskip(ctx: &Context, command: UnskipCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;

    let id = match command.command {
        UnskipSubcommand::Task(args) => {
            ctx.engine.restore_task_occurrence(couple_id, args.actor, args.id).await?;
            args.id
        }
        UnskipSubcommand::Event(args) => {
            ctx.engine.restore_event_occurrence(couple_id, args.actor, args.id).await?;
            args.id
        }
    };

    ctx.emit(&json!({ "restored": id }), |_| {
        success("Occurrence restored");
    })
}
