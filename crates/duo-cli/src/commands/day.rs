use anyhow::Result;
use chrono::Utc;

use super::Context;
use crate::cli::DayCommand;
use crate::parser::parse_date;
use crate::views::table::display_day;

pub async fn show_day(ctx: &Context, command: DayCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let date = match &command.date {
        Some(date) => parse_date(date)?,
        None => Utc::now().date_naive(),
    };

    let tasks = ctx.engine.get_tasks_for_day(couple_id, date).await?;
    ctx.emit(tasks.as_slice(), |tasks| {
        println!("{}", date.format("%A %Y-%m-%d"));
        display_day(tasks);
    })
}
