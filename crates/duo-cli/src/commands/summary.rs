use anyhow::Result;
use chrono::{Datelike, Utc};

use super::Context;
use crate::cli::SummaryCommand;
use crate::views::table::{display_member_counts, display_summary};

pub async fn show_summary(ctx: &Context, command: SummaryCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let today = Utc::now().date_naive();
    let year = command.year.unwrap_or_else(|| today.year());
    let month = command.month.unwrap_or_else(|| today.month());

    let summary = ctx.engine.get_monthly_summary(couple_id, year, month).await?;
    ctx.emit(&summary, display_summary)
}

pub async fn show_stats(ctx: &Context) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let stats = ctx.engine.get_member_stats(couple_id).await?;
    ctx.emit(stats.as_slice(), display_member_counts)
}
