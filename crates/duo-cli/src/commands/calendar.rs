use anyhow::Result;
use chrono::{Duration, Utc};

use super::Context;
use crate::cli::CalendarCommand;
use crate::parser::parse_date;
use crate::views::table::display_occurrences;

const DEFAULT_SPAN_DAYS: i64 = 7;

pub async fn show_calendar(ctx: &Context, command: CalendarCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;
    let from = match &command.from {
        Some(from) => parse_date(from)?,
        None => Utc::now().date_naive(),
    };
    let to = match &command.to {
        Some(to) => parse_date(to)?,
        None => from + Duration::days(DEFAULT_SPAN_DAYS),
    };

    let occurrences = ctx.engine.get_occurrences(couple_id, from, to).await?;
    ctx.emit(occurrences.as_slice(), display_occurrences)
}
