use anyhow::{anyhow, Result};
use duo_core::error::CoreError;
use duo_core::repository::CoupleRepository;

use super::{detail, success, Context};
use crate::cli::{MemberCommand, MemberSubcommand};
use crate::views::table::display_members;

pub async fn member_command(ctx: &Context, command: MemberCommand) -> Result<()> {
    let couple_id = ctx.couple_id()?;

    match command.command {
        MemberSubcommand::Add(add) => {
            let member = ctx.repo().add_member(couple_id, add.name).await?;
            ctx.emit(&member, |member| {
                success(format!("Added member: {}", member.display_name));
                detail("Member ID", member.id);
            })
        }
        MemberSubcommand::List => {
            if ctx.repo().find_couple_by_id(couple_id).await?.is_none() {
                return Err(anyhow!(CoreError::NotFound(format!(
                    "Couple with id {} not found",
                    couple_id
                ))));
            }
            let members = ctx.repo().list_members(couple_id).await?;
            ctx.emit(members.as_slice(), display_members)
        }
    }
}
