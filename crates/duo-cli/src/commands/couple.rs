use anyhow::Result;
use duo_core::repository::CoupleRepository;

use super::{detail, success, Context};
use crate::cli::{CoupleCommand, CoupleSubcommand};

pub async fn couple_command(ctx: &Context, command: CoupleCommand) -> Result<()> {
    match command.command {
        CoupleSubcommand::Create(create) => {
            let couple = ctx.repo().create_couple(create.name).await?;
            ctx.emit(&couple, |couple| {
                success(format!("Created couple: {}", couple.name));
                detail("Couple ID", couple.id);
            })
        }
    }
}
