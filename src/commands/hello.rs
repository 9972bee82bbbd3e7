use crate::{Context, Error};
use poise::serenity_prelude::Mentionable;

/// Says hello back
#[poise::command(slash_command)]
pub async fn hello(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Hello command called by {}", ctx.author().name);

    ctx.say(format!("Hi, {}", ctx.author().mention())).await?;

    Ok(())
}
