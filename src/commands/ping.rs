use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

fn pong_description(latency: Duration) -> String {
    format!("Pong! {:.2} ms", latency.as_secs_f64() * 1000.0)
}

/// Pings the bot
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Ping command called by {}", ctx.author().name);

    let latency = ctx.ping().await;

    let embed = serenity::CreateEmbed::new()
        .title("Ping")
        .description(pong_description(latency));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
