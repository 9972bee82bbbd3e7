use crate::utils::ensure_authorized;
use crate::{Context, Error};
use tokio::time::{sleep, Duration};

/// Turns off the P2MM bot
#[poise::command(slash_command)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    if !ensure_authorized(ctx).await? {
        return Ok(());
    }

    ctx.say("Shutting down, good bye!").await?;
    log::info!("The P2MM Bot has been shutdown by {}...", ctx.author().name);

    // Give Discord a moment to deliver the goodbye before the gateway closes
    sleep(Duration::from_secs(1)).await;
    ctx.framework().shard_manager().shutdown_all().await;

    Ok(())
}
