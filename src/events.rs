use crate::config::BotConfig;
use crate::history::is_first_message;
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use serenity::{ChannelId, Mentionable};
use tokio::time::{sleep, Duration};

pub const PRESENCE: &str = "Portal 2: Multiplayer Mod";
const PROMPT_LIFETIME: Duration = Duration::from_secs(15);

fn is_help_channel(config: &BotConfig, channel: ChannelId) -> bool {
    config.mod_help_channel_id == Some(channel)
}

fn is_prefixed_hello(content: &str, prefix: &str) -> bool {
    content.starts_with(prefix) && content.contains("hello")
}

fn first_contact_prompt(help_channel: ChannelId) -> String {
    format!(
        "Hey there! It appears it's your first time messaging in {}!\n\
         Make sure to check out the pinned messages, your answer might be there!\n\
         Message will delete in {} seconds...",
        help_channel.mention(),
        PROMPT_LIFETIME.as_secs()
    )
}

async fn greet_first_contact(
    ctx: &serenity::Context,
    message: &serenity::Message,
) -> Result<(), Error> {
    log::info!(
        "First message from {} in help channel, sending the pinned messages prompt",
        message.author.name
    );

    let prompt = message
        .reply_mention(ctx, first_contact_prompt(message.channel_id))
        .await?;

    // Plain messages can't be ephemeral, so the prompt cleans itself up instead
    let http = ctx.http.clone();
    tokio::spawn(async move {
        sleep(PROMPT_LIFETIME).await;
        if let Err(e) = prompt.channel_id.delete_message(&http, prompt.id).await {
            log::warn!("Failed to delete first message prompt {}: {}", prompt.id, e);
        }
    });

    Ok(())
}

async fn on_message(
    ctx: &serenity::Context,
    bot_id: serenity::UserId,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    if message.author.id == bot_id {
        return Ok(());
    }

    let config = &data.config;

    if is_help_channel(config, message.channel_id) && !message.author.bot {
        let history = message.channel_id.messages_iter(ctx.http.clone());
        if is_first_message(history, message.author.id).await? {
            return greet_first_contact(ctx, message).await;
        }
    }

    if is_prefixed_hello(&message.content, &config.debug_prefix) {
        message.reply_mention(ctx, "Hello!").await?;
    }

    Ok(())
}

/// Handles gateway events that aren't commands.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            ctx.set_activity(Some(serenity::ActivityData::custom(PRESENCE)));
            log::info!("Logged on as {}!", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            // Listener failures are reported here so one bad message can't take anything down
            if let Err(e) = on_message(ctx, framework.bot_id, data, new_message).await {
                data.alerts
                    .report(&ctx.http, "the message listener", &*e)
                    .await;
            }
        }
        _ => {}
    }

    Ok(())
}
