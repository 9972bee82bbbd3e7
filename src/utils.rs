use crate::config::BotConfig;
use crate::{Context, Error};
use ::serenity::http::HttpError;
use ::serenity::Error as SerenityError;
use poise::serenity_prelude as serenity;
use serenity::{ChannelId, Mentionable, UserId};

/// The one account allowed to run privileged commands on the production bot.
pub const PRIVILEGED_USER_ID: UserId = UserId::new(217027527602995200);

pub const NO_PERMISSION_MESSAGE: &str = "You do not have permission to run this command!";

/// Check if a user is allowed to use privileged commands.
///
/// Test deployments are open to everyone.
pub fn is_authorized(caller: UserId, config: &BotConfig) -> bool {
    config.testing || caller == PRIVILEGED_USER_ID
}

fn no_permission_reply() -> poise::CreateReply {
    poise::CreateReply::default()
        .content(NO_PERMISSION_MESSAGE)
        .ephemeral(true)
}

/// Gate for privileged commands. Tells the caller off and returns `false` when they
/// aren't allowed to run the current command.
pub async fn ensure_authorized(ctx: Context<'_>) -> Result<bool, Error> {
    if is_authorized(ctx.author().id, &ctx.data().config) {
        return Ok(true);
    }

    log::info!(
        "{} is not allowed to run {}",
        ctx.author().name,
        ctx.command().qualified_name
    );
    ctx.send(no_permission_reply()).await?;
    Ok(false)
}

/// HTTP status and Discord JSON error code of a request Discord refused.
pub fn rejection(error: &SerenityError) -> Option<(u16, isize)> {
    match error {
        SerenityError::Http(HttpError::UnsuccessfulRequest(response)) => {
            Some((response.status_code.as_u16(), response.error.code))
        }
        _ => None,
    }
}

/// Where unexpected errors get reported so somebody actually looks at them.
#[derive(Debug, Clone, Default)]
pub struct AlertSink {
    channel: Option<ChannelId>,
    on_call: Option<UserId>,
}

impl AlertSink {
    pub fn new(channel: Option<ChannelId>, on_call: Option<UserId>) -> Self {
        Self { channel, on_call }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.alert_channel_id, config.alert_user_id)
    }

    pub fn render(&self, context: &str) -> String {
        let alert = format!("ERROR: An error occurred with the bot in {context}! Check the console!");
        match self.on_call {
            Some(user) => format!("{} {alert}", user.mention()),
            None => alert,
        }
    }

    /// Log an unexpected error and post an alert to the admin channel.
    ///
    /// Failing to deliver the alert is logged, never returned.
    pub async fn report(
        &self,
        http: &serenity::Http,
        context: &str,
        error: &(dyn std::error::Error + Send + Sync),
    ) {
        log::error!("A non-fatal error occurred in {context}: {error:?}");

        let Some(channel) = self.channel else {
            log::warn!("No alert channel configured, error only logged");
            return;
        };

        if let Err(e) = channel.say(http, self.render(context)).await {
            log::error!("Failed to send error alert to channel {channel}: {e}");
        }
    }
}
