use crate::history::{count_messages, HistoryScan};
use crate::utils::ensure_authorized;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::ChannelId;

const HISTORY_LIMIT: usize = 50;

/// A channel argument as typed by the user.
#[derive(Debug, PartialEq, Eq)]
pub enum ChannelRef<'a> {
    Id(ChannelId),
    Name(&'a str),
}

/// Accepts `general`, `#general` and mention tokens like `<#123>`.
pub fn parse_channel_ref(input: &str) -> ChannelRef<'_> {
    let input = input.trim();

    let mentioned = input
        .strip_prefix("<#")
        .and_then(|rest| rest.strip_suffix('>'))
        .and_then(|id| id.parse::<u64>().ok())
        .filter(|id| *id != 0);

    match mentioned {
        Some(id) => ChannelRef::Id(ChannelId::new(id)),
        None => ChannelRef::Name(input.trim_start_matches('#')),
    }
}

/// Find the referenced channel among the guild's channels.
pub fn resolve_channel<'a>(
    reference: &ChannelRef<'_>,
    channels: impl IntoIterator<Item = (ChannelId, &'a str)>,
) -> Option<ChannelId> {
    channels
        .into_iter()
        .find(|(id, name)| match reference {
            ChannelRef::Id(wanted) => id == wanted,
            ChannelRef::Name(wanted) => name.eq_ignore_ascii_case(wanted),
        })
        .map(|(id, _)| id)
}

fn history_report(member: &str, channel: &str, count: usize) -> String {
    if count == 0 {
        format!("No messages of user \"{member}\" were found in \"{channel}\"")
    } else {
        format!(
            "Grabbed last {count} messages of \"{member}\" in \"{channel}\", check console for history."
        )
    }
}

fn missing_channel_message(member: &str, channel: &str) -> String {
    format!(
        "Failed to grab the messages of \"{member}\" in the specified channel \"{channel}\" as it doesn't exist."
    )
}

/// Grab the specified users last 50 messages or how many there are if less than 50 are present.
#[poise::command(slash_command, guild_only)]
pub async fn message_history_test(
    ctx: Context<'_>,
    #[description = "The specified channel to grab messages from; this needs to be specified."]
    channel: String,
    #[description = "The specified user to get the last 50 messages; defaults to the user who uses the command."]
    member: Option<serenity::User>,
) -> Result<(), Error> {
    if !ensure_authorized(ctx).await? {
        return Ok(());
    }

    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let target = member.unwrap_or_else(|| ctx.author().clone());
    let name = target.tag();

    let guild_channels = guild_id.channels(ctx.serenity_context()).await?;
    let reference = parse_channel_ref(&channel);
    let Some(channel_id) = resolve_channel(
        &reference,
        guild_channels
            .values()
            .map(|guild_channel| (guild_channel.id, guild_channel.name.as_str())),
    ) else {
        log::info!("Channel {channel} requested by {} not found", ctx.author().name);
        ctx.say(missing_channel_message(&name, &channel)).await?;
        return Ok(());
    };

    // Slow on busy channels, so defer before scanning
    ctx.defer().await?;

    let history = channel_id.messages_iter(ctx.serenity_context().http.clone());
    let count = count_messages(history, target.id, HistoryScan::recent(HISTORY_LIMIT)).await?;

    log::info!("Found {count} messages of {name} in {channel}");
    ctx.say(history_report(&name, &channel, count)).await?;

    Ok(())
}
