use crate::utils::rejection;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Discord renders `<t:unix>` in every client's own timezone.
fn join_date_message(name: &str, joined_at: Option<serenity::Timestamp>, verb: &str) -> String {
    match joined_at {
        Some(joined_at) => format!("{name} {verb} <t:{}>", joined_at.unix_timestamp()),
        None => format!("I don't know when {name} joined the server."),
    }
}

/// Discord answers 404 / 10007 (Unknown Member) for users that already left.
fn is_unknown_member(rejection: Option<(u16, isize)>) -> bool {
    matches!(rejection, Some((404, _)) | Some((_, 10007)))
}

/// Get when a user joined the server
#[poise::command(slash_command, guild_only)]
pub async fn date_joined(
    ctx: Context<'_>,
    #[description = "The user you want to get the joined date from; defaults to the user who uses the command"]
    member: Option<serenity::Member>,
) -> Result<(), Error> {
    log::info!("Date joined command called by {}", ctx.author().name);

    let member = match member {
        Some(member) => member,
        None => match ctx.author_member().await {
            Some(member) => member.into_owned(),
            None => {
                ctx.say("❌ Could not look up your membership in this server.")
                    .await?;
                return Ok(());
            }
        },
    };

    ctx.say(join_date_message(&member.user.tag(), member.joined_at, "joined"))
        .await?;

    Ok(())
}

#[poise::command(context_menu_command = "Show Join Date", guild_only)]
pub async fn show_join_date(
    ctx: Context<'_>,
    user: serenity::User,
) -> Result<(), Error> {
    log::info!(
        "Show Join Date used by {} on {}",
        ctx.author().name,
        user.name
    );

    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let joined_at = match guild_id.member(ctx.serenity_context(), user.id).await {
        Ok(member) => member.joined_at,
        Err(e) if is_unknown_member(rejection(&e)) => {
            log::info!("{} is no longer a member of {}", user.name, guild_id);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let builder = poise::CreateReply::default()
        .content(join_date_message(&user.tag(), joined_at, "joined at"))
        .ephemeral(true);
    ctx.send(builder).await?;

    Ok(())
}
