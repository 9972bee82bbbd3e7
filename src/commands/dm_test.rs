use crate::utils::{ensure_authorized, rejection};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

const DM_TEXT: &str = "Hello from the P2MM Bot!";

/// Discord answers 403 / 50007 when the user has DMs closed or blocked the bot.
fn is_dm_refusal(rejection: Option<(u16, isize)>) -> bool {
    matches!(rejection, Some((403, _)) | Some((_, 50007)))
}

fn dm_failed_message(name: &str) -> String {
    format!("Failed to DM message to {name}, they may have DMs disabled or have blocked the bot.")
}

/// Test DMing using the bot
#[poise::command(slash_command)]
pub async fn dm_test(
    ctx: Context<'_>,
    #[description = "The specified user to DM; defaults to the user who uses the command"]
    member: Option<serenity::User>,
) -> Result<(), Error> {
    if !ensure_authorized(ctx).await? {
        return Ok(());
    }

    let target = member.unwrap_or_else(|| ctx.author().clone());
    let name = target.tag();

    let message = serenity::CreateMessage::new().content(DM_TEXT);
    match target.direct_message(ctx.serenity_context(), message).await {
        Ok(_) => {
            log::info!("Sent test DM to {name}");
            ctx.say(format!("Sent DM message to {name}")).await?;
        }
        Err(e) if is_dm_refusal(rejection(&e)) => {
            log::info!("Could not DM {name}: {e}");
            ctx.say(dm_failed_message(&name)).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dm_failure_names_the_member() {
        let message = dm_failed_message("portal_fan");
        assert!(message.contains("Failed to DM message to portal_fan"));
    }

    #[test]
    fn test_dm_refusals() {
        assert!(is_dm_refusal(Some((403, 50007))));
        assert!(is_dm_refusal(Some((400, 50007))));
        assert!(is_dm_refusal(Some((403, 0))));
        assert!(!is_dm_refusal(Some((404, 10013))));
        assert!(!is_dm_refusal(None));
    }
}
