use crate::utils::{ensure_authorized, AlertSink};
use crate::{ApplicationContext, Error, GENERIC_FAILURE};
use poise::serenity_prelude as serenity;

#[derive(Debug, poise::Modal)]
#[name = "Feedback"]
struct FeedbackModal {
    #[name = "Name"]
    #[placeholder = "Your name here..."]
    name: String,
    #[name = "What do you think of the P2MM bot?"]
    #[placeholder = "Type your feedback here..."]
    #[paragraph]
    #[max_length = 300]
    feedback: Option<String>,
}

fn thanks_message(modal: &FeedbackModal) -> String {
    format!("Thanks for your feedback, {}!", modal.name.trim())
}

/// Report a broken form submission and pick the reply for the submitter.
async fn submission_failed(
    alerts: &AlertSink,
    http: &serenity::Http,
    error: &serenity::Error,
) -> &'static str {
    alerts.report(http, "the feedback form", error).await;
    GENERIC_FAILURE
}

/// Opens a feedback form
#[poise::command(slash_command)]
pub async fn test_modal(app_ctx: ApplicationContext<'_>) -> Result<(), Error> {
    let ctx = poise::Context::Application(app_ctx);

    if !ensure_authorized(ctx).await? {
        return Ok(());
    }

    match poise::execute_modal::<_, _, FeedbackModal>(app_ctx, None, None).await {
        Ok(Some(modal)) => {
            log::info!(
                "Feedback from {}: name={:?} feedback={:?}",
                ctx.author().name,
                modal.name,
                modal.feedback
            );
            let builder = poise::CreateReply::default()
                .content(thanks_message(&modal))
                .ephemeral(true);
            ctx.send(builder).await?;
        }
        Ok(None) => {
            log::info!("Feedback form from {} timed out", ctx.author().name);
        }
        Err(e) => {
            log::error!("Feedback form from {} failed", ctx.author().name);
            let reply =
                submission_failed(&ctx.data().alerts, &ctx.serenity_context().http, &e).await;
            let builder = poise::CreateReply::default()
                .content(reply)
                .ephemeral(true);
            ctx.send(builder).await?;
        }
    }

    Ok(())
}
