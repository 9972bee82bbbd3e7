use std::env;
use std::process;

use poise::serenity_prelude as serenity;
use serenity::{Client, GatewayIntents};

mod commands;
mod config;
mod events;
mod history;
mod logging;
mod utils;

use config::BotConfig;
use utils::AlertSink;

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;
type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;

const GENERIC_FAILURE: &str = "Something went wrong while running this command.";

// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: BotConfig,
    pub alerts: AlertSink,
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    // This is our global error handler
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            log::error!("Failed to start bot: {:?}", error);
            process::exit(1);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = format!("command `{}`", ctx.command().qualified_name);
            ctx.data()
                .alerts
                .report(&ctx.serenity_context().http, &command, &*error)
                .await;

            let builder = poise::CreateReply::default()
                .content(GENERIC_FAILURE)
                .ephemeral(true);
            if let Err(e) = ctx.send(builder).await {
                log::error!("Failed to tell the user about the error in {command}: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                log::error!("Error while handling error: {}", e)
            }
        }
    }
}

async fn register_commands(
    ctx: &serenity::Context,
    config: &BotConfig,
    commands: &[poise::Command<Data, Error>],
) -> Result<(), Error> {
    match config.testing_guild_id {
        Some(guild_id) => {
            log::info!("Syncing {} commands to guild {}", commands.len(), guild_id);
            poise::builtins::register_in_guild(ctx, commands, guild_id).await?;
        }
        None => {
            log::warn!("No testing_guild_id set, registering commands globally");
            poise::builtins::register_globally(ctx, commands).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let log_dir = env::var("P2MM_LOG_DIR").unwrap_or_else(|_| logging::DEFAULT_LOG_DIR.to_string());
    if let Err(e) = logging::init(&log_dir) {
        eprintln!("ERROR: Failed to set up logging in {log_dir}: {e}");
        process::exit(1);
    }

    log::info!("Starting the P2MM bot...");

    let config_path =
        env::var("P2MM_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());
    let config = match config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            // The logger already echoes to the console
            log::error!("ERROR: {e}, the Discord bot needs it to start! Shutting down...");
            process::exit(1);
        }
    };

    if config.testing {
        log::info!("Running in testing mode, all commands are open to everyone");
    }

    // Set gateway intents
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let token = config.active_token().to_string();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::enabled_commands(config.testing),
            on_error: |error| Box::pin(on_error(error)),
            pre_command: |ctx| {
                Box::pin(async move {
                    log::info!(
                        "Executing command {} for {}...",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    log::info!("Executed command {}!", ctx.command().qualified_name);
                })
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                log::info!("Setting up bot hook...");
                register_commands(ctx, &config, &framework.options().commands).await?;
                log::info!("Finished setting up bot hook...");
                Ok(Data {
                    alerts: AlertSink::from_config(&config),
                    config,
                })
            })
        })
        .build();

    let mut client = match Client::builder(&token, intents).framework(framework).await {
        Ok(client) => client,
        Err(e) => {
            log::error!("Error creating client: {:?}", e);
            process::exit(1);
        }
    };

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, closing the connection...");
            shard_manager.shutdown_all().await;
        }
    });

    // Start the bot
    log::info!("Starting bot...");
    if let Err(why) = client.start().await {
        log::error!("Client error: {:?}", why);
        process::exit(1);
    }

    log::info!("Connection closed, good bye!");
}
