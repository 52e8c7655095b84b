// Guild Keeper
// A Discord administration bot backed by crash-safe per-guild JSON config files

mod commands;
mod error;
mod features;
mod models;
mod utils;

use std::env;
use std::sync::Arc;

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::global::{GlobalConfigState, GlobalSettings};
use crate::utils::config::{colors, BotConfig};
use crate::utils::paths::{DataPaths, HANGMAN, QUIZ};
use crate::utils::rate_limiter::RateLimiter;
use crate::utils::store::ConfigStore;

/// User data shared across all commands
#[derive(Debug)]
pub struct Data {
    pub store: Arc<ConfigStore>,
    pub rate_limiter: Arc<RateLimiter>,
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::whitelist::whitelist(),
        commands::whitelist::globalwhitelist(),
        commands::reaction_role::reactionrole(),
        commands::settings::settings(),
        commands::settings::musicchannel(),
        commands::settings::logging(),
        commands::settings::announcements(),
        commands::help::help(),
        commands::register::register(),
    ]
}

/// stdout always; a daily rolling file too when `config.json` asks for one.
/// The returned guard must stay alive for the file writer to flush.
fn init_logging(settings: &GlobalSettings) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = if settings.debug_mode {
        "guild_keeper=debug,chat=info"
    } else {
        "guild_keeper=info,chat=info"
    };
    let filter = tracing_subscriber::EnvFilter::new(
        env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );

    let (file_layer, guard) = match settings.log_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "guild-keeper.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    let result = match event {
        serenity::FullEvent::Message { new_message } => {
            features::message_log::handle_message(new_message, &data.store).await
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            features::reaction_roles::handle_reaction(ctx, add_reaction, &data.store, true).await
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            features::reaction_roles::handle_reaction(ctx, removed_reaction, &data.store, false)
                .await
        }
        _ => Ok(()),
    };

    // Event failures only get logged; there is nobody to reply to
    if let Err(e) = result {
        warn!("Event handler error: {:?}", e);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    let config = BotConfig::from_env()?;

    let paths = DataPaths::new(&config.data_dir);
    std::fs::create_dir_all(paths.root())
        .with_context(|| format!("Failed to create data directory {}", paths.root().display()))?;
    let store = Arc::new(ConfigStore::new(paths));

    // Logging setup depends on config.json, so read it first
    let global = store.load_global_config().await;
    let settings = GlobalSettings::from_document(&global);
    let _log_guard = init_logging(&settings);

    info!("Starting Guild Keeper...");
    info!("Data directory: {}", store.paths().root().display());
    let global_path = store.paths().global_config();
    match GlobalConfigState::classify(global_path.exists(), &global) {
        GlobalConfigState::Loaded => {}
        GlobalConfigState::Missing => warn!(
            "{} is missing; the global whitelist is empty",
            global_path.display()
        ),
        GlobalConfigState::Unreadable => {
            // The first read happened before logging existed; read again so
            // the parse error reaches the log
            store.load_global_config().await;
            warn!(
                "{} is empty or unreadable; using default settings",
                global_path.display()
            );
        }
    }

    for name in [QUIZ, HANGMAN] {
        let dataset = store.load_dataset(name).await;
        if dataset.is_empty() {
            warn!("{} is missing or empty", store.paths().resource(name).display());
        } else {
            info!("Loaded {} ({} entries)", name, dataset.len());
        }
    }

    let prefix = config.prefix.clone();
    let framework_store = store.clone();

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            command_check: Some(|ctx| Box::pin(commands::checks::rate_limited(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let embed = serenity::CreateEmbed::new()
                                .description(format!("❌ Error: {}", error))
                                .color(colors::ERROR);
                            let _ = ctx.send(poise::CreateReply::default().embed(embed)).await;
                        }
                        err => {
                            if let Err(e) = poise::builtins::on_error(err).await {
                                error!("Error while handling error: {:?}", e);
                            }
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Registering commands...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                let rate_limiter = Arc::new(RateLimiter::default());
                let pruned = rate_limiter.clone();
                tokio::spawn(async move {
                    let mut tick = tokio::time::interval(pruned.window());
                    loop {
                        tick.tick().await;
                        pruned.prune();
                    }
                });

                Ok(Data {
                    store: framework_store,
                    rate_limiter,
                })
            })
        })
        .build();

    // MESSAGE_CONTENT is privileged: enable it in the Discord Dev Portal for
    // prefix commands and chat logging
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {:?}", e);
            return;
        }
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
    Ok(())
}
