// Chat logging - mirrors guild messages to the `chat` tracing target

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::models::guild;
use crate::utils::store::ConfigStore;

/// Log a guild message if the guild's logging settings allow it
pub async fn handle_message(
    msg: &serenity::Message,
    store: &ConfigStore,
) -> Result<(), anyhow::Error> {
    if msg.author.bot {
        return Ok(());
    }
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let config = store.load_guild_config(guild_id.get()).await;
    if guild::should_log_channel(&config, msg.channel_id.get()) {
        info!(
            target: "chat",
            guild = guild_id.get(),
            channel = msg.channel_id.get(),
            author = %msg.author.name,
            author_id = msg.author.id.get(),
            "{}",
            msg.content
        );
    }

    Ok(())
}
