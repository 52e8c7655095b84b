// Per-server settings stored in servers/<guild_id>.json

use poise::serenity_prelude as serenity;
use poise::ChoiceParameter as _;
use tracing::info;

use crate::models::{guild, whitelist};
use crate::utils::config::colors;
use crate::{Context, Error};

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Toggle {
    #[name = "on"]
    On,
    #[name = "off"]
    Off,
}

impl Toggle {
    fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

fn channel_mention(id: Option<u64>) -> String {
    id.map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Not set".to_string())
}

async fn confirm(ctx: Context<'_>, title: &str, description: String) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(colors::SUCCESS);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show this server's configuration
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let config = ctx.data().store.load_guild_config(guild_id.get()).await;

    let logging = if guild::logging_activated(&config) { "On" } else { "Off" };
    let announcements = match guild::announcements(&config) {
        Some((true, channel)) => format!("On ({})", channel_mention(channel)),
        Some((false, _)) | None => "Off".to_string(),
    };

    let embed = serenity::CreateEmbed::new()
        .title("Server Configuration")
        .field("Music Channel", channel_mention(guild::music_channel_id(&config)), true)
        .field("Message Logging", logging, true)
        .field("Announcements", announcements, true)
        .field(
            "Whitelisted Users",
            whitelist::entries(&config).len().to_string(),
            true,
        )
        .color(colors::INFO);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Configure the music channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("music_set", "music_clear"),
    subcommand_required
)]
pub async fn musicchannel(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Use a channel for music commands
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "set",
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn music_set(
    ctx: Context<'_>,
    #[description = "Channel for music"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let channel_id = channel.id.get();
    ctx.data()
        .store
        .update_guild_config(guild_id.get(), move |doc| {
            guild::set_music_channel_id(doc, Some(channel_id))
        })
        .await?;
    info!("Music channel for guild {} set to {}", guild_id, channel_id);
    confirm(ctx, "Music Channel Updated", format!("Music channel set to <#{}>", channel_id)).await
}

/// Stop restricting music commands to one channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "clear",
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn music_clear(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    ctx.data()
        .store
        .update_guild_config(guild_id.get(), |doc| guild::set_music_channel_id(doc, None))
        .await?;
    confirm(ctx, "Music Channel Updated", "Music channel cleared.".to_string()).await
}

/// Configure message logging
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("logging_toggle", "logging_channel"),
    subcommand_required
)]
pub async fn logging(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Turn message logging on or off for this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "toggle",
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn logging_toggle(
    ctx: Context<'_>,
    #[description = "on or off"] state: Toggle,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let enabled = state.enabled();
    ctx.data()
        .store
        .update_guild_config(guild_id.get(), move |doc| {
            guild::set_logging_activated(doc, enabled)
        })
        .await?;
    info!("Logging for guild {} set to {}", guild_id, enabled);
    confirm(ctx, "Logging Updated", format!("Message logging is now **{}**.", state.name())).await
}

/// Include or exclude a channel from message logging
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    rename = "channel",
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn logging_channel(
    ctx: Context<'_>,
    #[description = "Channel to change"] channel: serenity::GuildChannel,
    #[description = "on or off"] state: Toggle,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let channel_id = channel.id.get();
    let enabled = state.enabled();
    ctx.data()
        .store
        .update_guild_config(guild_id.get(), move |doc| {
            guild::set_channel_logging(doc, channel_id, enabled)
        })
        .await?;
    confirm(
        ctx,
        "Logging Updated",
        format!("Logging in <#{}> is now **{}**.", channel_id, state.name()),
    )
    .await
}

/// Turn announcements on or off, optionally choosing their channel
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn announcements(
    ctx: Context<'_>,
    #[description = "on or off"] state: Toggle,
    #[description = "Channel for announcements"] channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let enabled = state.enabled();
    let channel_id = channel.map(|c| c.id.get());
    let current = ctx
        .data()
        .store
        .update_guild_config(guild_id.get(), move |doc| {
            guild::set_announcements(doc, enabled, channel_id);
            guild::announcements(doc)
        })
        .await?;

    let channel = current.and_then(|(_, channel)| channel);
    confirm(
        ctx,
        "Announcements Updated",
        format!(
            "Announcements are **{}** (channel: {}).",
            state.name(),
            channel_mention(channel)
        ),
    )
    .await
}
