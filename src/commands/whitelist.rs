// Whitelist management - per-guild and bot-wide

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::models::whitelist;
use crate::utils::config::colors;
use crate::{Context, Error};

fn list_embed(title: &str, ids: &[String]) -> serenity::CreateEmbed {
    let description = if ids.is_empty() {
        "*Nobody is whitelisted.*".to_string()
    } else {
        ids.iter()
            .map(|id| format!("• <@{}> (`{}`)", id, id))
            .collect::<Vec<_>>()
            .join("\n")
    };
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(colors::INFO)
}

async fn reply(ctx: Context<'_>, changed: bool, done: String, unchanged: String) -> Result<(), Error> {
    let (text, color) = if changed {
        (done, colors::SUCCESS)
    } else {
        (unchanged, colors::WARNING)
    };
    let embed = serenity::CreateEmbed::new().description(text).color(color);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Manage who may run privileged commands in this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("add", "remove", "list"),
    subcommand_required
)]
pub async fn whitelist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add a user to this server's whitelist
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "User to whitelist"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let id = user.id.to_string();

    let added = {
        let id = id.clone();
        ctx.data()
            .store
            .update_guild_config(guild_id.get(), move |doc| whitelist::add(doc, &id))
            .await?
    };
    if added {
        info!("{} whitelisted {} in guild {}", ctx.author().id, id, guild_id);
    }

    reply(
        ctx,
        added,
        format!("<@{}> can now use privileged commands here.", id),
        format!("<@{}> is already whitelisted.", id),
    )
    .await
}

/// Remove a user from this server's whitelist
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "User to remove"] user: serenity::User,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let id = user.id.to_string();

    let removed = {
        let id = id.clone();
        ctx.data()
            .store
            .update_guild_config(guild_id.get(), move |doc| whitelist::remove(doc, &id))
            .await?
    };
    if removed {
        info!("{} removed {} from whitelist in guild {}", ctx.author().id, id, guild_id);
    }

    reply(
        ctx,
        removed,
        format!("<@{}> was removed from the whitelist.", id),
        format!("<@{}> was not whitelisted.", id),
    )
    .await
}

/// Show this server's whitelist
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let config = ctx.data().store.load_guild_config(guild_id.get()).await;
    let embed = list_embed("Server Whitelist", &whitelist::entries(&config));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Manage the bot-wide whitelist
#[poise::command(
    slash_command,
    prefix_command,
    subcommands("global_add", "global_remove", "global_list"),
    subcommand_required
)]
pub async fn globalwhitelist(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add a user to the bot-wide whitelist
#[poise::command(
    slash_command,
    prefix_command,
    rename = "add",
    check = "crate::commands::checks::global_whitelisted"
)]
pub async fn global_add(
    ctx: Context<'_>,
    #[description = "User to whitelist"] user: serenity::User,
) -> Result<(), Error> {
    let id = user.id.to_string();
    let added = {
        let id = id.clone();
        ctx.data()
            .store
            .update_global_config(move |doc| whitelist::add(doc, &id))
            .await?
    };
    if added {
        info!("{} added {} to the global whitelist", ctx.author().id, id);
    }

    reply(
        ctx,
        added,
        format!("<@{}> is now a global admin.", id),
        format!("<@{}> is already a global admin.", id),
    )
    .await
}

/// Remove a user from the bot-wide whitelist
#[poise::command(
    slash_command,
    prefix_command,
    rename = "remove",
    check = "crate::commands::checks::global_whitelisted"
)]
pub async fn global_remove(
    ctx: Context<'_>,
    #[description = "User to remove"] user: serenity::User,
) -> Result<(), Error> {
    let id = user.id.to_string();
    let removed = {
        let id = id.clone();
        ctx.data()
            .store
            .update_global_config(move |doc| whitelist::remove(doc, &id))
            .await?
    };
    if removed {
        info!("{} removed {} from the global whitelist", ctx.author().id, id);
    }

    reply(
        ctx,
        removed,
        format!("<@{}> is no longer a global admin.", id),
        format!("<@{}> was not a global admin.", id),
    )
    .await
}

/// Show the bot-wide whitelist
#[poise::command(
    slash_command,
    prefix_command,
    rename = "list",
    check = "crate::commands::checks::global_whitelisted"
)]
pub async fn global_list(ctx: Context<'_>) -> Result<(), Error> {
    let config = ctx.data().store.load_global_config().await;
    let embed = list_embed("Global Whitelist", &whitelist::entries(&config));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
