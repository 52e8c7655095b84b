// Command checks shared by privileged commands

use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::utils::auth;
use crate::utils::config::colors;
use crate::{Context, Error};

async fn guild_owner(ctx: Context<'_>, guild_id: serenity::GuildId) -> Option<serenity::UserId> {
    // Cache guard must not live across the await below
    let cached = ctx.guild().map(|g| g.owner_id);
    match cached {
        Some(owner) => Some(owner),
        None => guild_id
            .to_partial_guild(ctx.serenity_context())
            .await
            .ok()
            .map(|g| g.owner_id),
    }
}

async fn deny(ctx: Context<'_>, scope: &str) -> Result<bool, Error> {
    debug!("Denied {} for {} ({} scope)", ctx.command().qualified_name, ctx.author().id, scope);
    let embed = serenity::CreateEmbed::new()
        .title("Not allowed")
        .description(format!("You are not on the {} whitelist.", scope))
        .color(colors::ERROR);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(false)
}

/// Global whitelist, or this guild's whitelist (with first-use owner trust)
pub async fn server_whitelisted(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(false);
    };
    let user_id = ctx.author().id;
    let is_owner = guild_owner(ctx, guild_id).await == Some(user_id);

    let allowed = auth::is_authorized(
        &ctx.data().store,
        user_id.get(),
        Some(guild_id.get()),
        is_owner,
    )
    .await;
    if allowed {
        Ok(true)
    } else {
        deny(ctx, "server").await
    }
}

/// Bot-wide whitelist only
pub async fn global_whitelisted(ctx: Context<'_>) -> Result<bool, Error> {
    if auth::is_authorized_global(&ctx.data().store, ctx.author().id.get()).await {
        Ok(true)
    } else {
        deny(ctx, "global").await
    }
}

/// Runs before every command
pub async fn rate_limited(ctx: Context<'_>) -> Result<bool, Error> {
    match ctx.data().rate_limiter.check(ctx.author().id.get()) {
        Ok(()) => Ok(true),
        Err(wait) => {
            let embed = serenity::CreateEmbed::new()
                .title("Slow down")
                .description(format!(
                    "Try again in {:.1}s.",
                    wait.as_secs_f32().max(0.1)
                ))
                .color(colors::WARNING);
            ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
                .await?;
            Ok(false)
        }
    }
}
