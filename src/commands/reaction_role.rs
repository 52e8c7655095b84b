// Reaction role setup - map emoji on a message to roles

use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::models::reaction_role::{self, ReactionRoleMessage};
use crate::utils::config::colors;
use crate::{Context, Error};

/// Parse a message link into (channel_id, message_id)
fn parse_message_link(input: &str) -> Option<(u64, u64)> {
    // Format: https://discord.com/channels/GUILD_ID/CHANNEL_ID/MESSAGE_ID
    if !input.contains("/channels/") {
        return None;
    }
    let mut parts = input.trim().trim_end_matches('/').rsplit('/');
    let message_id: u64 = parts.next()?.parse().ok()?;
    let channel_id: u64 = parts.next()?.parse().ok()?;
    if message_id == 0 || channel_id == 0 {
        return None;
    }
    Some((channel_id, message_id))
}

/// Manage reaction roles in this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("add", "list", "clear"),
    subcommand_required
)]
pub async fn reactionrole(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Give a role to everyone who reacts with an emoji on a message
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Link to the message"] message_link: String,
    #[description = "Emoji to react with"] emoji: String,
    #[description = "Role to grant"] role: serenity::Role,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let Some((channel_id, message_id)) = parse_message_link(&message_link) else {
        ctx.say("That is not a valid message link.").await?;
        return Ok(());
    };
    let emoji = emoji.trim().to_string();
    if emoji.is_empty() {
        ctx.say("Please give an emoji.").await?;
        return Ok(());
    }

    ctx.defer().await?;

    let role_id = role.id.get();
    let stored_emoji = emoji.clone();
    let gid = guild_id.get();
    let added = ctx
        .data()
        .store
        .update_reaction_roles(move |table| {
            reaction_role::add_mapping(table, gid, channel_id, message_id, &stored_emoji, role_id)
        })
        .await?;
    if !added {
        warn!("Reaction-role data for guild {} is malformed", guild_id);
        ctx.say("The stored reaction roles for this server are malformed. Run `reactionrole clear` first.")
            .await?;
        return Ok(());
    }
    info!(
        "Reaction role {} -> {} on message {} in guild {}",
        emoji, role_id, message_id, guild_id
    );

    // Seed the reaction so members have something to click
    match serenity::ReactionType::try_from(emoji.as_str()) {
        Ok(reaction) => {
            if let Err(e) = serenity::ChannelId::new(channel_id)
                .create_reaction(ctx.http(), serenity::MessageId::new(message_id), reaction)
                .await
            {
                warn!("Could not react on message {}: {:?}", message_id, e);
            }
        }
        Err(e) => warn!("Could not parse emoji {:?}: {:?}", emoji, e),
    }

    let embed = serenity::CreateEmbed::new()
        .title("Reaction Role Added")
        .description(format!(
            "Reacting with {} on [this message](https://discord.com/channels/{}/{}/{}) grants <@&{}>.",
            emoji, guild_id, channel_id, message_id, role_id
        ))
        .color(colors::SUCCESS);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn describe(entry: &ReactionRoleMessage, guild_id: serenity::GuildId) -> String {
    let roles = entry
        .roles
        .iter()
        .map(|r| format!("{} → <@&{}>", r.emoji, r.role_id))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "[Message](https://discord.com/channels/{}/{}/{}): {}",
        guild_id, entry.channel_id, entry.message_id, roles
    )
}

/// Show reaction roles configured in this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let table = ctx.data().store.load_reaction_roles().await;
    let entries = reaction_role::guild_entries(&table, guild_id.get());

    let description = if entries.is_empty() {
        "*No reaction roles set up.*".to_string()
    } else {
        entries
            .iter()
            .map(|e| describe(e, guild_id))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let embed = serenity::CreateEmbed::new()
        .title("Reaction Roles")
        .description(description)
        .color(colors::INFO);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Remove every reaction role in this server
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    check = "crate::commands::checks::server_whitelisted"
)]
pub async fn clear(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server.")?;
    let gid = guild_id.get();
    let cleared = ctx
        .data()
        .store
        .update_reaction_roles(move |table| reaction_role::clear_guild(table, gid))
        .await?;

    if cleared {
        info!("Cleared reaction roles for guild {}", guild_id);
        ctx.say("All reaction roles for this server were removed.").await?;
    } else {
        ctx.say("There were no reaction roles to remove.").await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_link() {
        assert_eq!(
            parse_message_link("https://discord.com/channels/1/22/333"),
            Some((22, 333))
        );
        assert_eq!(
            parse_message_link("https://discord.com/channels/1/22/333/"),
            Some((22, 333))
        );
        assert_eq!(parse_message_link("333"), None);
        assert_eq!(parse_message_link("https://discord.com/channels/1/x/333"), None);
        assert_eq!(parse_message_link("https://discord.com/channels/1/0/333"), None);
    }
}
