// Reaction role handler - grants/revokes roles on reaction add/remove

use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::models::reaction_role;
use crate::utils::store::ConfigStore;

/// Key comparable with [`reaction_role::emoji_key`] of a stored emoji
fn reaction_key(emoji: &serenity::ReactionType) -> Option<String> {
    match emoji {
        serenity::ReactionType::Unicode(s) => Some(s.clone()),
        serenity::ReactionType::Custom { id, .. } => Some(id.get().to_string()),
        _ => None,
    }
}

/// Handle a reaction being added (`added = true`) or removed
pub async fn handle_reaction(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
    store: &ConfigStore,
    added: bool,
) -> Result<(), anyhow::Error> {
    let (Some(guild_id), Some(user_id)) = (reaction.guild_id, reaction.user_id) else {
        return Ok(());
    };
    // Ignore our own seed reactions
    if user_id == ctx.cache.current_user().id {
        return Ok(());
    }
    let Some(key) = reaction_key(&reaction.emoji) else {
        return Ok(());
    };

    let table = store.load_reaction_roles().await;
    let entries = reaction_role::guild_entries(&table, guild_id.get());
    let Some(role_id) = reaction_role::find_role(&entries, reaction.message_id.get(), &key) else {
        return Ok(());
    };
    let role_id = serenity::RoleId::new(role_id);

    if added {
        ctx.http
            .add_member_role(guild_id, user_id, role_id, Some("Reaction role"))
            .await?;
        info!("Granted role {} to {} in guild {}", role_id, user_id, guild_id);
    } else {
        ctx.http
            .remove_member_role(guild_id, user_id, role_id, Some("Reaction role removed"))
            .await?;
        info!("Revoked role {} from {} in guild {}", role_id, user_id, guild_id);
    }
    debug!("Reaction {} on message {}", key, reaction.message_id);

    Ok(())
}
