// Help command - show usage guide

use poise::serenity_prelude as serenity;
use crate::{Context, Error};
use crate::utils::config::colors;

/// Show help and usage guide
#[poise::command(slash_command, prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("📚 Guild Keeper - Help")
        .description("Server administration backed by per-server config files")
        .color(colors::PRIMARY)
        .field(
            "🛡️ Whitelist",
            "`/whitelist add|remove|list` - Who may run admin commands here\n\
            `/globalwhitelist add|remove|list` - Bot-wide admins\n\
            The server owner is trusted until the first entry is added.",
            false,
        )
        .field(
            "🎭 Reaction Roles",
            "`/reactionrole add` - Map an emoji on a message to a role\n\
            `/reactionrole list` - Show mappings\n\
            `/reactionrole clear` - Remove all mappings",
            false,
        )
        .field(
            "⚙️ Configuration",
            "`/settings` - View this server's configuration\n\
            `/musicchannel set|clear` - Music channel\n\
            `/logging toggle|channel` - Message logging\n\
            `/announcements` - Announcement channel",
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(
            "Built with Serenity & Poise",
        ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
