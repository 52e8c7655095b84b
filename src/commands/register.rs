// Owner-only slash command maintenance

use tracing::info;

use crate::{Context, Error};

/// Show buttons for the bot owner to register or delete the slash commands.
///
/// Startup already registers everything globally; this is for pushing
/// changes to a single guild while testing, or removing stale commands.
#[poise::command(prefix_command, hide_in_help, owners_only)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    info!(
        "{} opened slash command registration in {:?}",
        ctx.author().id,
        ctx.guild_id()
    );
    poise::builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}
