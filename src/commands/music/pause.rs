use super::*;

/// Pause the current track
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let result = match guild_player(ctx) {
        Ok(player) => player.pause().await,
        Err(err) => Err(err),
    };
    respond(ctx, result.map(|_| embedded_messages::notice_reply("Paused."))).await
}
