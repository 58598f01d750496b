use super::*;

/// Resume the paused track
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let result = match guild_player(ctx) {
        Ok(player) => player.resume().await,
        Err(err) => Err(err),
    };
    respond(ctx, result.map(|_| embedded_messages::notice_reply("Resumed."))).await
}
