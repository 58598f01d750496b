use super::*;

/// Disconnect the bot from the voice channel
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let result = match guild_player(ctx) {
        Ok(player) => player.leave().await,
        Err(err) => Err(err),
    };
    respond(ctx, result.map(|_| embedded_messages::notice_reply("Disconnected."))).await
}
