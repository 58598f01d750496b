use super::*;

/// Skip the current track
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let result = match guild_player(ctx) {
        Ok(player) => player.skip().await,
        Err(err) => Err(err),
    };
    respond(ctx, result.map(|_| embedded_messages::notice_reply("Skipped."))).await
}
