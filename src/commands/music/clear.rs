use super::*;

/// Remove every queued song, keeping the current one
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn clear(ctx: Context<'_>) -> CommandResult {
    let removed = match guild_player(ctx) {
        Ok(player) => player.clear().await,
        Err(MusicError::NotConnected) => Ok(0),
        Err(err) => Err(err),
    };
    respond(ctx, removed.map(embedded_messages::cleared)).await
}
