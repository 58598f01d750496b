use super::*;

/// Show the current song
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn nowplaying(ctx: Context<'_>) -> CommandResult {
    let reply = match guild_player(ctx) {
        Ok(player) => player.snapshot().await.and_then(|snapshot| {
            snapshot
                .now_playing
                .as_ref()
                .map(embedded_messages::now_playing_reply)
                .ok_or(MusicError::NothingPlaying)
        }),
        Err(MusicError::NotConnected) => Err(MusicError::NothingPlaying),
        Err(err) => Err(err),
    };
    respond(ctx, reply).await
}
