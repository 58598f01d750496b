use super::*;

/// Show the queue
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let reply = match guild_player(ctx) {
        Ok(player) => player.snapshot().await.map(|snapshot| {
            embedded_messages::queue_view(snapshot.now_playing.as_ref(), &snapshot.queue)
        }),
        Err(MusicError::NotConnected) => Ok(embedded_messages::queue_view(None, &[])),
        Err(err) => Err(err),
    };
    respond(ctx, reply).await
}
