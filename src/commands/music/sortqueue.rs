use super::*;

/// Sort the queue by play count (most played first)
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn sortqueue(ctx: Context<'_>) -> CommandResult {
    let sorted = match guild_player(ctx) {
        Ok(player) => player.sort_queue().await,
        Err(MusicError::NotConnected) => Err(MusicError::QueueEmpty),
        Err(err) => Err(err),
    };
    respond(ctx, sorted.map(embedded_messages::queue_sorted)).await
}
