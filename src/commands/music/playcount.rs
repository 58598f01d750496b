use super::*;

/// Show the play count of the current song, or of the next one
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn playcount(ctx: Context<'_>) -> CommandResult {
    let snapshot = match guild_player(ctx) {
        Ok(player) => player.snapshot().await.map(Some),
        Err(MusicError::NotConnected) => Ok(None),
        Err(err) => Err(err),
    };

    let reply = snapshot.map(|snapshot| {
        let store = ctx.data().music.play_counts();
        let now_playing = snapshot.as_ref().and_then(|s| s.now_playing.as_ref());
        let next_up = snapshot.as_ref().and_then(|s| s.queue.first());

        match (now_playing, next_up) {
            (Some(track), _) => embedded_messages::play_count(track, store.get(&track.id()), true),
            (None, Some(track)) => {
                embedded_messages::play_count(track, store.get(&track.id()), false)
            }
            (None, None) => embedded_messages::notice_reply("Nothing is playing or queued."),
        }
    });
    respond(ctx, reply).await
}
