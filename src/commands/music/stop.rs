use super::*;
use crate::commands::music::utils::player::StopOutcome;

/// Stop music and clear the queue
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let outcome = match guild_player(ctx) {
        Ok(player) => player.stop().await,
        // A guild that never played has nothing to stop.
        Err(MusicError::NotConnected) => Ok(StopOutcome::Disconnected),
        Err(err) => Err(err),
    };
    respond(ctx, outcome.map(embedded_messages::stopped)).await
}
