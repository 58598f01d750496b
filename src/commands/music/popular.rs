use super::*;

/// Largest list `popular` will show.
const MAX_LIMIT: usize = 20;

/// Show the most played songs
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn popular(
    ctx: Context<'_>,
    #[description = "How many songs to show (max 20)"] limit: Option<u32>,
) -> CommandResult {
    if let Err(err) = guild_id(ctx) {
        return respond(ctx, Err(err)).await;
    }

    let limit = (limit.unwrap_or(10) as usize).min(MAX_LIMIT);
    let top = ctx.data().music.play_counts().top_n(limit);
    respond(ctx, Ok(embedded_messages::popular(&top))).await
}
