use super::*;
use crate::commands::music::audio_sources::track_metadata::RequestOrigin;
use crate::commands::music::utils::player::EnqueueOutcome;
use tracing::info;

/// Play a song from JioSaavn
#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "Song to search for"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = match guild_id(ctx) {
        Ok(guild_id) => guild_id,
        Err(err) => return respond(ctx, Err(err)).await,
    };

    let Some(voice_channel) = author_voice_channel(ctx, guild_id) else {
        return respond(ctx, Err(MusicError::UserNotInVoiceChannel)).await;
    };

    // Defer the response since the catalog search might take time
    ctx.defer().await?;

    let origin = match ctx {
        poise::Context::Prefix(prefix) => Some(RequestOrigin {
            channel_id: prefix.msg.channel_id,
            message_id: prefix.msg.id,
        }),
        _ => None,
    };

    let result = ctx
        .data()
        .music
        .play(guild_id, &query, voice_channel, ctx.channel_id(), origin)
        .await;

    match result {
        // The now-playing card answers a prefix request; its message is
        // removed when the track ends.
        Ok((_, EnqueueOutcome::Started)) if origin.is_some() => Ok(()),
        Ok((track, outcome)) => {
            respond(ctx, Ok(embedded_messages::play_outcome(&track, &outcome))).await
        }
        Err(err) => respond(ctx, Err(err)).await,
    }
}
