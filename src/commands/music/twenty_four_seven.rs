use super::*;

/// Toggle 24/7 mode: stay in voice and auto-play popular songs
#[poise::command(prefix_command, slash_command, rename = "247", category = "Music")]
pub async fn twenty_four_seven(ctx: Context<'_>) -> CommandResult {
    let guild_id = match guild_id(ctx) {
        Ok(guild_id) => guild_id,
        Err(err) => return respond(ctx, Err(err)).await,
    };
    let voice_channel = author_voice_channel(ctx, guild_id);

    let change = ctx
        .data()
        .music
        .toggle_247(guild_id, voice_channel, ctx.channel_id())
        .await;
    respond(ctx, change.map(embedded_messages::stay_247_status)).await
}
