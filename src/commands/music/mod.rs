pub mod clear;
pub mod leave;
pub mod nowplaying;
pub mod pause;
pub mod play;
pub mod playcount;
pub mod popular;
pub mod queue;
pub mod resume;
pub mod skip;
pub mod sortqueue;
pub mod stop;
pub mod twenty_four_seven;

pub mod audio_sources;
pub mod utils;

use poise::CreateReply;
use serenity::model::id::{ChannelId, GuildId};

use crate::{CommandResult, Context};
use utils::cleanup::reply_and_cleanup;
use utils::embedded_messages;
use utils::music_manager::{MusicError, MusicResult};
use utils::player::GuildPlayer;

fn guild_id(ctx: Context<'_>) -> MusicResult<GuildId> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

/// The player of the invoking guild, if the bot has played there before.
fn guild_player(ctx: Context<'_>) -> MusicResult<GuildPlayer> {
    ctx.data()
        .music
        .existing_player(guild_id(ctx)?)
        .ok_or(MusicError::NotConnected)
}

/// The voice channel the command author is connected to.
fn author_voice_channel(ctx: Context<'_>, guild_id: GuildId) -> Option<ChannelId> {
    let guild = ctx.serenity_context().cache.guild(guild_id)?;
    guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|state| state.channel_id)
}

/// Replies with the embed for `result`, or the matching error message.
async fn respond(ctx: Context<'_>, result: MusicResult<CreateReply>) -> CommandResult {
    let reply = match result {
        Ok(reply) => reply,
        Err(err) => embedded_messages::music_error(&err),
    };
    reply_and_cleanup(ctx, reply).await
}
