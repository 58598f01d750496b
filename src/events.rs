use poise::serenity_prelude as serenity;
use serenity::{FullEvent, Interaction};
use tracing::{debug, error};

use crate::commands::music::utils::button_handlers::{handle_button_interaction, is_music_button};
use crate::{Data, Error};

/// Gateway events the framework does not handle itself
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::InteractionCreate {
            interaction: Interaction::Component(component),
        } if is_music_button(&component.data.custom_id) => {
            if let Err(e) = handle_button_interaction(ctx, component, data).await {
                error!("Error handling component interaction: {}", e);
            }
        }
        FullEvent::VoiceStateUpdate { new, .. } => {
            let is_bot = new.member.as_ref().is_some_and(|m| m.user.bot)
                || new.user_id == ctx.cache.current_user().id;
            if is_bot {
                return Ok(());
            }

            // Someone joined or left: a 24/7 guild with nothing to play refills.
            if let Some(player) = new.guild_id.and_then(|g| data.music.existing_player(g)) {
                debug!("Voice state changed in guild {}", player.guild_id());
                player.refill().await;
            }
        }
        _ => {}
    }
    Ok(())
}
