use poise::serenity_prelude::{self as serenity, Context};
use serenity::ComponentInteraction;
use tracing::{error, info};

use crate::{Data, Error};

use super::button_controls::{PAUSE_RESUME_BUTTON, SKIP_BUTTON, STOP_BUTTON};
use super::music_manager::MusicError;
use super::player::StopOutcome;
use super::queue_manager::PlaybackStatus;

/// Whether a component interaction belongs to the player buttons
pub fn is_music_button(custom_id: &str) -> bool {
    matches!(custom_id, PAUSE_RESUME_BUTTON | SKIP_BUTTON | STOP_BUTTON)
}

/// Handle a click on one of the now-playing buttons
pub async fn handle_button_interaction(
    ctx: &Context,
    interaction: &ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let guild_id = interaction.guild_id.ok_or(MusicError::NotInGuild)?;

    // Defer the interaction response immediately
    interaction.defer(ctx).await?;

    let Some(player) = data.music.existing_player(guild_id) else {
        return ephemeral_followup(ctx, interaction, "I am not in a voice channel.").await;
    };

    match interaction.data.custom_id.as_str() {
        PAUSE_RESUME_BUTTON => {
            let snapshot = player.snapshot().await?;
            let result = match snapshot.status {
                PlaybackStatus::Paused => player.resume().await.map(|_| false),
                PlaybackStatus::Playing => player.pause().await.map(|_| true),
                _ => Err(MusicError::NothingPlaying),
            };

            match result {
                // The player redraws the card's buttons itself.
                Ok(paused) => {
                    info!("Toggled pause via button in guild {} (paused: {})", guild_id, paused);
                }
                Err(_) => {
                    ephemeral_followup(ctx, interaction, "Nothing is playing.").await?;
                }
            }
        }
        SKIP_BUTTON => match player.skip().await {
            Ok(_) => ephemeral_followup(ctx, interaction, "Skipped.").await?,
            Err(_) => ephemeral_followup(ctx, interaction, "Nothing to skip.").await?,
        },
        STOP_BUTTON => {
            let content = match player.stop().await? {
                StopOutcome::StayedConnected => {
                    "Stopped current playback. 24/7 is enabled, so I will stay connected."
                }
                StopOutcome::Disconnected => "Stopped and disconnected.",
            };
            ephemeral_followup(ctx, interaction, content).await?;
        }
        other => {
            error!("Unknown button ID: {}", other);
            ephemeral_followup(ctx, interaction, "Unknown button action.").await?;
        }
    }

    Ok(())
}

/// Send an ephemeral followup message for a deferred interaction
async fn ephemeral_followup(
    ctx: &Context,
    interaction: &ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(PAUSE_RESUME_BUTTON, true ; "pause resume")]
    #[test_case(SKIP_BUTTON, true ; "skip")]
    #[test_case(STOP_BUTTON, true ; "stop")]
    #[test_case("music_queue_toggle", false ; "unknown music id")]
    #[test_case("", false ; "empty")]
    fn test_is_music_button(custom_id: &str, expected: bool) {
        assert_eq!(is_music_button(custom_id), expected);
    }
}
