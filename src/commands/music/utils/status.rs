//! Where a guild player reports what it is doing.

use poise::serenity_prelude as serenity;
use serenity::all::{CreateMessage, EditMessage};
use serenity::async_trait;
use serenity::model::id::{ChannelId, MessageId};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::commands::music::audio_sources::track_metadata::Track;

use super::{button_controls, embedded_messages};

/// Best-effort status messages. Failures are logged, never returned.
#[async_trait]
pub trait StatusChannel: Send + Sync {
    /// Posts the now-playing card with player buttons.
    async fn send_now_playing(
        &self,
        channel_id: ChannelId,
        track: &Track,
        play_count: u64,
    ) -> Option<MessageId>;

    async fn send_notice(&self, channel_id: ChannelId, text: &str) -> Option<MessageId>;

    /// Redraws the player buttons of a now-playing card.
    async fn set_paused(&self, channel_id: ChannelId, message_id: MessageId, paused: bool);

    /// Deletes a message, tolerating one that is already gone.
    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId);
}

/// `StatusChannel` that posts to Discord text channels.
pub struct DiscordStatus {
    http: Arc<serenity::Http>,
    now_playing_emoji: Option<String>,
}

impl DiscordStatus {
    pub fn new(http: Arc<serenity::Http>, now_playing_emoji_id: Option<u64>) -> Self {
        Self {
            http,
            now_playing_emoji: now_playing_emoji_id.map(|id| format!("<:np:{}>", id)),
        }
    }
}

#[async_trait]
impl StatusChannel for DiscordStatus {
    async fn send_now_playing(
        &self,
        channel_id: ChannelId,
        track: &Track,
        play_count: u64,
    ) -> Option<MessageId> {
        let message = CreateMessage::new()
            .embed(embedded_messages::now_playing(
                track,
                play_count,
                self.now_playing_emoji.as_deref(),
            ))
            .components(button_controls::create_music_control_buttons(false));

        match channel_id.send_message(&self.http, message).await {
            Ok(sent) => Some(sent.id),
            Err(e) => {
                warn!("Failed to send now-playing card in {}: {}", channel_id, e);
                None
            }
        }
    }

    async fn send_notice(&self, channel_id: ChannelId, text: &str) -> Option<MessageId> {
        let message = CreateMessage::new().embed(embedded_messages::notice(text));
        match channel_id.send_message(&self.http, message).await {
            Ok(sent) => Some(sent.id),
            Err(e) => {
                warn!("Failed to send message in {}: {}", channel_id, e);
                None
            }
        }
    }

    async fn set_paused(&self, channel_id: ChannelId, message_id: MessageId, paused: bool) {
        let edit =
            EditMessage::new().components(button_controls::create_music_control_buttons(paused));
        if let Err(e) = channel_id.edit_message(&self.http, message_id, edit).await {
            debug!("Could not update buttons on message {}: {}", message_id, e);
        }
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) {
        if let Err(e) = channel_id.delete_message(&self.http, message_id).await {
            debug!(
                "Could not delete message {} in channel {}: {}",
                message_id, channel_id, e
            );
        }
    }
}
