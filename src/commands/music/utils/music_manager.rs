use dashmap::DashMap;
use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::commands::music::audio_sources::Catalog;
use crate::commands::music::audio_sources::track_metadata::{RequestOrigin, Track};
use crate::utils::database::SettingsDb;
use crate::utils::play_counts::PlayCountStore;

use super::player::{EnqueueOutcome, GuildPlayer, PlayerDeps, Stay247Change};

/// Errors that can occur during music operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("No result found for '{0}'")]
    NotFound(String),

    #[error("Playback failed: {0}")]
    PlaybackStart(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Track completion for guild {0} was not delivered in time")]
    CallbackTimeout(GuildId),

    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Nothing is paused")]
    NothingPaused,

    #[error("Queue is empty")]
    QueueEmpty,

    #[error("Need at least 2 songs to sort")]
    QueueTooShort,

    #[error("24/7 mode is enabled")]
    Stay247Enabled,

    #[error("Guild player is not running")]
    PlayerUnavailable,
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Registry of per-guild players. Players are created on first use and live
/// for the rest of the process.
pub struct MusicManager {
    players: DashMap<GuildId, GuildPlayer>,
    catalog: Arc<dyn Catalog>,
    deps: PlayerDeps,
    settings: Option<SettingsDb>,
}

impl MusicManager {
    pub fn new(catalog: Arc<dyn Catalog>, deps: PlayerDeps, settings: Option<SettingsDb>) -> Self {
        Self {
            players: DashMap::new(),
            catalog,
            deps,
            settings,
        }
    }

    /// The player for `guild_id`, spawning it if this is the first request.
    pub fn player(&self, guild_id: GuildId) -> GuildPlayer {
        self.players
            .entry(guild_id)
            .or_insert_with(|| {
                info!("Spawning player for guild {}", guild_id);
                GuildPlayer::spawn(guild_id, self.deps.clone())
            })
            .clone()
    }

    /// The player for `guild_id` if one was ever created.
    pub fn existing_player(&self, guild_id: GuildId) -> Option<GuildPlayer> {
        self.players.get(&guild_id).map(|p| p.clone())
    }

    pub fn play_counts(&self) -> &Arc<PlayCountStore> {
        &self.deps.play_counts
    }

    /// Resolves `query` in the catalog and hands the result to the guild's player.
    pub async fn play(
        &self,
        guild_id: GuildId,
        query: &str,
        voice_channel: ChannelId,
        text_channel: ChannelId,
        origin: Option<RequestOrigin>,
    ) -> MusicResult<(Track, EnqueueOutcome)> {
        let track = self
            .catalog
            .search_first_track(query)
            .await
            .ok_or_else(|| MusicError::NotFound(query.to_string()))?
            .with_origin(origin);

        let outcome = self
            .player(guild_id)
            .enqueue(track.clone(), voice_channel, text_channel)
            .await?;
        Ok((track, outcome))
    }

    /// Flips 24/7 mode for a guild and records the new setting.
    pub async fn toggle_247(
        &self,
        guild_id: GuildId,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
    ) -> MusicResult<Stay247Change> {
        let change = self
            .player(guild_id)
            .toggle_247(voice_channel, text_channel)
            .await?;

        if let Err(e) = self.persist_247(guild_id, change, text_channel).await {
            error!("Failed to store 24/7 setting for guild {}: {}", guild_id, e);
        }
        Ok(change)
    }

    async fn persist_247(
        &self,
        guild_id: GuildId,
        change: Stay247Change,
        text_channel: ChannelId,
    ) -> MusicResult<()> {
        let Some(db) = self.settings.clone() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || match change {
            Stay247Change::Enabled { voice_channel } => {
                db.set_stay_247(guild_id, voice_channel, Some(text_channel))
            }
            Stay247Change::Disabled => db.remove_stay_247(guild_id),
        })
        .await
        .map_err(|e| MusicError::Persistence(e.to_string()))?
        .map_err(|e| MusicError::Persistence(e.to_string()))
    }

    /// Rejoins every guild stored with 24/7 mode enabled. Returns how many
    /// guilds were restored.
    pub async fn restore_247(&self) -> usize {
        let Some(db) = self.settings.clone() else {
            return 0;
        };

        let settings = match tokio::task::spawn_blocking(move || db.load_stay_247()).await {
            Ok(Ok(settings)) => settings,
            Ok(Err(e)) => {
                error!("Failed to load 24/7 settings: {}", e);
                return 0;
            }
            Err(e) => {
                error!("24/7 settings loader panicked: {}", e);
                return 0;
            }
        };

        let mut restored = 0;
        for setting in settings {
            let player = self.player(setting.guild_id);
            match player
                .restore_247(setting.voice_channel_id, setting.text_channel_id)
                .await
            {
                Ok(()) => {
                    info!(
                        "Restored 24/7 mode for guild {} in channel {}",
                        setting.guild_id, setting.voice_channel_id
                    );
                    restored += 1;
                }
                Err(e) => warn!(
                    "Could not restore 24/7 mode for guild {}: {}",
                    setting.guild_id, e
                ),
            }
        }
        restored
    }
}
