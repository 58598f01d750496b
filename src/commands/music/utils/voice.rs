//! The voice connection seen from a guild player, and its songbird implementation.

use dashmap::DashMap;
use serenity::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use songbird::input::HttpRequest;
use songbird::tracks::TrackHandle;
use songbird::{Event, Songbird, TrackEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::commands::music::audio_sources::track_metadata::Track;

use super::event_handlers::TrackEndNotifier;
use super::music_manager::{MusicError, MusicResult};
use super::player::TrackEndSignal;

/// Single-track audio output for each guild.
#[async_trait]
pub trait VoiceDriver: Send + Sync {
    /// Joins `channel_id`, moving if already connected elsewhere in the guild.
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()>;

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()>;

    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId>;

    async fn is_connected(&self, guild_id: GuildId) -> bool {
        self.current_channel(guild_id).await.is_some()
    }

    /// Starts `track`, replacing anything already playing. `on_end` fires once
    /// the track ends, errors or is stopped. Failing to open the stream is
    /// reported here rather than through `on_end`.
    async fn play(&self, guild_id: GuildId, track: &Track, on_end: TrackEndSignal)
    -> MusicResult<()>;

    async fn pause(&self, guild_id: GuildId) -> MusicResult<()>;

    async fn resume(&self, guild_id: GuildId) -> MusicResult<()>;

    /// Stops the current track. Its `on_end` signal still fires.
    async fn stop(&self, guild_id: GuildId) -> MusicResult<()>;
}

/// `VoiceDriver` backed by songbird, streaming tracks over HTTP.
pub struct SongbirdDriver {
    manager: Arc<Songbird>,
    http: reqwest::Client,
    handles: DashMap<GuildId, TrackHandle>,
}

impl SongbirdDriver {
    pub fn new(manager: Arc<Songbird>, http: reqwest::Client) -> Self {
        Self {
            manager,
            http,
            handles: DashMap::new(),
        }
    }

    fn handle(&self, guild_id: GuildId) -> MusicResult<TrackHandle> {
        self.handles
            .get(&guild_id)
            .map(|h| h.clone())
            .ok_or(MusicError::NothingPlaying)
    }
}

#[async_trait]
impl VoiceDriver for SongbirdDriver {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        if self.current_channel(guild_id).await == Some(channel_id) {
            return Ok(());
        }

        self.manager
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;
        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        self.handles.remove(&guild_id);

        if self.manager.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        self.manager
            .remove(guild_id)
            .await
            .map_err(|_| MusicError::JoinError("Failed to leave voice channel".to_string()))?;
        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }

    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let call = self.manager.get(guild_id)?;
        let handler = call.lock().await;
        handler
            .current_channel()
            .map(|channel| ChannelId::new(channel.0.get()))
    }

    async fn play(
        &self,
        guild_id: GuildId,
        track: &Track,
        on_end: TrackEndSignal,
    ) -> MusicResult<()> {
        let call = self.manager.get(guild_id).ok_or(MusicError::NotConnected)?;
        let source = HttpRequest::new(self.http.clone(), track.stream_url.clone());

        let handle = {
            let mut handler = call.lock().await;
            handler.play_only_input(source.into())
        };

        for event in [TrackEvent::End, TrackEvent::Error] {
            let notifier = TrackEndNotifier::new(on_end.clone());
            if let Err(e) = handle.add_event(Event::Track(event), notifier) {
                warn!("Failed to register track event for guild {}: {}", guild_id, e);
            }
        }

        // Probe now so a dead stream fails the start instead of the callback.
        if let Err(e) = handle.make_playable_async().await {
            if let Err(stop_err) = handle.stop() {
                debug!("Stopping unplayable track in guild {}: {}", guild_id, stop_err);
            }
            return Err(MusicError::PlaybackStart(e.to_string()));
        }

        debug!("Started '{}' in guild {}", track.title, guild_id);
        self.handles.insert(guild_id, handle);
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId) -> MusicResult<()> {
        self.handle(guild_id)?
            .pause()
            .map_err(|_| MusicError::NothingPlaying)
    }

    async fn resume(&self, guild_id: GuildId) -> MusicResult<()> {
        self.handle(guild_id)?
            .play()
            .map_err(|_| MusicError::NothingPaused)
    }

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let (_, handle) = self
            .handles
            .remove(&guild_id)
            .ok_or(MusicError::NothingPlaying)?;

        match handle.stop() {
            Ok(()) => Ok(()),
            Err(songbird::error::ControlError::Finished) => Err(MusicError::NothingPlaying),
            Err(e) => {
                warn!("Error stopping track in guild {}: {}", guild_id, e);
                Err(MusicError::NothingPlaying)
            }
        }
    }
}
