//! In-memory stand-ins for the catalog, the voice connection and the
//! status channel.

use async_trait::async_trait;
use chord::commands::music::audio_sources::Catalog;
use chord::commands::music::audio_sources::track_metadata::Track;
use chord::commands::music::utils::music_manager::{MusicError, MusicResult};
use chord::commands::music::utils::player::TrackEndSignal;
use chord::commands::music::utils::status::StatusChannel;
use chord::commands::music::utils::voice::VoiceDriver;
use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Catalog answering from a fixed query -> track table.
#[derive(Default)]
pub struct FakeCatalog {
    tracks: HashMap<String, Track>,
    delay: Duration,
    queries: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, track: Track) -> Self {
        self.tracks.insert(query.to_string(), track);
        self
    }

    /// Makes every lookup take `delay`.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_first_track(&self, query: &str) -> Option<Track> {
        self.queries.lock().unwrap().push(query.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.tracks.get(query).cloned()
    }

    async fn search_similar_track(
        &self,
        _seed: &Track,
        _exclude_keys: &HashSet<String>,
    ) -> Option<Track> {
        None
    }
}

#[derive(Default)]
struct VoiceState {
    channels: HashMap<GuildId, ChannelId>,
    current: HashMap<GuildId, TrackEndSignal>,
    finished: HashMap<GuildId, TrackEndSignal>,
    played: Vec<String>,
    failing_streams: HashSet<String>,
    joins: usize,
    leaves: usize,
}

/// Voice connection that plays nothing; tests end tracks by hand.
#[derive(Default)]
pub struct FakeVoice {
    state: Mutex<VoiceState>,
}

impl FakeVoice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_stream(&self, stream_url: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_streams
            .insert(stream_url.to_string());
    }

    /// Identities of every track handed to `play`, in order.
    pub fn played(&self) -> Vec<String> {
        self.state.lock().unwrap().played.clone()
    }

    pub fn channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.state.lock().unwrap().channels.get(&guild_id).copied()
    }

    pub fn joins(&self) -> usize {
        self.state.lock().unwrap().joins
    }

    pub fn leaves(&self) -> usize {
        self.state.lock().unwrap().leaves
    }

    /// Ends the current track as if it played to completion.
    pub async fn finish(&self, guild_id: GuildId) -> bool {
        let signal = {
            let mut state = self.state.lock().unwrap();
            let signal = state.current.remove(&guild_id);
            if let Some(signal) = &signal {
                state.finished.insert(guild_id, signal.clone());
            }
            signal
        };
        match signal {
            Some(signal) => {
                signal.send(None).await;
                true
            }
            None => false,
        }
    }

    /// Delivers the completion of the last finished track a second time.
    pub async fn replay_last_end(&self, guild_id: GuildId) {
        let signal = self.state.lock().unwrap().finished.get(&guild_id).cloned();
        if let Some(signal) = signal {
            signal.send(Some("duplicate end event".to_string())).await;
        }
    }
}

#[async_trait]
impl VoiceDriver for FakeVoice {
    async fn join(&self, guild_id: GuildId, channel_id: ChannelId) -> MusicResult<()> {
        let mut state = self.state.lock().unwrap();
        state.joins += 1;
        state.channels.insert(guild_id, channel_id);
        Ok(())
    }

    async fn leave(&self, guild_id: GuildId) -> MusicResult<()> {
        let mut state = self.state.lock().unwrap();
        state.current.remove(&guild_id);
        match state.channels.remove(&guild_id) {
            Some(_) => {
                state.leaves += 1;
                Ok(())
            }
            None => Err(MusicError::NotConnected),
        }
    }

    async fn current_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        self.channel(guild_id)
    }

    async fn play(
        &self,
        guild_id: GuildId,
        track: &Track,
        on_end: TrackEndSignal,
    ) -> MusicResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.channels.contains_key(&guild_id) {
            return Err(MusicError::NotConnected);
        }
        if state.failing_streams.contains(&track.stream_url) {
            return Err(MusicError::PlaybackStart("stream unavailable".to_string()));
        }
        state.played.push(track.id());
        state.current.insert(guild_id, on_end);
        Ok(())
    }

    async fn pause(&self, guild_id: GuildId) -> MusicResult<()> {
        match self.state.lock().unwrap().current.contains_key(&guild_id) {
            true => Ok(()),
            false => Err(MusicError::NothingPlaying),
        }
    }

    async fn resume(&self, guild_id: GuildId) -> MusicResult<()> {
        match self.state.lock().unwrap().current.contains_key(&guild_id) {
            true => Ok(()),
            false => Err(MusicError::NothingPaused),
        }
    }

    async fn stop(&self, guild_id: GuildId) -> MusicResult<()> {
        let signal = {
            let mut state = self.state.lock().unwrap();
            let signal = state
                .current
                .remove(&guild_id)
                .ok_or(MusicError::NothingPlaying)?;
            state.finished.insert(guild_id, signal.clone());
            signal
        };
        // Like the real driver, the end event arrives after `stop` returns.
        tokio::spawn(async move { signal.send(None).await });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    NowPlaying {
        channel: ChannelId,
        track_id: String,
        play_count: u64,
        message: MessageId,
    },
    Notice {
        channel: ChannelId,
        text: String,
    },
    Buttons {
        message: MessageId,
        paused: bool,
    },
    Deleted {
        channel: ChannelId,
        message: MessageId,
    },
}

/// Status channel that records what would have been posted.
pub struct FakeStatus {
    events: Mutex<Vec<StatusEvent>>,
    next_id: AtomicU64,
}

impl Default for FakeStatus {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
        }
    }
}

impl FakeStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Notice { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<MessageId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Deleted { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Pause states drawn on card buttons, in order.
    pub fn button_updates(&self) -> Vec<(MessageId, bool)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Buttons { message, paused } => Some((message, paused)),
                _ => None,
            })
            .collect()
    }

    /// Message id of the most recent now-playing card.
    pub fn last_card(&self) -> Option<MessageId> {
        self.events().into_iter().rev().find_map(|e| match e {
            StatusEvent::NowPlaying { message, .. } => Some(message),
            _ => None,
        })
    }
}

#[async_trait]
impl StatusChannel for FakeStatus {
    async fn send_now_playing(
        &self,
        channel_id: ChannelId,
        track: &Track,
        play_count: u64,
    ) -> Option<MessageId> {
        let message = MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.events.lock().unwrap().push(StatusEvent::NowPlaying {
            channel: channel_id,
            track_id: track.id(),
            play_count,
            message,
        });
        Some(message)
    }

    async fn send_notice(&self, channel_id: ChannelId, text: &str) -> Option<MessageId> {
        self.events.lock().unwrap().push(StatusEvent::Notice {
            channel: channel_id,
            text: text.to_string(),
        });
        Some(MessageId::new(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn set_paused(&self, _channel_id: ChannelId, message_id: MessageId, paused: bool) {
        self.events.lock().unwrap().push(StatusEvent::Buttons {
            message: message_id,
            paused,
        });
    }

    async fn delete_message(&self, channel_id: ChannelId, message_id: MessageId) {
        self.events.lock().unwrap().push(StatusEvent::Deleted {
            channel: channel_id,
            message: message_id,
        });
    }
}
