//! Per-guild playback task.
//!
//! Every guild gets one task that owns its [`GuildPlaybackState`]. Commands,
//! track completion events and auto-fill results all arrive on the same
//! channel, so state changes for a guild are strictly sequential.

use serenity::model::id::{ChannelId, GuildId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::commands::music::audio_sources::track_metadata::Track;
use crate::utils::play_counts::PlayCountStore;

use super::autoplay_manager::AutoFillPolicy;
use super::music_manager::{MusicError, MusicResult};
use super::queue_manager::{GuildPlaybackState, PlaybackStatus};
use super::status::StatusChannel;
use super::voice::VoiceDriver;

const COMMAND_BUFFER: usize = 64;

/// How long a completion event may wait for room in a full player channel.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Collaborators shared by every guild player.
#[derive(Clone)]
pub struct PlayerDeps {
    pub voice: Arc<dyn VoiceDriver>,
    pub status: Arc<dyn StatusChannel>,
    pub auto_fill: Arc<AutoFillPolicy>,
    pub play_counts: Arc<PlayCountStore>,
}

/// Result of asking a player to play a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Nothing was playing and the track started immediately.
    Started,
    /// Appended behind the current track at this 1-based position.
    Queued { position: usize },
    /// Nothing was playing but the track could not be started.
    StartFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Disconnected,
    /// 24/7 mode kept the bot connected and auto-fill was started.
    StayedConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stay247Change {
    Enabled { voice_channel: ChannelId },
    Disabled,
}

/// Read-only view of a guild's playback state.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub now_playing: Option<Track>,
    pub queue: Vec<Track>,
    pub status: PlaybackStatus,
    pub mode_247: bool,
    pub text_channel_id: Option<ChannelId>,
}

pub enum PlayerCommand {
    Enqueue {
        track: Track,
        voice_channel: ChannelId,
        text_channel: ChannelId,
        reply: oneshot::Sender<MusicResult<EnqueueOutcome>>,
    },
    Pause {
        reply: oneshot::Sender<MusicResult<Track>>,
    },
    Resume {
        reply: oneshot::Sender<MusicResult<Track>>,
    },
    Skip {
        reply: oneshot::Sender<MusicResult<Track>>,
    },
    Stop {
        reply: oneshot::Sender<StopOutcome>,
    },
    Leave {
        reply: oneshot::Sender<MusicResult<()>>,
    },
    Clear {
        reply: oneshot::Sender<usize>,
    },
    SortQueue {
        reply: oneshot::Sender<MusicResult<usize>>,
    },
    Snapshot {
        reply: oneshot::Sender<PlayerSnapshot>,
    },
    Toggle247 {
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
        reply: oneshot::Sender<MusicResult<Stay247Change>>,
    },
    Restore247 {
        voice_channel: ChannelId,
        text_channel: Option<ChannelId>,
        reply: oneshot::Sender<MusicResult<()>>,
    },
    /// Start auto-fill if 24/7 is on and the guild has nothing to play.
    Refill,
    TrackEnded {
        generation: u64,
        error: Option<String>,
    },
    AutoFilled {
        epoch: u64,
        tracks: Vec<Track>,
    },
}

/// Completion callback handed to the voice driver for one started track.
#[derive(Clone)]
pub struct TrackEndSignal {
    guild_id: GuildId,
    generation: u64,
    tx: mpsc::WeakSender<PlayerCommand>,
}

impl TrackEndSignal {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Delivers the end of this track to the player. Never fails; a full
    /// channel is given `CALLBACK_TIMEOUT` before the event is dropped.
    pub async fn send(&self, error: Option<String>) {
        let Some(tx) = self.tx.upgrade() else {
            debug!("Player for guild {} is gone", self.guild_id);
            return;
        };

        let command = PlayerCommand::TrackEnded {
            generation: self.generation,
            error,
        };
        match tx.send_timeout(command, CALLBACK_TIMEOUT).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                error!("{}", MusicError::CallbackTimeout(self.guild_id));
            }
            Err(SendTimeoutError::Closed(_)) => {
                warn!("Player for guild {} closed before track end", self.guild_id);
            }
        }
    }
}

/// Handle to a guild's player task.
#[derive(Clone)]
pub struct GuildPlayer {
    guild_id: GuildId,
    tx: mpsc::Sender<PlayerCommand>,
}

impl GuildPlayer {
    /// Spawns the player task for `guild_id` on the current runtime.
    pub fn spawn(guild_id: GuildId, deps: PlayerDeps) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = PlayerTask {
            state: GuildPlaybackState::new(guild_id, deps.play_counts.clone()),
            deps,
            tx: tx.downgrade(),
            rx,
            generation: 0,
            active_generation: None,
            fill_epoch: None,
        };
        tokio::spawn(task.run());
        Self { guild_id, tx }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> MusicResult<T> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| MusicError::PlayerUnavailable)?;
        response.await.map_err(|_| MusicError::PlayerUnavailable)
    }

    pub async fn enqueue(
        &self,
        track: Track,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<EnqueueOutcome> {
        self.request(|reply| PlayerCommand::Enqueue {
            track,
            voice_channel,
            text_channel,
            reply,
        })
        .await?
    }

    pub async fn pause(&self) -> MusicResult<Track> {
        self.request(|reply| PlayerCommand::Pause { reply }).await?
    }

    pub async fn resume(&self) -> MusicResult<Track> {
        self.request(|reply| PlayerCommand::Resume { reply }).await?
    }

    /// Stops the current track; the next one starts through the normal
    /// completion path.
    pub async fn skip(&self) -> MusicResult<Track> {
        self.request(|reply| PlayerCommand::Skip { reply }).await?
    }

    pub async fn stop(&self) -> MusicResult<StopOutcome> {
        self.request(|reply| PlayerCommand::Stop { reply }).await
    }

    pub async fn leave(&self) -> MusicResult<()> {
        self.request(|reply| PlayerCommand::Leave { reply }).await?
    }

    /// Empties the queue and returns how many tracks were dropped.
    pub async fn clear(&self) -> MusicResult<usize> {
        self.request(|reply| PlayerCommand::Clear { reply }).await
    }

    /// Sorts the queue by play count and returns its length.
    pub async fn sort_queue(&self) -> MusicResult<usize> {
        self.request(|reply| PlayerCommand::SortQueue { reply })
            .await?
    }

    pub async fn snapshot(&self) -> MusicResult<PlayerSnapshot> {
        self.request(|reply| PlayerCommand::Snapshot { reply }).await
    }

    pub async fn toggle_247(
        &self,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
    ) -> MusicResult<Stay247Change> {
        self.request(|reply| PlayerCommand::Toggle247 {
            voice_channel,
            text_channel,
            reply,
        })
        .await?
    }

    pub async fn restore_247(
        &self,
        voice_channel: ChannelId,
        text_channel: Option<ChannelId>,
    ) -> MusicResult<()> {
        self.request(|reply| PlayerCommand::Restore247 {
            voice_channel,
            text_channel,
            reply,
        })
        .await?
    }

    pub async fn refill(&self) {
        if self.tx.send(PlayerCommand::Refill).await.is_err() {
            warn!("Player for guild {} is not running", self.guild_id);
        }
    }
}

struct PlayerTask {
    state: GuildPlaybackState,
    deps: PlayerDeps,
    tx: mpsc::WeakSender<PlayerCommand>,
    rx: mpsc::Receiver<PlayerCommand>,
    /// Last generation handed out to a started track.
    generation: u64,
    /// Generation of the track currently owned by the voice driver.
    active_generation: Option<u64>,
    /// Epoch of the auto-fill currently in flight.
    fill_epoch: Option<u64>,
}

impl PlayerTask {
    async fn run(mut self) {
        debug!("Player for guild {} started", self.state.guild_id);
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
        }
        debug!("Player for guild {} stopped", self.state.guild_id);
    }

    fn guild_id(&self) -> GuildId {
        self.state.guild_id
    }

    async fn handle(&mut self, command: PlayerCommand) {
        // A dropped reply receiver only means the caller stopped waiting.
        match command {
            PlayerCommand::Enqueue {
                track,
                voice_channel,
                text_channel,
                reply,
            } => {
                let outcome = self.enqueue(track, voice_channel, text_channel).await;
                let _ = reply.send(outcome);
            }
            PlayerCommand::Pause { reply } => {
                let _ = reply.send(self.pause().await);
            }
            PlayerCommand::Resume { reply } => {
                let _ = reply.send(self.resume().await);
            }
            PlayerCommand::Skip { reply } => {
                let _ = reply.send(self.skip().await);
            }
            PlayerCommand::Stop { reply } => {
                let _ = reply.send(self.stop().await);
            }
            PlayerCommand::Leave { reply } => {
                let _ = reply.send(self.leave().await);
            }
            PlayerCommand::Clear { reply } => {
                let removed = self.state.clear_queue();
                info!("Cleared {} queued tracks in guild {}", removed, self.guild_id());
                let _ = reply.send(removed);
            }
            PlayerCommand::SortQueue { reply } => {
                let _ = reply.send(self.sort_queue());
            }
            PlayerCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            PlayerCommand::Toggle247 {
                voice_channel,
                text_channel,
                reply,
            } => {
                let change = self.toggle_247(voice_channel, text_channel).await;
                let _ = reply.send(change);
            }
            PlayerCommand::Restore247 {
                voice_channel,
                text_channel,
                reply,
            } => {
                let restored = self.restore_247(voice_channel, text_channel).await;
                let _ = reply.send(restored);
            }
            PlayerCommand::Refill => self.refill(),
            PlayerCommand::TrackEnded { generation, error } => {
                self.on_track_ended(generation, error).await;
            }
            PlayerCommand::AutoFilled { epoch, tracks } => {
                self.on_auto_filled(epoch, tracks).await;
            }
        }
    }

    async fn enqueue(
        &mut self,
        track: Track,
        voice_channel: ChannelId,
        text_channel: ChannelId,
    ) -> MusicResult<EnqueueOutcome> {
        self.connect(voice_channel).await?;
        self.state.text_channel_id = Some(text_channel);

        info!("Queueing '{}' in guild {}", track.title, self.guild_id());
        let position = self.state.enqueue(track);

        if !self.state.is_idle() {
            return Ok(EnqueueOutcome::Queued { position });
        }

        self.start_next().await;
        Ok(if self.state.is_idle() {
            EnqueueOutcome::StartFailed
        } else {
            EnqueueOutcome::Started
        })
    }

    /// Joins `voice_channel` unless the guild is already connected there.
    async fn connect(&mut self, voice_channel: ChannelId) -> MusicResult<()> {
        let guild_id = self.guild_id();
        if self.state.voice_channel_id == Some(voice_channel)
            && self.deps.voice.is_connected(guild_id).await
        {
            return Ok(());
        }

        self.deps.voice.join(guild_id, voice_channel).await?;
        self.state.voice_channel_id = Some(voice_channel);
        Ok(())
    }

    /// Pops the queue head and hands it to the voice driver. A failed start
    /// is reported to the status channel and leaves the guild idle.
    async fn start_next(&mut self) {
        if !self.state.is_idle() {
            return;
        }

        let guild_id = self.guild_id();
        if !self.deps.voice.is_connected(guild_id).await {
            debug!("Guild {} is not connected; not starting playback", guild_id);
            return;
        }

        let Some(track) = self.state.queue.pop_front() else {
            return;
        };

        self.generation += 1;
        let signal = TrackEndSignal {
            guild_id,
            generation: self.generation,
            tx: self.tx.clone(),
        };
        self.active_generation = Some(self.generation);
        self.state.now_playing = Some(track.clone());
        self.state.paused = false;

        if let Err(e) = self.deps.voice.play(guild_id, &track, signal).await {
            warn!("Failed to start '{}' in guild {}: {}", track.title, guild_id, e);
            self.active_generation = None;
            self.state.now_playing = None;

            let reason = match e {
                MusicError::PlaybackStart(reason) => reason,
                other => other.to_string(),
            };
            if let Some(channel) = self.state.text_channel_id {
                self.deps
                    .status
                    .send_notice(channel, &format!("Playback failed: `{}`", reason))
                    .await;
            }
            return;
        }

        info!("Now playing '{}' in guild {}", track.title, guild_id);
        if let Some(channel) = self.state.text_channel_id {
            let play_count = self.state.play_count(&track);
            if let Some(message) = self
                .deps
                .status
                .send_now_playing(channel, &track, play_count)
                .await
            {
                self.state.now_playing_message = Some((channel, message));
            }
        }
    }

    async fn on_track_ended(&mut self, generation: u64, error: Option<String>) {
        if self.active_generation != Some(generation) {
            debug!(
                "Ignoring stale completion {} in guild {}",
                generation,
                self.guild_id()
            );
            return;
        }
        self.active_generation = None;

        if let Some(e) = error {
            warn!("Playback error in guild {}: {}", self.guild_id(), e);
        }

        if let Some(finished) = self.state.now_playing.clone() {
            self.record_play(&finished).await;
            self.delete_status_messages(Some(&finished)).await;
        } else {
            self.delete_status_messages(None).await;
        }
        self.state.now_playing = None;
        self.state.now_playing_message = None;
        self.state.paused = false;

        if self.state.queue.is_empty() && self.state.mode_247 {
            self.trigger_fill();
            return;
        }
        self.start_next().await;
    }

    async fn record_play(&self, track: &Track) {
        let store = self.state.play_counts().clone();
        let id = track.id();
        match tokio::task::spawn_blocking(move || store.increment(&id)).await {
            Ok(count) => info!("Track '{}' played {} times", track.title, count),
            Err(e) => error!("Failed to record play for '{}': {}", track.title, e),
        }
    }

    /// Deletes the now-playing message and the message that requested `track`.
    async fn delete_status_messages(&self, track: Option<&Track>) {
        if let Some((channel, message)) = self.state.now_playing_message {
            self.deps.status.delete_message(channel, message).await;
        }
        if let Some(origin) = track.and_then(|t| t.requested_by) {
            self.deps
                .status
                .delete_message(origin.channel_id, origin.message_id)
                .await;
        }
    }

    async fn pause(&mut self) -> MusicResult<Track> {
        let track = match (&self.state.now_playing, self.state.paused) {
            (Some(track), false) => track.clone(),
            _ => return Err(MusicError::NothingPlaying),
        };
        self.deps.voice.pause(self.guild_id()).await?;
        self.state.paused = true;
        self.refresh_card_buttons().await;
        Ok(track)
    }

    async fn resume(&mut self) -> MusicResult<Track> {
        let track = match (&self.state.now_playing, self.state.paused) {
            (Some(track), true) => track.clone(),
            _ => return Err(MusicError::NothingPaused),
        };
        self.deps.voice.resume(self.guild_id()).await?;
        self.state.paused = false;
        self.refresh_card_buttons().await;
        Ok(track)
    }

    /// Keeps the Pause/Resume button on the now-playing card in sync.
    async fn refresh_card_buttons(&self) {
        if let Some((channel, message)) = self.state.now_playing_message {
            self.deps
                .status
                .set_paused(channel, message, self.state.paused)
                .await;
        }
    }

    async fn skip(&mut self) -> MusicResult<Track> {
        let track = self
            .state
            .now_playing
            .clone()
            .ok_or(MusicError::NothingPlaying)?;
        self.state.bump_epoch();

        if self.deps.voice.stop(self.guild_id()).await.is_err() {
            // The driver will not report this track again; finish it here.
            if let Some(generation) = self.active_generation {
                self.on_track_ended(generation, None).await;
            }
        }
        Ok(track)
    }

    /// Drops everything this guild was playing and invalidates pending
    /// completion events and fills.
    async fn halt(&mut self) {
        self.state.bump_epoch();
        self.active_generation = None;

        let message = self.state.now_playing_message;
        let previous = self.state.reset_playback();
        if let Some((channel, message)) = message {
            self.deps.status.delete_message(channel, message).await;
        }
        if let Some(origin) = previous.as_ref().and_then(|t| t.requested_by) {
            self.deps
                .status
                .delete_message(origin.channel_id, origin.message_id)
                .await;
        }

        if previous.is_some() {
            if let Err(e) = self.deps.voice.stop(self.guild_id()).await {
                debug!("Stop during halt in guild {}: {}", self.guild_id(), e);
            }
        }
    }

    async fn stop(&mut self) -> StopOutcome {
        self.halt().await;

        if self.state.mode_247 {
            info!("Stopped guild {}; staying connected for 24/7", self.guild_id());
            self.trigger_fill();
            return StopOutcome::StayedConnected;
        }

        self.state.voice_channel_id = None;
        if let Err(e) = self.deps.voice.leave(self.guild_id()).await {
            debug!("Leave after stop in guild {}: {}", self.guild_id(), e);
        }
        info!("Stopped and disconnected guild {}", self.guild_id());
        StopOutcome::Disconnected
    }

    async fn leave(&mut self) -> MusicResult<()> {
        if self.state.mode_247 {
            return Err(MusicError::Stay247Enabled);
        }

        self.halt().await;
        self.state.voice_channel_id = None;
        self.deps.voice.leave(self.guild_id()).await
    }

    fn sort_queue(&mut self) -> MusicResult<usize> {
        match self.state.queue.len() {
            0 => Err(MusicError::QueueEmpty),
            1 => Err(MusicError::QueueTooShort),
            len => {
                self.state.sort_queue_by_play_count();
                Ok(len)
            }
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            now_playing: self.state.now_playing.clone(),
            queue: self.state.queue.iter().cloned().collect(),
            status: self.state.status(),
            mode_247: self.state.mode_247,
            text_channel_id: self.state.text_channel_id,
        }
    }

    async fn toggle_247(
        &mut self,
        voice_channel: Option<ChannelId>,
        text_channel: ChannelId,
    ) -> MusicResult<Stay247Change> {
        if self.state.mode_247 {
            self.state.mode_247 = false;
            self.state.voice_channel_id = None;
            self.halt().await;
            if let Err(e) = self.deps.voice.leave(self.guild_id()).await {
                debug!("Leave after 24/7 off in guild {}: {}", self.guild_id(), e);
            }
            info!("24/7 mode disabled in guild {}", self.guild_id());
            return Ok(Stay247Change::Disabled);
        }

        let voice_channel = voice_channel.ok_or(MusicError::UserNotInVoiceChannel)?;
        self.enable_247(voice_channel, Some(text_channel)).await?;
        Ok(Stay247Change::Enabled { voice_channel })
    }

    async fn restore_247(
        &mut self,
        voice_channel: ChannelId,
        text_channel: Option<ChannelId>,
    ) -> MusicResult<()> {
        self.enable_247(voice_channel, text_channel).await
    }

    async fn enable_247(
        &mut self,
        voice_channel: ChannelId,
        text_channel: Option<ChannelId>,
    ) -> MusicResult<()> {
        self.connect(voice_channel).await?;
        self.state.mode_247 = true;
        if text_channel.is_some() {
            self.state.text_channel_id = text_channel;
        }
        info!(
            "24/7 mode enabled in guild {} (voice channel {})",
            self.guild_id(),
            voice_channel
        );

        if self.state.is_idle() {
            if self.state.queue.is_empty() {
                self.trigger_fill();
            } else {
                self.start_next().await;
            }
        }
        Ok(())
    }

    fn refill(&mut self) {
        if self.state.mode_247 && self.state.is_idle() && self.state.queue.is_empty() {
            self.trigger_fill();
        }
    }

    /// Runs the auto-fill policy off the player task. At most one fill runs
    /// per epoch.
    fn trigger_fill(&mut self) {
        let epoch = self.state.epoch;
        if self.fill_epoch == Some(epoch) {
            debug!("Auto-fill already running in guild {}", self.guild_id());
            return;
        }
        self.fill_epoch = Some(epoch);

        let policy = self.deps.auto_fill.clone();
        let tx = self.tx.clone();
        let guild_id = self.guild_id();
        debug!("Starting auto-fill for guild {} at epoch {}", guild_id, epoch);

        tokio::spawn(async move {
            let tracks = policy.fill().await;
            let Some(tx) = tx.upgrade() else {
                return;
            };
            if tx
                .send(PlayerCommand::AutoFilled { epoch, tracks })
                .await
                .is_err()
            {
                warn!("Player for guild {} closed during auto-fill", guild_id);
            }
        });
    }

    async fn on_auto_filled(&mut self, epoch: u64, tracks: Vec<Track>) {
        if self.fill_epoch == Some(epoch) {
            self.fill_epoch = None;
        }
        if epoch != self.state.epoch || !self.state.mode_247 {
            debug!(
                "Discarding auto-fill from epoch {} in guild {}",
                epoch,
                self.guild_id()
            );
            return;
        }
        if tracks.is_empty() {
            info!("Auto-fill found nothing for guild {}", self.guild_id());
            return;
        }

        info!(
            "Auto-fill added {} tracks in guild {}",
            tracks.len(),
            self.guild_id()
        );
        self.state.queue.extend(tracks);
        self.start_next().await;
    }
}
