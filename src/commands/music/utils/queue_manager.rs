use serenity::model::id::{ChannelId, GuildId, MessageId};
use std::cmp::Reverse;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::commands::music::audio_sources::track_metadata::Track;
use crate::utils::play_counts::PlayCountStore;

/// Coarse playback state of a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    /// 24/7 mode is on and nothing is playing; the bot stays connected.
    StoppedPersistent,
}

/// Mutable playback state of one guild. Owned by that guild's player task.
pub struct GuildPlaybackState {
    pub guild_id: GuildId,
    pub queue: VecDeque<Track>,
    pub now_playing: Option<Track>,
    pub paused: bool,
    /// Where status messages for this guild go.
    pub text_channel_id: Option<ChannelId>,
    /// The currently displayed now-playing message.
    pub now_playing_message: Option<(ChannelId, MessageId)>,
    pub mode_247: bool,
    pub voice_channel_id: Option<ChannelId>,
    /// Bumped whenever pending auto-fill results must be discarded.
    pub epoch: u64,
    play_counts: Arc<PlayCountStore>,
}

impl GuildPlaybackState {
    pub fn new(guild_id: GuildId, play_counts: Arc<PlayCountStore>) -> Self {
        Self {
            guild_id,
            queue: VecDeque::new(),
            now_playing: None,
            paused: false,
            text_channel_id: None,
            now_playing_message: None,
            mode_247: false,
            voice_channel_id: None,
            epoch: 0,
            play_counts,
        }
    }

    pub fn play_counts(&self) -> &Arc<PlayCountStore> {
        &self.play_counts
    }

    pub fn play_count(&self, track: &Track) -> u64 {
        self.play_counts.get(&track.id())
    }

    /// Appends to the tail and returns the 1-based queue position.
    pub fn enqueue(&mut self, track: Track) -> usize {
        self.queue.push_back(track);
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.now_playing.is_none()
    }

    pub fn status(&self) -> PlaybackStatus {
        match (&self.now_playing, self.paused, self.mode_247) {
            (Some(_), true, _) => PlaybackStatus::Paused,
            (Some(_), false, _) => PlaybackStatus::Playing,
            (None, _, true) => PlaybackStatus::StoppedPersistent,
            (None, _, false) => PlaybackStatus::Idle,
        }
    }

    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        debug!("Guild {} moved to epoch {}", self.guild_id, self.epoch);
        self.epoch
    }

    /// Empties the queue only and returns how many tracks were removed.
    pub fn clear_queue(&mut self) -> usize {
        let removed = self.queue.len();
        self.queue.clear();
        removed
    }

    /// Drops the queue, the now-playing track and the status message binding.
    /// Returns what was playing so the caller can clean up its messages.
    pub fn reset_playback(&mut self) -> Option<Track> {
        self.queue.clear();
        self.paused = false;
        self.now_playing_message = None;
        self.now_playing.take()
    }

    /// Reorders the queue by play count, most played first. Equal counts keep
    /// their relative order. The now-playing track is untouched.
    pub fn sort_queue_by_play_count(&mut self) {
        let mut keyed: Vec<(u64, Track)> = self
            .queue
            .drain(..)
            .map(|track| (self.play_counts.get(&track.id()), track))
            .collect();
        keyed.sort_by_key(|(count, _)| Reverse(*count));
        self.queue = keyed.into_iter().map(|(_, track)| track).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn track(id: &str) -> Track {
        Track {
            title: format!("Song {id}"),
            artist: "Artist".to_string(),
            duration: 180,
            stream_url: format!("https://aac.example/{id}.mp4"),
            page_url: format!("https://www.jiosaavn.com/song/x/{id}"),
            image_url: None,
            requested_by: None,
        }
    }

    fn state_with_counts(dir: &TempDir, counts: &[(&str, u64)]) -> GuildPlaybackState {
        let store = Arc::new(PlayCountStore::load(dir.path().join("counts.json")));
        for (id, plays) in counts {
            for _ in 0..*plays {
                store.increment(id);
            }
        }
        GuildPlaybackState::new(GuildId::new(1), store)
    }

    fn queue_ids(state: &GuildPlaybackState) -> Vec<String> {
        state.queue.iter().map(Track::id).collect()
    }

    #[test]
    fn test_sort_moves_most_played_first() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_counts(&dir, &[("A", 5), ("B", 2)]);

        state.enqueue(track("B"));
        state.enqueue(track("A"));
        state.sort_queue_by_play_count();
        assert_eq!(queue_ids(&state), vec!["A", "B"]);

        // Already sorted input is unchanged, and sorting twice changes nothing.
        state.sort_queue_by_play_count();
        assert_eq!(queue_ids(&state), vec!["A", "B"]);
    }

    #[test]
    fn test_sort_is_stable_and_skips_now_playing() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_counts(&dir, &[("hot", 9), ("x", 1), ("y", 1)]);
        state.now_playing = Some(track("cold"));

        for id in ["x", "z", "hot", "y", "w"] {
            state.enqueue(track(id));
        }
        state.sort_queue_by_play_count();

        assert_eq!(queue_ids(&state), vec!["hot", "x", "y", "z", "w"]);
        assert_eq!(state.now_playing.as_ref().map(Track::id).as_deref(), Some("cold"));
    }

    #[test]
    fn test_status_transitions() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_counts(&dir, &[]);
        assert_eq!(state.status(), PlaybackStatus::Idle);

        state.mode_247 = true;
        assert_eq!(state.status(), PlaybackStatus::StoppedPersistent);

        state.now_playing = Some(track("a"));
        assert_eq!(state.status(), PlaybackStatus::Playing);

        state.paused = true;
        assert_eq!(state.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn test_reset_playback_and_clear_queue() {
        let dir = TempDir::new().unwrap();
        let mut state = state_with_counts(&dir, &[]);
        state.now_playing = Some(track("a"));
        state.now_playing_message = Some((ChannelId::new(3), MessageId::new(4)));
        assert_eq!(state.enqueue(track("b")), 1);
        assert_eq!(state.enqueue(track("c")), 2);

        assert_eq!(state.clear_queue(), 2);
        assert!(state.now_playing.is_some());

        state.enqueue(track("d"));
        let previous = state.reset_playback();
        assert_eq!(previous.map(|t| t.id()).as_deref(), Some("a"));
        assert!(state.queue.is_empty());
        assert!(state.now_playing_message.is_none());
        assert!(state.is_idle());
    }
}
