//! Defines `Track`, the resolved and directly playable representation of a song
//! returned by the catalog and carried through the queue.

use serenity::model::id::{ChannelId, MessageId};

/// The message that asked for a track, kept so it can be cleaned up once the
/// track has finished playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOrigin {
    pub channel_id: ChannelId,
    pub message_id: MessageId,
}

/// A playable song resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// The title of the track.
    pub title: String,
    /// Primary artist name.
    pub artist: String,
    /// Length in seconds, `0` when the catalog did not report one.
    pub duration: u64,
    /// Direct audio stream URL handed to the voice driver.
    pub stream_url: String,
    /// Canonical catalog page, the source of the track identity.
    pub page_url: String,
    /// Highest-resolution artwork, if any.
    pub image_url: Option<String>,
    /// Set when the track is enqueued from a prefix command.
    pub requested_by: Option<RequestOrigin>,
}

impl Track {
    /// Identity used for play counting: the last path segment of the page URL,
    /// or the title when the page URL has no separator.
    pub fn id(&self) -> String {
        match self.page_url.rsplit_once('/') {
            Some((_, last)) => last.to_string(),
            None => self.title.clone(),
        }
    }

    /// Returns the track with request provenance attached.
    pub fn with_origin(mut self, origin: Option<RequestOrigin>) -> Self {
        self.requested_by = origin;
        self
    }
}
