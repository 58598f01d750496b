//! Sample catalog tracks used across the integration tests

use chord::commands::music::audio_sources::track_metadata::Track;
use rstest::fixture;
use serenity::model::id::{ChannelId, GuildId};

pub const GUILD: GuildId = GuildId::new(1);
pub const VOICE: ChannelId = ChannelId::new(10);
pub const TEXT: ChannelId = ChannelId::new(20);

/// A playable track whose identity (and catalog query) is `id`.
pub fn track(id: &str) -> Track {
    Track {
        title: format!("Song {id}"),
        artist: "Test Artist".to_string(),
        duration: 215,
        stream_url: format!("https://aac.example/{id}_320.mp4"),
        page_url: format!("https://www.jiosaavn.com/song/song-{id}/{id}"),
        image_url: Some(format!("https://c.example/{id}-500x500.jpg")),
        requested_by: None,
    }
}

#[fixture]
pub fn kesariya() -> Track {
    Track {
        title: "Kesariya".to_string(),
        artist: "Arijit Singh".to_string(),
        duration: 268,
        stream_url: "https://aac.example/OAoZdEJ2W3Q_320.mp4".to_string(),
        page_url: "https://www.jiosaavn.com/song/kesariya/OAoZdEJ2W3Q".to_string(),
        image_url: Some("https://c.example/kesariya-500x500.jpg".to_string()),
        requested_by: None,
    }
}

