use poise::CreateReply;
use serenity::all::CreateEmbed;
use thousands::Separable;

use crate::commands::music::audio_sources::track_metadata::Track;

use super::format_track_duration;
use super::music_manager::MusicError;
use super::player::{EnqueueOutcome, Stay247Change, StopOutcome};

const SUCCESS: u32 = 0x00ff00;
const FAILURE: u32 = 0xff0000;

/// Number of upcoming tracks listed by the queue view.
pub const QUEUE_PAGE: usize = 10;

fn plays(count: u64) -> String {
    match count {
        1 => "1 play".to_string(),
        n => format!("{} plays", n.separate_with_commas()),
    }
}

/// Plain green embed carrying a single line of text
pub fn notice(text: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new().description(text.into()).color(SUCCESS)
}

pub fn notice_reply(text: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(notice(text))
}

pub fn error_reply(text: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(text.into())
            .color(FAILURE),
    )
}

/// User-facing message for a music error
pub fn music_error(err: &MusicError) -> CreateReply {
    let text = match err {
        MusicError::NotInGuild => "Use this command in a server.".to_string(),
        MusicError::UserNotInVoiceChannel => "Join a voice channel first.".to_string(),
        MusicError::NotConnected => "I am not in a voice channel.".to_string(),
        MusicError::NothingPlaying => "Nothing is playing.".to_string(),
        MusicError::NothingPaused => "Nothing is paused.".to_string(),
        MusicError::QueueEmpty => "Queue is empty.".to_string(),
        MusicError::QueueTooShort => "Need at least 2 songs to sort.".to_string(),
        MusicError::Stay247Enabled => "24/7 is enabled. Disable it with `247` first.".to_string(),
        MusicError::NotFound(_) => "No result found for that query.".to_string(),
        MusicError::PlaybackStart(reason) => format!("Playback failed: `{}`", reason),
        other => other.to_string(),
    };
    error_reply(text)
}

/// The card posted when a track starts. `emoji` replaces the default icon.
pub fn now_playing(track: &Track, play_count: u64, emoji: Option<&str>) -> CreateEmbed {
    let title = format!("{} Now Playing", emoji.unwrap_or("🎵"));

    let mut embed = CreateEmbed::new()
        .title(title)
        .description(format!("**{}** - {}", track.title, track.artist))
        .field(
            "Duration",
            format!("`{}`", format_track_duration(track.duration)),
            true,
        )
        .field("Source", format!("[JioSaavn]({})", track.page_url), true)
        .field("Played", plays(play_count), true)
        .color(SUCCESS);

    if let Some(image) = &track.image_url {
        embed = embed.thumbnail(image);
    }
    embed
}

/// Reply to `play` once the track was handed to the player
pub fn play_outcome(track: &Track, outcome: &EnqueueOutcome) -> CreateReply {
    match outcome {
        EnqueueOutcome::Started => {
            notice_reply(format!("Playing: **{}** - {}", track.title, track.artist))
        }
        EnqueueOutcome::Queued { position } => notice_reply(format!(
            "Queued: **{}** - {} (position {})",
            track.title, track.artist, position
        )),
        EnqueueOutcome::StartFailed => {
            error_reply(format!("Could not start **{}**.", track.title))
        }
    }
}

pub fn now_playing_reply(track: &Track) -> CreateReply {
    notice_reply(format!(
        "Now playing: **{}** - {}\n{}",
        track.title, track.artist, track.page_url
    ))
}

pub fn stopped(outcome: StopOutcome) -> CreateReply {
    notice_reply(match outcome {
        StopOutcome::Disconnected => "Stopped playback and cleared queue.",
        StopOutcome::StayedConnected => {
            "Stopped current playback. 24/7 is enabled, so I stayed connected."
        }
    })
}

pub fn cleared(count: usize) -> CreateReply {
    if count == 0 {
        notice_reply("Queue is already empty.")
    } else {
        notice_reply(format!("Cleared {} queued song(s).", count))
    }
}

/// Now-playing line, the next `QUEUE_PAGE` tracks and a count of the rest
pub fn queue_view(now_playing: Option<&Track>, queue: &[Track]) -> CreateReply {
    let mut lines: Vec<String> = Vec::new();

    if let Some(track) = now_playing {
        lines.push(format!("Now: **{}** - {}", track.title, track.artist));
    }

    if queue.is_empty() {
        if lines.is_empty() {
            return notice_reply("Queue is empty.");
        }
        lines.push("Up next: empty".to_string());
        return notice_reply(lines.join("\n"));
    }

    lines.push("Up next:".to_string());
    for (i, track) in queue.iter().take(QUEUE_PAGE).enumerate() {
        lines.push(format!("{}. {} - {}", i + 1, track.title, track.artist));
    }
    if queue.len() > QUEUE_PAGE {
        lines.push(format!("...and {} more", queue.len() - QUEUE_PAGE));
    }

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎵 Music Queue")
            .description(lines.join("\n"))
            .color(SUCCESS),
    )
}

pub fn play_count(track: &Track, count: u64, is_now_playing: bool) -> CreateReply {
    if is_now_playing {
        notice_reply(format!(
            "**{}** has been played **{}** times.",
            track.title,
            count.separate_with_commas()
        ))
    } else {
        notice_reply(format!(
            "Next up: **{}** - played **{}** times.",
            track.title,
            count.separate_with_commas()
        ))
    }
}

pub fn popular(entries: &[(String, u64)]) -> CreateReply {
    if entries.is_empty() {
        return notice_reply("No play history yet! Play some songs first.");
    }

    let description = entries
        .iter()
        .enumerate()
        .map(|(i, (id, count))| format!("{}. `{}` - {}", i + 1, id, plays(*count)))
        .collect::<Vec<_>>()
        .join("\n");

    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🔥 Most Played Songs")
            .description(description)
            .color(SUCCESS),
    )
}

pub fn queue_sorted(len: usize) -> CreateReply {
    notice_reply(format!(
        "Queue sorted by play count! {} songs reordered.",
        len
    ))
}

/// Create an embed for when 24/7 mode is enabled or disabled
pub fn stay_247_status(change: Stay247Change) -> CreateReply {
    let enabled = matches!(change, Stay247Change::Enabled { .. });
    CreateReply::default().embed(
        CreateEmbed::new()
            .title(if enabled {
                "🔄 24/7 Enabled"
            } else {
                "⏹️ 24/7 Disabled"
            })
            .description(if enabled {
                "I will stay in the voice channel and auto-play the most popular songs when the queue is empty."
            } else {
                "24/7 mode disabled. I left the voice channel."
            })
            .color(if enabled { SUCCESS } else { FAILURE }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plays_uses_separators() {
        assert_eq!(plays(1), "1 play");
        assert_eq!(plays(0), "0 plays");
        assert_eq!(plays(1234567), "1,234,567 plays");
    }
}
