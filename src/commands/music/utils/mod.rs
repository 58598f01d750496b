use std::time::Duration;

// Export music utilities
pub mod autoplay_manager;
pub mod button_controls;
pub mod button_handlers;
pub mod cleanup;
pub mod embedded_messages;
pub mod event_handlers;
pub mod music_manager;
pub mod player;
pub mod queue_manager;
pub mod status;
pub mod voice;

/// Format a duration into a human-readable string (e.g., "3:45" or "1:23:45")
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Like `format_duration` for a length in seconds, "Unknown" when zero
pub fn format_track_duration(seconds: u64) -> String {
    match seconds {
        0 => "Unknown".to_string(),
        s => format_duration(Duration::from_secs(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, "Unknown" ; "unknown")]
    #[test_case(59, "0:59" ; "seconds only")]
    #[test_case(215, "3:35" ; "minutes")]
    #[test_case(3600, "1:00:00" ; "exact hour")]
    #[test_case(5025, "1:23:45" ; "hours")]
    fn test_format_track_duration(seconds: u64, expected: &str) {
        assert_eq!(format_track_duration(seconds), expected);
    }
}
