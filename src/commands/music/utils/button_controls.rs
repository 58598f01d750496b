use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, ReactionType};

pub const PAUSE_RESUME_BUTTON: &str = "music_pause_resume";
pub const SKIP_BUTTON: &str = "music_skip";
pub const STOP_BUTTON: &str = "music_stop";

/// Creates the row of player buttons shown under the now-playing card
pub fn create_music_control_buttons(paused: bool) -> Vec<CreateActionRow> {
    let pause_resume = CreateButton::new(PAUSE_RESUME_BUTTON)
        .emoji(ReactionType::Unicode(
            if paused { "▶️" } else { "⏸️" }.to_string(),
        ))
        .style(ButtonStyle::Secondary)
        .label(if paused { "Resume" } else { "Pause" });

    let skip = CreateButton::new(SKIP_BUTTON)
        .emoji(ReactionType::Unicode("⏭️".to_string()))
        .style(ButtonStyle::Primary)
        .label("Skip");

    let stop = CreateButton::new(STOP_BUTTON)
        .emoji(ReactionType::Unicode("⏹️".to_string()))
        .style(ButtonStyle::Danger)
        .label("Stop");

    vec![CreateActionRow::Buttons(vec![pause_resume, skip, stop])]
}
