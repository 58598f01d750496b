//! chord: a Discord voice-music bot backed by the JioSaavn catalog.

use std::sync::Arc;

pub mod commands;
pub mod config;
pub mod events;
pub mod utils;

use commands::music::utils::music_manager::MusicManager;
use config::Config;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub music: Arc<MusicManager>,
    pub config: Arc<Config>,
}
