//! This module aggregates various utility submodules used throughout the application.

/// SQLite storage for guild settings.
pub mod database;
/// Durable play counter.
pub mod play_counts;
