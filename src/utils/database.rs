//! SQLite storage for guild settings that must survive restarts.
//! Currently this is the set of guilds with 24/7 mode enabled, together with
//! the voice and text channels the bot was bound to.

use rusqlite::{Connection, Result as SqlResult, params};
use serenity::model::id::{ChannelId, GuildId};
use std::path::PathBuf;
use tracing::debug;

/// A guild that had 24/7 mode enabled when the bot last ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay247Setting {
    pub guild_id: GuildId,
    pub voice_channel_id: ChannelId,
    pub text_channel_id: Option<ChannelId>,
}

/// Handle to the settings database file. Each call opens its own connection.
#[derive(Debug, Clone)]
pub struct SettingsDb {
    path: PathBuf,
}

impl SettingsDb {
    /// Opens (creating if needed) the database at `path` and ensures its tables exist.
    pub fn open(path: impl Into<PathBuf>) -> SqlResult<Self> {
        let db = Self { path: path.into() };
        if let Some(parent) = db.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            // rusqlite cannot create missing directories itself.
            if let Err(e) = std::fs::create_dir_all(parent) {
                debug!("Could not create settings directory {:?}: {}", parent, e);
            }
        }
        create_tables(&db.connect()?)?;
        Ok(db)
    }

    fn connect(&self) -> SqlResult<Connection> {
        Connection::open(&self.path)
    }

    /// Inserts or replaces the 24/7 binding for a guild.
    pub fn set_stay_247(
        &self,
        guild_id: GuildId,
        voice_channel_id: ChannelId,
        text_channel_id: Option<ChannelId>,
    ) -> SqlResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO stay_247_settings (guild_id, voice_channel_id, text_channel_id)
             VALUES (?1, ?2, ?3)",
            params![
                guild_id.get(),
                voice_channel_id.get(),
                text_channel_id.map(|c| c.get())
            ],
        )?;
        Ok(())
    }

    /// Forgets the 24/7 binding for a guild.
    pub fn remove_stay_247(&self, guild_id: GuildId) -> SqlResult<()> {
        let conn = self.connect()?;
        conn.execute(
            "DELETE FROM stay_247_settings WHERE guild_id = ?1",
            params![guild_id.get()],
        )?;
        Ok(())
    }

    /// Every stored 24/7 binding.
    pub fn load_stay_247(&self) -> SqlResult<Vec<Stay247Setting>> {
        let conn = self.connect()?;
        let mut statement = conn.prepare(
            "SELECT guild_id, voice_channel_id, text_channel_id FROM stay_247_settings
             ORDER BY guild_id",
        )?;

        let rows = statement.query_map([], |row| {
            let guild_id: u64 = row.get(0)?;
            let voice_channel_id: u64 = row.get(1)?;
            let text_channel_id: Option<u64> = row.get(2)?;
            Ok((guild_id, voice_channel_id, text_channel_id))
        })?;

        let mut settings = Vec::new();
        for row in rows {
            let (guild_id, voice_channel_id, text_channel_id) = row?;
            // Discord ids are never zero; skip rows that would not convert.
            if guild_id == 0 || voice_channel_id == 0 {
                continue;
            }
            settings.push(Stay247Setting {
                guild_id: GuildId::new(guild_id),
                voice_channel_id: ChannelId::new(voice_channel_id),
                text_channel_id: text_channel_id.filter(|&id| id != 0).map(ChannelId::new),
            });
        }
        Ok(settings)
    }
}

fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS stay_247_settings (
            guild_id INTEGER PRIMARY KEY,
            voice_channel_id INTEGER NOT NULL,
            text_channel_id INTEGER
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_db(dir: &TempDir) -> SettingsDb {
        SettingsDb::open(dir.path().join("data").join("application_data.db"))
            .expect("Failed to open settings database")
    }

    /// Tests storing, replacing and loading 24/7 bindings.
    #[test]
    fn test_set_and_load_stay_247() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);
        assert!(db.load_stay_247().unwrap().is_empty());

        db.set_stay_247(GuildId::new(2), ChannelId::new(20), None)
            .unwrap();
        db.set_stay_247(GuildId::new(1), ChannelId::new(10), Some(ChannelId::new(11)))
            .unwrap();
        // Rebinding replaces the row.
        db.set_stay_247(GuildId::new(2), ChannelId::new(21), Some(ChannelId::new(22)))
            .unwrap();

        let settings = db.load_stay_247().unwrap();
        assert_eq!(
            settings,
            vec![
                Stay247Setting {
                    guild_id: GuildId::new(1),
                    voice_channel_id: ChannelId::new(10),
                    text_channel_id: Some(ChannelId::new(11)),
                },
                Stay247Setting {
                    guild_id: GuildId::new(2),
                    voice_channel_id: ChannelId::new(21),
                    text_channel_id: Some(ChannelId::new(22)),
                },
            ]
        );
    }

    /// Tests that removal persists across reopening the file.
    #[test]
    fn test_remove_stay_247_persists() {
        let dir = TempDir::new().unwrap();
        let db = open_db(&dir);
        db.set_stay_247(GuildId::new(5), ChannelId::new(50), None)
            .unwrap();
        db.remove_stay_247(GuildId::new(5)).unwrap();
        // Removing an absent guild is not an error.
        db.remove_stay_247(GuildId::new(6)).unwrap();

        assert!(open_db(&dir).load_stay_247().unwrap().is_empty());
    }
}
