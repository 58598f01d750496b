//! Shared harness for the player integration tests
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use chord::commands::music::audio_sources::Catalog;
use chord::commands::music::utils::autoplay_manager::AutoFillPolicy;
use chord::commands::music::utils::music_manager::MusicManager;
use chord::commands::music::utils::player::{GuildPlayer, PlayerDeps, PlayerSnapshot};
use chord::utils::database::SettingsDb;
use chord::utils::play_counts::PlayCountStore;
use mocks::{FakeCatalog, FakeStatus, FakeVoice};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use std::time::Duration;
use tempfile::TempDir;

static TRACING: Once = Once::new();

/// Routes player logs through the test harness output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("chord=debug")
            .with_test_writer()
            .init();
    });
}

/// A music manager wired to in-memory collaborators and temporary storage.
pub struct Harness {
    pub dir: TempDir,
    pub catalog: Arc<FakeCatalog>,
    pub voice: Arc<FakeVoice>,
    pub status: Arc<FakeStatus>,
    pub play_counts: Arc<PlayCountStore>,
    pub music: MusicManager,
}

impl Harness {
    pub fn new(catalog: FakeCatalog) -> Self {
        Self::with_fallbacks(catalog, vec!["Arijit Singh".to_string()])
    }

    pub fn with_fallbacks(catalog: FakeCatalog, fallbacks: Vec<String>) -> Self {
        let dir = TempDir::new().unwrap();
        let play_counts = Arc::new(PlayCountStore::load(dir.path().join("play_counts.json")));
        Self::build(dir, catalog, fallbacks, play_counts)
    }

    /// A second manager over the same storage, as after a restart.
    pub fn restart(self, catalog: FakeCatalog) -> Self {
        let play_counts = Arc::new(PlayCountStore::load(self.dir.path().join("play_counts.json")));
        Self::build(self.dir, catalog, vec!["Arijit Singh".to_string()], play_counts)
    }

    fn build(
        dir: TempDir,
        catalog: FakeCatalog,
        fallbacks: Vec<String>,
        play_counts: Arc<PlayCountStore>,
    ) -> Self {
        init_tracing();
        let catalog = Arc::new(catalog);
        let voice = Arc::new(FakeVoice::new());
        let status = Arc::new(FakeStatus::new());
        let shared_catalog: Arc<dyn Catalog> = catalog.clone();

        let auto_fill = AutoFillPolicy::new(shared_catalog.clone(), play_counts.clone())
            .with_fallback_queries(fallbacks);
        let deps = PlayerDeps {
            voice: voice.clone(),
            status: status.clone(),
            auto_fill: Arc::new(auto_fill),
            play_counts: play_counts.clone(),
        };
        let settings = SettingsDb::open(settings_path(&dir)).unwrap();

        Self {
            music: MusicManager::new(shared_catalog, deps, Some(settings)),
            dir,
            catalog,
            voice,
            status,
            play_counts,
        }
    }

    pub fn settings(&self) -> SettingsDb {
        SettingsDb::open(settings_path(&self.dir)).unwrap()
    }

    pub fn player(&self) -> GuildPlayer {
        self.music.player(fixtures::GUILD)
    }
}

fn settings_path(dir: &TempDir) -> PathBuf {
    dir.path().join("application_data.db")
}

/// Polls the player until `done` holds, failing after two seconds.
pub async fn wait_for(
    player: &GuildPlayer,
    done: impl Fn(&PlayerSnapshot) -> bool,
) -> PlayerSnapshot {
    for _ in 0..200 {
        let snapshot = player.snapshot().await.unwrap();
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("player never reached the expected state");
}

/// Lets spawned work settle, then returns the current snapshot.
pub async fn settle(player: &GuildPlayer) -> PlayerSnapshot {
    tokio::time::sleep(Duration::from_millis(100)).await;
    player.snapshot().await.unwrap()
}

pub fn playing_id(snapshot: &PlayerSnapshot) -> Option<String> {
    snapshot.now_playing.as_ref().map(|t| t.id())
}

pub fn queued_ids(snapshot: &PlayerSnapshot) -> Vec<String> {
    snapshot.queue.iter().map(|t| t.id()).collect()
}
