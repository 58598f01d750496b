use futures::future::join_all;
use rand::seq::IndexedRandom;
use std::sync::Arc;
use tracing::{debug, info};

use crate::commands::music::audio_sources::Catalog;
use crate::commands::music::audio_sources::track_metadata::Track;
use crate::utils::play_counts::PlayCountStore;

/// Queries tried when there is no play history yet.
pub const DEFAULT_FALLBACK_QUERIES: [&str; 5] = [
    "Bollywood Hits",
    "Arijit Singh",
    "Neha Kakkar",
    "Badshah",
    "Honey Singh",
];

/// Decides what to queue when a 24/7 guild runs out of tracks.
pub struct AutoFillPolicy {
    catalog: Arc<dyn Catalog>,
    play_counts: Arc<PlayCountStore>,
    fallback_queries: Vec<String>,
    top_n: usize,
    resolve_limit: usize,
}

impl AutoFillPolicy {
    pub fn new(catalog: Arc<dyn Catalog>, play_counts: Arc<PlayCountStore>) -> Self {
        Self {
            catalog,
            play_counts,
            fallback_queries: DEFAULT_FALLBACK_QUERIES
                .iter()
                .map(|q| q.to_string())
                .collect(),
            top_n: 10,
            resolve_limit: 5,
        }
    }

    pub fn with_fallback_queries(mut self, queries: Vec<String>) -> Self {
        self.fallback_queries = queries;
        self
    }

    /// Tracks to append: the most played identities re-resolved through the
    /// catalog, or one track from a random fallback query when nothing has
    /// been played yet. Lookups that find nothing are skipped.
    pub async fn fill(&self) -> Vec<Track> {
        let popular = self.play_counts.top_n(self.top_n);

        if popular.is_empty() {
            let query = {
                let mut rng = rand::rng();
                self.fallback_queries.choose(&mut rng).cloned()
            };
            let Some(query) = query else {
                debug!("No play history and no fallback queries");
                return Vec::new();
            };

            info!("No play history; auto-filling from '{}'", query);
            return self
                .catalog
                .search_first_track(&query)
                .await
                .into_iter()
                .collect();
        }

        let lookups = popular
            .iter()
            .take(self.resolve_limit)
            .map(|(id, _)| self.catalog.search_first_track(id));

        let tracks: Vec<Track> = join_all(lookups).await.into_iter().flatten().collect();
        debug!(
            "Resolved {} of {} popular tracks",
            tracks.len(),
            popular.len().min(self.resolve_limit)
        );
        tracks
    }
}
