//! This module defines the interface the playback core needs from a song catalog,
//! and the JioSaavn implementation of it.

/// Submodule implementing the `Catalog` trait against a JioSaavn search API.
pub mod jiosaavn;
/// Submodule defining the `Track` struct passed through the queue.
pub mod track_metadata;

use serenity::async_trait;
use std::collections::HashSet;
use track_metadata::Track;

/// A searchable song catalog.
///
/// Implementations never surface errors: transport and decoding failures are
/// logged and reported as "not found" (`None`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Resolves the most popular match for a free-text query.
    async fn search_first_track(&self, query: &str) -> Option<Track>;

    /// Finds a popular track similar to `seed`, skipping the seed itself and any
    /// candidate whose `"normalized-title|normalized-artist"` key is in `exclude_keys`.
    async fn search_similar_track(
        &self,
        seed: &Track,
        exclude_keys: &HashSet<String>,
    ) -> Option<Track>;
}
