//! Client for a JioSaavn-compatible search API.
//!
//! Search results are ranked by their reported play count and turned into
//! [`Track`]s by picking the best stream and artwork variants.

use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use serenity::async_trait;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Catalog;
use super::track_metadata::Track;

/// Number of results requested per search.
const SEARCH_LIMIT: u32 = 20;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Errors raised while talking to the search API. They never leave this module's
/// `Catalog` implementation, which logs them and reports "not found".
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Error during HTTP request communication.
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    /// Error parsing the JSON response from the API.
    #[error("Unable to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL could not be combined with the search path.
    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// The API answered with a non-success status code.
    #[error("Unexpected status code {0}")]
    Status(reqwest::StatusCode),

    /// The API answered but flagged the request as unsuccessful.
    #[error("API reported failure")]
    Unsuccessful,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    results: Option<Vec<Song>>,
}

/// One raw search result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub artists: Artists,
    #[serde(default)]
    pub image: Vec<Variant>,
    #[serde(default)]
    pub download_url: Vec<Variant>,
    #[serde(default)]
    pub play_count: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artists {
    #[serde(default)]
    pub primary: Vec<Artist>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub name: Option<String>,
}

/// A quality-labelled URL, e.g. `{"quality": "320kbps", "url": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Variant {
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Song {
    fn primary_artist(&self) -> Option<&str> {
        self.artists.primary.first().and_then(|a| a.name.as_deref())
    }

    /// Converts the result into a playable track, `None` without a stream URL.
    pub fn into_track(self) -> Option<Track> {
        let stream_url = pick_best_variant(&self.download_url)?;
        let artist = decode_entities(self.primary_artist().unwrap_or("Unknown Artist"));
        let title = decode_entities(self.name.as_deref().unwrap_or("Unknown Title"));

        Some(Track {
            title,
            artist,
            duration: numeric(&self.duration),
            stream_url,
            page_url: self.url.unwrap_or_default(),
            image_url: pick_best_variant(&self.image),
            requested_by: None,
        })
    }

    /// Dedup key shared with `search_similar_track` callers.
    fn similarity_key(&self) -> (String, String) {
        (
            normalize_text(self.name.as_deref().unwrap_or_default()),
            normalize_text(self.primary_artist().unwrap_or_default()),
        )
    }
}

/// Reads an integer that the API may send as a number or as a numeric string.
fn numeric(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Quality of a variant label: all embedded digits concatenated, `0` if none.
fn quality_value(label: Option<&str>) -> u64 {
    let digits: String = DIGITS
        .find_iter(label.unwrap_or_default())
        .map(|m| m.as_str())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Picks the URL of the highest-quality variant; the first one wins ties.
fn pick_best_variant(variants: &[Variant]) -> Option<String> {
    variants
        .iter()
        .enumerate()
        .max_by_key(|(i, v)| (quality_value(v.quality.as_deref()), std::cmp::Reverse(*i)))
        .and_then(|(_, v)| v.url.clone())
}

/// Picks the result with the highest play count; the earliest one wins ties.
pub fn select_best_song(songs: &[Song]) -> Option<&Song> {
    songs
        .iter()
        .enumerate()
        .max_by_key(|(i, s)| (numeric(&s.play_count), std::cmp::Reverse(*i)))
        .map(|(_, s)| s)
}

/// Lowercases and keeps only alphanumerics and whitespace.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// JioSaavn search client. Cheap to clone; the inner `reqwest::Client` is shared.
#[derive(Clone)]
pub struct JioSaavnClient {
    http: reqwest::Client,
    base_url: String,
}

impl JioSaavnClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Runs a raw search and returns the results in catalog order.
    pub async fn search_songs(&self, query: &str, limit: u32) -> Result<Vec<Song>, CatalogError> {
        let url = Url::parse(&format!("{}/api/search/songs", self.base_url))?;
        debug!("Searching catalog for '{}'", query);

        let response = self
            .http
            .get(url)
            .query(&[
                ("query", query.to_string()),
                ("limit", limit.to_string()),
                ("page", "0".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }

        let body = response.text().await?;
        let payload: SearchResponse = serde_json::from_str(&body)?;
        if !payload.success {
            return Err(CatalogError::Unsuccessful);
        }

        Ok(payload.data.and_then(|d| d.results).unwrap_or_default())
    }

    /// Like `search_songs`, but failures are logged and read as "no results".
    async fn search_or_empty(&self, query: &str) -> Vec<Song> {
        match self.search_songs(query, SEARCH_LIMIT).await {
            Ok(songs) => songs,
            Err(e) => {
                warn!("Catalog search for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Catalog for JioSaavnClient {
    async fn search_first_track(&self, query: &str) -> Option<Track> {
        let songs = self.search_or_empty(query).await;
        let best = select_best_song(&songs)?.clone();
        let track = best.into_track();
        match &track {
            Some(t) => info!("Resolved '{}' to '{}' by {}", query, t.title, t.artist),
            None => info!("Best match for '{}' has no stream URL", query),
        }
        track
    }

    async fn search_similar_track(
        &self,
        seed: &Track,
        exclude_keys: &HashSet<String>,
    ) -> Option<Track> {
        let base_query = format!("{} {}", seed.title, seed.artist).trim().to_string();
        let mut candidates = self.search_or_empty(&base_query).await;
        if candidates.is_empty() {
            candidates = self.search_or_empty(&seed.artist).await;
        }

        let seed_key = (normalize_text(&seed.title), normalize_text(&seed.artist));
        let seed_url = seed.page_url.trim();

        let filtered: Vec<Song> = candidates
            .into_iter()
            .filter(|song| {
                let page_url = song.url.as_deref().unwrap_or_default().trim();
                if !seed_url.is_empty() && page_url == seed_url {
                    return false;
                }
                let key = song.similarity_key();
                if key == seed_key {
                    return false;
                }
                !exclude_keys.contains(&format!("{}|{}", key.0, key.1))
            })
            .collect();

        select_best_song(&filtered)?.clone().into_track()
    }
}
