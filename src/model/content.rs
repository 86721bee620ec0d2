//! Catalog records: tracks from search results and their favourite projection

use serde::{Deserialize, Serialize};

pub type TrackId = i64;

/// A track from catalog search results
///
/// Only the fields the app reads are kept; the catalog returns many more.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    pub track_id: TrackId,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub artwork_url100: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl TrackRecord {
    /// Preview URL, if the track has a playable one
    pub fn preview(&self) -> Option<&str> {
        self.preview_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn title(&self) -> &str {
        self.track_name.as_deref().unwrap_or("Unknown track")
    }

    pub fn artist(&self) -> &str {
        self.artist_name.as_deref().unwrap_or("Unknown artist")
    }

    pub fn album(&self) -> &str {
        self.collection_name.as_deref().unwrap_or("")
    }
}

/// The persisted form of a favourite track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteRecord {
    pub track_id: TrackId,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub artwork_url100: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl From<&TrackRecord> for FavouriteRecord {
    fn from(track: &TrackRecord) -> Self {
        Self {
            track_id: track.track_id,
            track_name: track.track_name.clone(),
            artist_name: track.artist_name.clone(),
            collection_name: track.collection_name.clone(),
            artwork_url100: track.artwork_url100.clone(),
            preview_url: track.preview_url.clone(),
        }
    }
}

/// Body of a catalog search response
///
/// Entries stay undecoded so one malformed entry cannot sink the rest.
/// A missing or null `results` means no tracks.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Vec<serde_json::Value>>,
}
