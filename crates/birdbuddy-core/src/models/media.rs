use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::Species;

const MEDIA_VIDEO: &str = "MediaVideo";

/// One `MediaImage` or `MediaVideo` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    #[serde(rename = "__typename", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Full-size content URL.
    #[serde(default)]
    pub content_url: Option<String>,
}

impl Media {
    /// `true` for video media, `false` for images.
    pub fn is_video(&self) -> bool {
        self.kind.as_deref() == Some(MEDIA_VIDEO)
    }

    /// Whether the signed thumbnail URL has expired.
    ///
    /// `None` when the URL is missing or carries no expiry.
    pub fn is_expired(&self) -> Option<bool> {
        self.is_expired_at(Utc::now())
    }

    /// Whether the signed thumbnail URL has expired as of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> Option<bool> {
        is_media_expired(self.thumbnail_url.as_deref()?, now)
    }
}

/// Check the `Expires` query parameter of a signed media URL against `now`.
pub fn is_media_expired(media_url: &str, now: DateTime<Utc>) -> Option<bool> {
    let url = Url::parse(media_url).ok()?;
    let expiry = url
        .query_pairs()
        .find(|(key, _)| key == "Expires")
        .and_then(|(_, value)| value.parse::<i64>().ok())?;
    if expiry == 0 {
        return None;
    }
    Some(expiry < now.timestamp())
}

/// A media item inside a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMedia {
    #[serde(default)]
    pub id: Option<String>,
    /// Name of the feeder that captured this media.
    #[serde(default)]
    pub feeder_name: Option<String>,
    #[serde(default)]
    pub liked: Option<bool>,
    #[serde(default)]
    pub is_shared: Option<bool>,
    pub media: Media,
}

/// A collection of media for one bird species (or the mystery visitors).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    /// `CollectionBird` or `CollectionMysteryVisitor`.
    #[serde(rename = "__typename", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub species: Option<Species>,
    #[serde(default)]
    pub visits_all_time: Option<u64>,
    #[serde(default)]
    pub visit_last_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cover_collection_media: Option<CollectionMedia>,
}

impl Collection {
    /// Name of the bird species in this collection.
    pub fn bird_name(&self) -> Option<&str> {
        self.species.as_ref()?.name.as_deref()
    }

    /// Total number of visits.
    pub fn total_visits(&self) -> u64 {
        self.visits_all_time.unwrap_or(0)
    }

    /// The feeder that captured the cover media.
    pub fn feeder_name(&self) -> Option<&str> {
        self.cover_collection_media.as_ref()?.feeder_name.as_deref()
    }

    /// The cover media.
    pub fn cover_media(&self) -> Option<&Media> {
        self.cover_collection_media.as_ref().map(|c| &c.media)
    }
}
