//! Value types parsed from Bird Buddy GraphQL payloads.
//!
//! Each type is deserialized once from the server's `data` payload. Fields
//! the server may omit are `Option`s or defaulted collections; string tags
//! map onto closed enums with an `Unknown` variant.

mod feed;
mod feeder;
mod media;
mod sightings;
mod species;
mod user;

use serde::{Deserialize, Deserializer};

pub use feed::{parse_datetime, Feed, FeedEdge, FeedNode, FeedNodeType, PageInfo};
pub use feeder::{
    Battery, Feeder, FeederOptions, FeederRecord, FeederState, FeederUpdateStatus, FoodLevel,
    MetricState, PowerProfile, Signal, Temperature,
};
pub use media::{is_media_expired, Collection, CollectionMedia, Media};
pub use sightings::{
    CoverMedia, FeederSummary, PostcardSighting, Sighting, SightingReport, SightingType,
    SpeciesSuggestion,
};
pub use species::Species;
pub use user::User;

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
