//! Centralized default constants for the Bird Buddy client.
//!
//! All crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// ENDPOINT
// =============================================================================

/// Production GraphQL endpoint.
pub const GRAPHQL_URL: &str = "https://graphql.app-api.prod.aws.mybirdbuddy.com/graphql";

/// Default `Accept-Language` value.
pub const LANGUAGE_CODE: &str = "en";

/// HTTP request timeout (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SIGHTINGS
// =============================================================================

/// Minimum confidence (percent) needed to finish a sighting by best guess.
///
/// Also the confidence assigned to suggestion-derived matches when the
/// report token cannot be decoded.
pub const BEST_GUESS_CONFIDENCE: u8 = 10;

/// Match item type eligible for automatic species selection.
pub const BIRD_MATCH_TYPE: &str = "BIRD";

// =============================================================================
// FEED
// =============================================================================

/// Default number of feed items per page.
pub const FEED_PAGE_SIZE: u32 = 20;

// =============================================================================
// FEEDER POLLING
// =============================================================================

/// Interval between feeder refreshes while waiting for a toggle to apply.
pub const FEEDER_POLL_INTERVAL_MS: u64 = 1000;

/// Maximum refreshes while waiting for a toggle to apply.
pub const FEEDER_POLL_ATTEMPTS: u32 = 30;

/// Delay before re-reading a power profile update that is still in progress.
pub const POWER_PROFILE_SETTLE_MS: u64 = 250;
