//! Highest-confidence species match per match token.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::defaults::{BEST_GUESS_CONFIDENCE, BIRD_MATCH_TYPE};
use crate::models::Sighting;
use crate::report_token::DecodedReport;

/// One candidate species for a match token, as found in the report token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceMatch {
    #[serde(default)]
    pub match_token: String,
    /// Confidence percentage, 0-100.
    #[serde(deserialize_with = "lenient_confidence")]
    pub confidence: i64,
    pub species_code: String,
    #[serde(rename = "type")]
    pub match_type: String,
}

impl ConfidenceMatch {
    pub fn is_bird(&self) -> bool {
        self.match_type == BIRD_MATCH_TYPE
    }
}

fn lenient_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = JsonValue::deserialize(deserializer)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid confidence: {}", value)))
}

/// Best match per match token, in first-seen token order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceMatches {
    entries: Vec<ConfidenceMatch>,
}

impl ConfidenceMatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a match; an existing entry for the same token is replaced in place.
    pub fn insert(&mut self, item: ConfidenceMatch) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.match_token == item.match_token)
        {
            Some(existing) => *existing = item,
            None => self.entries.push(item),
        }
    }

    pub fn get(&self, match_token: &str) -> Option<&ConfidenceMatch> {
        self.entries.iter().find(|m| m.match_token == match_token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfidenceMatch> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConfidenceMatches {
    type Item = &'a ConfidenceMatch;
    type IntoIter = std::slice::Iter<'a, ConfidenceMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Resolve the highest-confidence bird match for every match token.
///
/// Falls back to the sightings' first bird suggestions, pinned at
/// [`BEST_GUESS_CONFIDENCE`], when the decoded report is empty.
pub fn highest_confidence_matches(decoded: &DecodedReport, sightings: &[Sighting]) -> ConfidenceMatches {
    if decoded.is_empty() {
        warn!("Cannot decode report token, falling back on suggestions");
        return suggestion_matches(sightings);
    }

    let mut matches = ConfidenceMatches::new();
    let items = decoded
        .get("reportItems")
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for item in items {
        if let Some(best) = report_item_match(item) {
            matches.insert(best);
        }
    }
    matches
}

fn report_item_match(item: &JsonValue) -> Option<ConfidenceMatch> {
    let match_token = item.get("matchToken")?.as_str()?;
    let candidates = item.get("items")?.as_array()?;

    let mut best: Option<ConfidenceMatch> = None;
    for candidate in candidates {
        let candidate: ConfidenceMatch = match serde_json::from_value(candidate.clone()) {
            Ok(candidate) => candidate,
            Err(err) => {
                debug!(match_token, error = %err, "Skipping unreadable report item");
                continue;
            }
        };
        if !candidate.is_bird() {
            continue;
        }
        // Strictly greater keeps the first of equal confidences.
        if best.as_ref().map_or(true, |b| candidate.confidence > b.confidence) {
            best = Some(candidate);
        }
    }

    best.map(|mut best| {
        best.match_token = match_token.to_string();
        best
    })
}

fn suggestion_matches(sightings: &[Sighting]) -> ConfidenceMatches {
    let mut matches = ConfidenceMatches::new();
    for sighting in sightings {
        let Some(match_token) = sighting.match_tokens.first() else {
            continue;
        };
        let Some(species) = sighting.bird_suggestions().next() else {
            continue;
        };
        matches.insert(ConfidenceMatch {
            match_token: match_token.clone(),
            confidence: i64::from(BEST_GUESS_CONFIDENCE),
            species_code: species.id.clone(),
            match_type: BIRD_MATCH_TYPE.to_string(),
        });
    }
    matches
}
