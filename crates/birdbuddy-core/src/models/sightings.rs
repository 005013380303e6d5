use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

use super::{null_as_default, Media, Species};
use crate::confidence::{highest_confidence_matches, ConfidenceMatches};
use crate::error::{Error, Result};
use crate::report_token::{decode_report_token, DecodedReport};
use crate::strategy::{select_strategies, FinishPlan};

server_enum! {
    /// Machine-inferred sighting type.
    pub enum SightingType ("sighting type") {
        CannotDecide => "SightingCantDecideWhichBird",
        NoBird => "SightingNoBird",
        NoBirdRecognized => "SightingNoBirdRecognized",
        SpeciesRecognized => "SightingRecognizedBird",
        /// First-ever sighting of the species for this account.
        SpeciesUnlocked => "SightingRecognizedBirdUnlocked",
        MysteryVisitor => "SightingRecognizedMysteryVisitor",
    }
}

impl SightingType {
    /// Whether the sighting is confidently recognized as a species.
    ///
    /// Mystery visitors are not included: they still go through the
    /// mystery-visitor conversion when finishing.
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            SightingType::SpeciesRecognized | SightingType::SpeciesUnlocked
        )
    }

    /// Whether the sighting unlocks a new species and needs cover media.
    pub fn is_unlocked(&self) -> bool {
        matches!(self, SightingType::SpeciesUnlocked)
    }
}

fn missing_sighting_type() -> SightingType {
    SightingType::Unknown(String::new())
}

const COLLECTION_SPECIES: &str = "CollectionSpecies";

/// A suggested species for an undecided sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesSuggestion {
    #[serde(rename = "__typename", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_collected: Option<bool>,
    #[serde(default)]
    pub media: Option<Media>,
    #[serde(default)]
    pub species: Option<Species>,
}

/// Species and media pair selected as cover for a newly unlocked species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverMedia {
    pub species_id: String,
    pub media_id: String,
}

/// One detected visitor within a sighting report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sighting {
    pub id: String,
    #[serde(rename = "__typename", default = "missing_sighting_type")]
    pub sighting_type: SightingType,
    /// Correlation tokens linking this sighting to report-token entries.
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_tokens: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<SpeciesSuggestion>,
    /// Assigned species, once recognized.
    #[serde(default)]
    pub species: Option<Species>,
}

impl Sighting {
    pub fn is_recognized(&self) -> bool {
        self.sighting_type.is_recognized()
    }

    pub fn is_unlocked(&self) -> bool {
        self.sighting_type.is_unlocked()
    }

    /// Suggested bird species, in server order.
    pub fn bird_suggestions(&self) -> impl Iterator<Item = &Species> {
        self.suggestions
            .iter()
            .filter(|s| s.kind.as_deref() == Some(COLLECTION_SPECIES))
            .filter_map(|s| s.species.as_ref())
            .filter(|species| species.is_bird())
    }

    /// Cover media for an unlocked species.
    ///
    /// The media id is the sighting's first match token; the server
    /// correlates unlock media that way. `None` if either half is missing.
    pub fn cover_media(&self) -> Option<CoverMedia> {
        let species = self.species.as_ref()?;
        let media_id = self.match_tokens.first()?;
        Some(CoverMedia {
            species_id: species.id.clone(),
            media_id: media_id.clone(),
        })
    }
}

impl fmt::Display for Sighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sighting<type={}, recognized={}, unlocked={}, species={}>",
            self.sighting_type,
            self.is_recognized(),
            self.is_unlocked(),
            self.species
                .as_ref()
                .map(|s| s.id.as_str())
                .unwrap_or("none")
        )
    }
}

/// The server's identification session for one postcard.
///
/// `report_token` correlates later mutations with this session. It is
/// forwarded verbatim and only ever replaced by a newer report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingReport {
    #[serde(default)]
    pub report_token: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sightings: Vec<Sighting>,
}

impl SightingReport {
    pub fn token(&self) -> Option<&str> {
        self.report_token.as_deref()
    }

    /// The confidence report embedded in the report token.
    pub fn decoded_token(&self) -> DecodedReport {
        decode_report_token(self.token())
    }

    /// Highest-confidence bird match per match token.
    pub fn confidence_matches(&self) -> ConfidenceMatches {
        highest_confidence_matches(&self.decoded_token(), &self.sightings)
    }

    /// Recommended finishing strategy for every sighting.
    pub fn finishing_strategies(&self, confidence_threshold: u8) -> FinishPlan {
        select_strategies(self, confidence_threshold)
    }

    /// Cover media for every unlocked sighting.
    pub fn cover_medias(&self) -> Vec<CoverMedia> {
        self.sightings
            .iter()
            .filter(|s| s.is_unlocked())
            .filter_map(|s| {
                let cover = s.cover_media();
                if cover.is_none() {
                    warn!(sighting_id = %s.id, "Unlocked sighting has no species or match token");
                }
                cover
            })
            .collect()
    }
}

impl fmt::Display for SightingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SightingReport<sightings[{}]: [", self.sightings.len())?;
        for (i, sighting) in self.sightings.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", sighting.id, sighting.sighting_type)?;
        }
        write!(f, "]>")
    }
}

/// Minimal feeder description attached to a postcard sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeederSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

const POSTCARD_RESULT: &str = "SightingCreateFromPostcardResult";

/// Result of converting a postcard into a sighting report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostcardSighting {
    #[serde(rename = "__typename", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub feeder: Option<FeederSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub medias: Vec<Media>,
    #[serde(default)]
    pub video_media: Option<Media>,
    pub sighting_report: SightingReport,
    /// Feed item id of the source postcard.
    #[serde(skip)]
    pub postcard_id: Option<String>,
}

impl PostcardSighting {
    /// Parse a `sightingCreateFromPostcard` payload.
    ///
    /// Rejects payloads that are not objects, carry a different
    /// `__typename`, or lack a sighting report.
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let kind = match &value {
            JsonValue::Object(map) => map.get("__typename").and_then(JsonValue::as_str),
            _ => {
                return Err(Error::InvalidInput(
                    "postcard sighting must be an object".to_string(),
                ))
            }
        };
        if let Some(kind) = kind {
            if kind != POSTCARD_RESULT {
                return Err(Error::InvalidInput(format!(
                    "expected {}, got {}",
                    POSTCARD_RESULT, kind
                )));
            }
        }
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidInput(format!("invalid postcard sighting: {}", e)))
    }

    /// Record the source postcard id.
    pub fn with_postcard(mut self, postcard_id: impl Into<String>) -> Self {
        self.postcard_id = Some(postcard_id.into());
        self
    }

    pub fn report(&self) -> &SightingReport {
        &self.sighting_report
    }

    /// Video captured with the postcard, if any.
    pub fn video(&self) -> Option<&Media> {
        self.video_media.as_ref()
    }

    pub fn feeder_name(&self) -> Option<&str> {
        self.feeder.as_ref()?.name.as_deref()
    }
}

impl fmt::Display for PostcardSighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PostcardSighting<feeder={}, report={}>",
            self.feeder_name().unwrap_or("?"),
            self.sighting_report
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unlocked_sighting() -> JsonValue {
        json!({
            "id": "s1",
            "__typename": "SightingRecognizedBirdUnlocked",
            "matchTokens": ["tok1", "tok2"],
            "species": {"id": "sp1", "name": "Carolina Wren", "__typename": "SpeciesBird"}
        })
    }

    #[test]
    fn test_sighting_type_predicates() {
        assert!(SightingType::SpeciesRecognized.is_recognized());
        assert!(SightingType::SpeciesUnlocked.is_recognized());
        assert!(SightingType::SpeciesUnlocked.is_unlocked());
        assert!(!SightingType::SpeciesRecognized.is_unlocked());
        assert!(!SightingType::MysteryVisitor.is_recognized());
        assert!(!SightingType::CannotDecide.is_recognized());
        assert!(!SightingType::Unknown("X".to_string()).is_recognized());
    }

    #[test]
    fn test_sighting_missing_typename_is_unknown() {
        let sighting: Sighting = serde_json::from_value(json!({"id": "s1"})).unwrap();
        assert_eq!(sighting.sighting_type, SightingType::Unknown(String::new()));
        assert!(sighting.match_tokens.is_empty());
    }

    #[test]
    fn test_cover_media_uses_first_match_token() {
        let sighting: Sighting = serde_json::from_value(unlocked_sighting()).unwrap();
        assert_eq!(
            sighting.cover_media(),
            Some(CoverMedia {
                species_id: "sp1".to_string(),
                media_id: "tok1".to_string(),
            })
        );
    }

    #[test]
    fn test_cover_medias_only_unlocked() {
        let report: SightingReport = serde_json::from_value(json!({
            "reportToken": "{}",
            "sightings": [
                unlocked_sighting(),
                {
                    "id": "s2",
                    "__typename": "SightingRecognizedBird",
                    "matchTokens": ["tok3"],
                    "species": {"id": "sp2", "__typename": "SpeciesBird"}
                }
            ]
        }))
        .unwrap();
        let covers = report.cover_medias();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0].species_id, "sp1");
    }

    #[test]
    fn test_cover_medias_empty_without_unlocked() {
        let report: SightingReport = serde_json::from_value(json!({
            "sightings": [
                {"id": "s1", "__typename": "SightingCantDecideWhichBird", "matchTokens": ["t"]},
                {"id": "s2", "__typename": "SightingNoBird"}
            ]
        }))
        .unwrap();
        assert!(report.cover_medias().is_empty());
        assert!(SightingReport::default().cover_medias().is_empty());
    }

    #[test]
    fn test_cover_medias_skips_incomplete_unlock() {
        let report: SightingReport = serde_json::from_value(json!({
            "sightings": [{"id": "s1", "__typename": "SightingRecognizedBirdUnlocked"}]
        }))
        .unwrap();
        assert!(report.cover_medias().is_empty());
    }

    #[test]
    fn test_bird_suggestions_filtered() {
        let sighting: Sighting = serde_json::from_value(json!({
            "id": "s1",
            "__typename": "SightingCantDecideWhichBird",
            "matchTokens": ["tok1"],
            "suggestions": [
                {"__typename": "CollectionSpecies", "species": {"id": "fam", "__typename": "SpeciesBirdFamily"}},
                {"__typename": "CollectionOther", "species": {"id": "other", "__typename": "SpeciesBird"}},
                {"__typename": "CollectionSpecies", "species": {"id": "sp9", "__typename": "SpeciesBird"}}
            ]
        }))
        .unwrap();
        let ids: Vec<&str> = sighting.bird_suggestions().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["sp9"]);
    }

    #[test]
    fn test_postcard_sighting_from_value() {
        let sighting = PostcardSighting::from_value(json!({
            "__typename": "SightingCreateFromPostcardResult",
            "feeder": {"id": "f1", "name": "Backyard"},
            "medias": [{"id": "m1", "__typename": "MediaImage"}],
            "videoMedia": {"id": "v1", "__typename": "MediaVideo"},
            "sightingReport": {"reportToken": "{}", "sightings": [unlocked_sighting()]}
        }))
        .unwrap()
        .with_postcard("pc1");
        assert_eq!(sighting.postcard_id.as_deref(), Some("pc1"));
        assert_eq!(sighting.feeder_name(), Some("Backyard"));
        assert_eq!(sighting.video().map(|m| m.id.as_str()), Some("v1"));
        assert_eq!(sighting.report().sightings.len(), 1);
    }

    #[test]
    fn test_postcard_sighting_rejects_other_shapes() {
        assert!(PostcardSighting::from_value(json!("hello")).is_err());
        assert!(PostcardSighting::from_value(json!({"foo": "bar"})).is_err());
        assert!(PostcardSighting::from_value(json!({
            "__typename": "FeedItemNewPostcard",
            "sightingReport": {}
        }))
        .is_err());
    }
}
