//! Per-sighting finishing strategy selection.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::confidence::{ConfidenceMatch, ConfidenceMatches};
use crate::error::Error;
use crate::models::{Sighting, SightingReport};

/// How a sighting gets finished, from most to least preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishStrategy {
    /// Already recognized; nothing to resolve.
    Recognized,
    /// Accept the highest-confidence bird match.
    BestGuess,
    /// Convert to a mystery visitor.
    Mystery,
}

impl FinishStrategy {
    /// Preference rank; lower is more preferred.
    pub const fn rank(self) -> u8 {
        match self {
            FinishStrategy::Recognized => 0,
            FinishStrategy::BestGuess => 1,
            FinishStrategy::Mystery => 2,
        }
    }

    /// Whether `self` is less preferred than `other`.
    pub fn is_weaker_than(self, other: FinishStrategy) -> bool {
        self.rank() > other.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FinishStrategy::Recognized => "recognized",
            FinishStrategy::BestGuess => "best_guess",
            FinishStrategy::Mystery => "mystery",
        }
    }
}

impl Default for FinishStrategy {
    fn default() -> Self {
        FinishStrategy::Recognized
    }
}

impl PartialOrd for FinishStrategy {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FinishStrategy {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for FinishStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinishStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recognized" => Ok(FinishStrategy::Recognized),
            "best_guess" | "best-guess" => Ok(FinishStrategy::BestGuess),
            "mystery" => Ok(FinishStrategy::Mystery),
            other => Err(Error::InvalidInput(format!(
                "unknown finish strategy: {}",
                other
            ))),
        }
    }
}

/// Recommended finish for one sighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SightingFinish {
    Recognized,
    BestGuess(ConfidenceMatch),
    Mystery,
}

impl SightingFinish {
    pub fn strategy(&self) -> FinishStrategy {
        match self {
            SightingFinish::Recognized => FinishStrategy::Recognized,
            SightingFinish::BestGuess(_) => FinishStrategy::BestGuess,
            SightingFinish::Mystery => FinishStrategy::Mystery,
        }
    }
}

impl fmt::Display for SightingFinish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SightingFinish::BestGuess(item) => write!(
                f,
                "best_guess({} at {}%)",
                item.species_code, item.confidence
            ),
            other => write!(f, "{}", other.strategy()),
        }
    }
}

/// A sighting paired with its recommended finish.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSighting {
    pub sighting: Sighting,
    pub finish: SightingFinish,
}

/// Recommended finishes keyed by sighting id, in report order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinishPlan {
    entries: Vec<PlannedSighting>,
}

impl FinishPlan {
    fn assign(&mut self, sighting: &Sighting, finish: SightingFinish) {
        let planned = PlannedSighting {
            sighting: sighting.clone(),
            finish,
        };
        match self
            .entries
            .iter_mut()
            .find(|p| p.sighting.id == sighting.id)
        {
            Some(existing) => *existing = planned,
            None => self.entries.push(planned),
        }
    }

    pub fn get(&self, sighting_id: &str) -> Option<&SightingFinish> {
        self.entries
            .iter()
            .find(|p| p.sighting.id == sighting_id)
            .map(|p| &p.finish)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedSighting> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for FinishPlan {
    type Item = PlannedSighting;
    type IntoIter = std::vec::IntoIter<PlannedSighting>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Recommend a finish for every sighting of `report`.
///
/// Confidence matches are resolved only when some sighting is not already
/// recognized.
pub fn select_strategies(report: &SightingReport, confidence_threshold: u8) -> FinishPlan {
    let mut plan = FinishPlan::default();
    let mut matches: Option<ConfidenceMatches> = None;

    for sighting in &report.sightings {
        if sighting.is_recognized() {
            plan.assign(sighting, SightingFinish::Recognized);
            continue;
        }
        let matches = matches.get_or_insert_with(|| report.confidence_matches());
        let finish = best_guess(sighting, matches, confidence_threshold)
            .map(SightingFinish::BestGuess)
            .unwrap_or(SightingFinish::Mystery);
        plan.assign(sighting, finish);
    }
    plan
}

fn best_guess(
    sighting: &Sighting,
    matches: &ConfidenceMatches,
    confidence_threshold: u8,
) -> Option<ConfidenceMatch> {
    matches
        .iter()
        .find(|item| {
            sighting.match_tokens.contains(&item.match_token)
                && item.confidence >= i64::from(confidence_threshold)
                && item.is_bird()
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::BEST_GUESS_CONFIDENCE;
    use serde_json::{json, Value as JsonValue};

    fn report(token: Option<String>, sightings: JsonValue) -> SightingReport {
        serde_json::from_value(json!({"reportToken": token, "sightings": sightings})).unwrap()
    }

    fn token_with(confidence: i64) -> String {
        json!({
            "reportItems": [{
                "matchToken": "tok1",
                "items": [{"confidence": confidence, "speciesCode": "sp2", "type": "BIRD"}]
            }]
        })
        .to_string()
    }

    fn mixed_report(token: Option<String>) -> SightingReport {
        report(
            token,
            json!([
                {"id": "a", "__typename": "SightingRecognizedBird", "matchTokens": ["t0"]},
                {"id": "b", "__typename": "SightingCantDecideWhichBird", "matchTokens": ["tok1"]},
                {"id": "c", "__typename": "SightingRecognizedBirdUnlocked", "matchTokens": ["t2"]},
                {"id": "d", "__typename": "SightingNoBird", "matchTokens": []},
                {"id": "e", "__typename": "SightingRecognizedMysteryVisitor", "matchTokens": ["t4"]}
            ]),
        )
    }

    #[test]
    fn test_rank_order() {
        assert!(FinishStrategy::Recognized < FinishStrategy::BestGuess);
        assert!(FinishStrategy::BestGuess < FinishStrategy::Mystery);
        assert!(FinishStrategy::Mystery.is_weaker_than(FinishStrategy::BestGuess));
        assert!(!FinishStrategy::Mystery.is_weaker_than(FinishStrategy::Mystery));
        assert!(!FinishStrategy::Recognized.is_weaker_than(FinishStrategy::Mystery));
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            "best-guess".parse::<FinishStrategy>().unwrap(),
            FinishStrategy::BestGuess
        );
        assert_eq!(
            "MYSTERY".parse::<FinishStrategy>().unwrap(),
            FinishStrategy::Mystery
        );
        assert!("sometimes".parse::<FinishStrategy>().is_err());
        assert_eq!(FinishStrategy::BestGuess.to_string(), "best_guess");
    }

    #[test]
    fn test_every_sighting_gets_one_strategy() {
        let report = mixed_report(Some(token_with(85)));
        let plan = select_strategies(&report, BEST_GUESS_CONFIDENCE);
        assert_eq!(plan.len(), report.sightings.len());
        let ids: Vec<&str> = plan.iter().map(|p| p.sighting.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_recognized_iff_is_recognized() {
        let report = mixed_report(Some(token_with(85)));
        let plan = select_strategies(&report, BEST_GUESS_CONFIDENCE);
        for planned in plan.iter() {
            assert_eq!(
                planned.finish == SightingFinish::Recognized,
                planned.sighting.is_recognized(),
                "sighting {}",
                planned.sighting.id
            );
        }
        assert_eq!(plan.get("e"), Some(&SightingFinish::Mystery));
    }

    #[test]
    fn test_best_guess_above_threshold() {
        let report = mixed_report(Some(token_with(85)));
        let plan = select_strategies(&report, BEST_GUESS_CONFIDENCE);
        match plan.get("b") {
            Some(SightingFinish::BestGuess(item)) => {
                assert_eq!(item.species_code, "sp2");
                assert_eq!(item.confidence, 85);
            }
            other => panic!("expected best guess, got {:?}", other),
        }
    }

    #[test]
    fn test_below_threshold_is_mystery() {
        let report = mixed_report(Some(token_with(3)));
        let plan = select_strategies(&report, BEST_GUESS_CONFIDENCE);
        assert_eq!(plan.get("b"), Some(&SightingFinish::Mystery));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let report = mixed_report(Some(token_with(50)));
        let mut previous = FinishStrategy::Recognized;
        for threshold in [0u8, 10, 49, 50, 51, 90, 100] {
            let strategy = select_strategies(&report, threshold)
                .get("b")
                .map(SightingFinish::strategy)
                .unwrap();
            assert!(strategy >= previous, "threshold {}", threshold);
            previous = strategy;
        }
        assert_eq!(previous, FinishStrategy::Mystery);
    }

    #[test]
    fn test_fallback_qualifies_at_default_threshold() {
        let report = report(
            Some("not-json".to_string()),
            json!([{
                "id": "b",
                "__typename": "SightingCantDecideWhichBird",
                "matchTokens": ["tok1"],
                "suggestions": [{
                    "__typename": "CollectionSpecies",
                    "species": {"id": "sp7", "__typename": "SpeciesBird"}
                }]
            }]),
        );
        let plan = select_strategies(&report, BEST_GUESS_CONFIDENCE);
        assert!(matches!(plan.get("b"), Some(SightingFinish::BestGuess(item)) if item.species_code == "sp7"));
        let stricter = select_strategies(&report, BEST_GUESS_CONFIDENCE + 1);
        assert_eq!(stricter.get("b"), Some(&SightingFinish::Mystery));
    }

    #[test]
    fn test_all_recognized_skips_matching() {
        let report = report(
            Some("not-json".to_string()),
            json!([{"id": "a", "__typename": "SightingRecognizedBird"}]),
        );
        let plan = select_strategies(&report, BEST_GUESS_CONFIDENCE);
        assert_eq!(plan.get("a"), Some(&SightingFinish::Recognized));
    }
}
