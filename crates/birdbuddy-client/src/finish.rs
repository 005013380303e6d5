//! Postcard collection: resolve each sighting, then finalize the postcard.
//!
//! Sightings are resolved strictly in report order. Every species choice or
//! mystery conversion returns a replacement report whose token must be used
//! for the next call, so no two calls of one postcard are ever in flight.

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, error, info, instrument, warn};

use birdbuddy_core::defaults::BEST_GUESS_CONFIDENCE;
use birdbuddy_core::{
    take_root, FinishStrategy, GraphqlExecutor, PlannedSighting, PostcardSighting, Result,
    SightingFinish, SightingReport,
};

use crate::queries::birds;

/// Options for finishing a postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishOptions {
    /// Least preferred strategy the caller accepts.
    pub strategy: FinishStrategy,
    /// Minimum best-guess confidence; defaults to [`BEST_GUESS_CONFIDENCE`].
    pub confidence_threshold: Option<u8>,
    /// Share the postcard media with the community after finishing.
    pub share_media: bool,
}

impl FinishOptions {
    pub fn with_strategy(strategy: FinishStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    pub fn threshold(mut self, confidence_threshold: u8) -> Self {
        self.confidence_threshold = Some(confidence_threshold);
        self
    }

    pub fn share(mut self, share_media: bool) -> Self {
        self.share_media = share_media;
        self
    }

    pub fn confidence_threshold(&self) -> u8 {
        self.confidence_threshold.unwrap_or(BEST_GUESS_CONFIDENCE)
    }
}

#[derive(Debug, Deserialize)]
struct SuccessResult {
    #[serde(default)]
    success: Option<bool>,
}

/// Runs the sighting mutations and the postcard finish over an executor.
pub struct PostcardFinisher<'a, E: GraphqlExecutor + ?Sized> {
    executor: &'a E,
}

impl<'a, E: GraphqlExecutor + ?Sized> PostcardFinisher<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Convert a postcard feed item into a sighting report.
    #[instrument(skip(self), fields(subsystem = "birdbuddy", component = "finish", op = "sighting_from_postcard"))]
    pub async fn sighting_from_postcard(&self, feed_item_id: &str) -> Result<PostcardSighting> {
        let operation = birds::POSTCARD_TO_SIGHTING;
        let variables = json!({
            "sightingCreateFromPostcardInput": {"feedItemId": feed_item_id}
        });
        let value: JsonValue = take_root(&operation, self.executor.execute(&operation, variables).await?)?;
        let sighting = PostcardSighting::from_value(value)
            .map_err(|e| birdbuddy_core::Error::UnexpectedResponse(e.to_string()))?;
        Ok(sighting.with_postcard(feed_item_id))
    }

    /// Assign `species_id` to a sighting. Returns the replacement report.
    #[instrument(skip(self, report_token), fields(subsystem = "birdbuddy", component = "finish", op = "sighting_choose_species"))]
    pub async fn choose_species(
        &self,
        sighting_id: &str,
        species_id: &str,
        report_token: Option<&str>,
    ) -> Result<SightingReport> {
        let operation = birds::SIGHTING_CHOOSE_SPECIES;
        let variables = json!({
            "sightingChooseSpeciesInput": {
                "sightingId": sighting_id,
                "speciesId": species_id,
                "reportToken": report_token,
            }
        });
        take_root(&operation, self.executor.execute(&operation, variables).await?)
    }

    /// Convert a sighting into a mystery visitor. Returns the replacement report.
    #[instrument(skip(self, report_token), fields(subsystem = "birdbuddy", component = "finish", op = "sighting_choose_mystery"))]
    pub async fn choose_mystery(
        &self,
        sighting_id: &str,
        report_token: Option<&str>,
    ) -> Result<SightingReport> {
        let operation = birds::SIGHTING_CHOOSE_MYSTERY;
        let variables = json!({
            "sightingConvertToMysteryVisitorInput": {
                "sightingId": sighting_id,
                "reportToken": report_token,
            }
        });
        take_root(&operation, self.executor.execute(&operation, variables).await?)
    }

    /// Toggle community sharing of media.
    #[instrument(skip(self, media_ids), fields(subsystem = "birdbuddy", component = "finish", op = "share_medias", media_count = media_ids.len()))]
    pub async fn share_medias(&self, media_ids: &[String], share: bool) -> Result<bool> {
        let operation = birds::SHARE_MEDIAS;
        let variables = json!({
            "mediaShareToggleInput": {"mediaIds": media_ids, "share": share}
        });
        let result: SuccessResult =
            take_root(&operation, self.executor.execute(&operation, variables).await?)?;
        Ok(result.success.unwrap_or(false))
    }

    /// Finish a postcard from a raw `sightingCreateFromPostcard` payload.
    ///
    /// A payload that is not a postcard sighting is logged and reported as
    /// `Ok(false)` without contacting the server.
    pub async fn finish_value(
        &self,
        feed_item_id: &str,
        sighting: &JsonValue,
        options: FinishOptions,
    ) -> Result<bool> {
        match PostcardSighting::from_value(sighting.clone()) {
            Ok(sighting) => self.finish(feed_item_id, &sighting, options).await,
            Err(err) => {
                warn!(feed_item_id, error = %err, "Unexpected sighting result");
                Ok(false)
            }
        }
    }

    /// Resolve every sighting per `options`, then finalize the postcard.
    ///
    /// Returns the server's `success` flag. Media sharing failures are
    /// logged and do not change the result.
    #[instrument(skip(self, sighting, options), fields(subsystem = "birdbuddy", component = "finish", op = "finish_postcard", strategy = %options.strategy))]
    pub async fn finish(
        &self,
        feed_item_id: &str,
        sighting: &PostcardSighting,
        options: FinishOptions,
    ) -> Result<bool> {
        let report = self
            .resolve_sightings(
                sighting.report(),
                options.strategy,
                options.confidence_threshold(),
            )
            .await?;

        let operation = birds::FINISH_SIGHTING;
        let variables = json!({
            "sightingReportPostcardFinishInput": finish_input(feed_item_id, &report, sighting),
        });
        let result: SuccessResult =
            take_root(&operation, self.executor.execute(&operation, variables).await?)?;
        let success = result.success.unwrap_or(false);
        info!(feed_item_id, success, "Postcard finished");

        if success && options.share_media {
            self.share_best_effort(sighting).await;
        }
        Ok(success)
    }

    /// Resolve sightings one at a time, threading the current report through.
    async fn resolve_sightings(
        &self,
        report: &SightingReport,
        requested: FinishStrategy,
        confidence_threshold: u8,
    ) -> Result<SightingReport> {
        let plan = report.finishing_strategies(confidence_threshold);
        let mut current = report.clone();
        for planned in plan {
            current = self.resolve_sighting(current, &planned, requested).await?;
        }
        Ok(current)
    }

    async fn resolve_sighting(
        &self,
        current: SightingReport,
        planned: &PlannedSighting,
        requested: FinishStrategy,
    ) -> Result<SightingReport> {
        let sighting_id = planned.sighting.id.as_str();
        let replacement = match &planned.finish {
            SightingFinish::Recognized => return Ok(current),
            finish if finish.strategy().is_weaker_than(requested) => {
                info!(
                    sighting_id,
                    requested = %requested,
                    recommended = %finish,
                    "Requested strategy not possible, finishing sighting as is"
                );
                return Ok(current);
            }
            SightingFinish::BestGuess(item) => {
                debug!(
                    sighting_id,
                    confidence = item.confidence,
                    species = %item.species_code,
                    "Selecting highest confidence species"
                );
                self.choose_species(sighting_id, &item.species_code, current.token())
                    .await?
            }
            SightingFinish::Mystery => self.choose_mystery(sighting_id, current.token()).await?,
        };
        debug!(old = %current, new = %replacement, "Replacing sighting report");
        Ok(replacement)
    }

    async fn share_best_effort(&self, sighting: &PostcardSighting) {
        let media_ids: Vec<String> = sighting.medias.iter().map(|m| m.id.clone()).collect();
        if media_ids.is_empty() {
            debug!("No media to share");
            return;
        }
        match self.share_medias(&media_ids, true).await {
            Ok(shared) => info!(count = media_ids.len(), shared, "Sharing medias"),
            Err(err) => error!(count = media_ids.len(), error = %err, "Error sharing medias"),
        }
    }
}

/// `SightingReportPostcardFinishInput` for the final report state.
fn finish_input(feed_item_id: &str, report: &SightingReport, sighting: &PostcardSighting) -> JsonValue {
    let mut input = json!({
        "feedItemId": feed_item_id,
        "defaultCoverMedia": report.cover_medias(),
        "notSelectedMediaIds": [],
        "reportToken": report.token(),
    });
    if let Some(video) = sighting.video() {
        input["videoMediaId"] = JsonValue::String(video.id.clone());
    }
    input
}
