//! Postcard and sighting mutations.

use birdbuddy_core::Operation;

use super::{media_fields, sighting_report_fields, species_fields};

pub const POSTCARD_TO_SIGHTING: Operation = Operation::new(
    "sightingCreateFromPostcard",
    "sightingCreateFromPostcard",
    concat!(
        r#"mutation sightingCreateFromPostcard($sightingCreateFromPostcardInput: SightingCreateFromPostcardInput!) {
  sightingCreateFromPostcard(
    sightingCreateFromPostcardInput: $sightingCreateFromPostcardInput
  ) {
    feeder {
      id
      name
      state
      __typename
    }
    medias {
      ...MediaFullFields
      __typename
    }
    sightingReport {
      ...SightingReportFields
      __typename
    }
    videoMedia {
      ...MediaFullFields
      __typename
    }
    __typename
  }
}"#,
        media_fields!(),
        sighting_report_fields!(),
        species_fields!()
    ),
);

/// May fail with `SIGHTING_POSTCARD_ALREADY_CLAIMED`.
pub const FINISH_SIGHTING: Operation = Operation::new(
    "sightingReportPostcardFinish",
    "sightingReportPostcardFinish",
    r#"mutation sightingReportPostcardFinish($sightingReportPostcardFinishInput: SightingReportPostcardFinishInput!) {
  sightingReportPostcardFinish(
    sightingReportPostcardFinishInput: $sightingReportPostcardFinishInput
  ) {
    success
    __typename
  }
}"#,
);

pub const SIGHTING_CHOOSE_SPECIES: Operation = Operation::new(
    "sightingChooseSpecies",
    "sightingChooseSpecies",
    concat!(
        r#"mutation sightingChooseSpecies($sightingChooseSpeciesInput: SightingChooseSpeciesInput!) {
  sightingChooseSpecies(sightingChooseSpeciesInput: $sightingChooseSpeciesInput) {
    ...SightingReportFields
    __typename
  }
}"#,
        sighting_report_fields!(),
        species_fields!()
    ),
);

pub const SIGHTING_CHOOSE_MYSTERY: Operation = Operation::new(
    "sightingConvertToMysteryVisitor",
    "sightingConvertToMysteryVisitor",
    concat!(
        r#"mutation sightingConvertToMysteryVisitor($sightingConvertToMysteryVisitorInput: SightingConvertToMysteryVisitorInput!) {
  sightingConvertToMysteryVisitor(
    sightingConvertToMysteryVisitorInput: $sightingConvertToMysteryVisitorInput
  ) {
    ...SightingReportFields
    __typename
  }
}"#,
        sighting_report_fields!(),
        species_fields!()
    ),
);

pub const SHARE_MEDIAS: Operation = Operation::new(
    "mediaShareToggle",
    "mediaShareToggle",
    r#"mutation mediaShareToggle($mediaShareToggleInput: MediaShareToggleInput!) {
  mediaShareToggle(mediaShareToggleInput: $mediaShareToggleInput) {
    success
    __typename
  }
}"#,
);
