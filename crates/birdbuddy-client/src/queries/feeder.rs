//! Feeder settings and firmware mutations. Owner accounts only.

use birdbuddy_core::Operation;

use super::feeder_owner_fields;

pub const TOGGLE_OFF_GRID: Operation = Operation::new(
    "feederToggleOffGrid",
    "feederToggleOffGrid",
    r#"mutation feederToggleOffGrid($feederId: ID!, $feederToggleOffGridInput: FeederToggleOffGridInput!) {
  feederToggleOffGrid(
    feederId: $feederId
    feederToggleOffGridInput: $feederToggleOffGridInput
  ) {
    ... on FeederToggleOffGridFinishedResult {
      feeder {
        offGrid
      }
      __typename
    }
    ... on FeederToggleOffGridInProgressResult {
      feeder {
        offGrid
      }
      __typename
    }
  }
}"#,
);

pub const TOGGLE_AUDIO_ENABLED: Operation = Operation::new(
    "feederToggleAudio",
    "feederToggleAudio",
    r#"mutation feederToggleAudio($feederId: ID!, $feederToggleAudioInput: FeederToggleAudioInput!) {
  feederToggleAudio(
    feederId: $feederId
    feederToggleAudioInput: $feederToggleAudioInput
  ) {
    ... on FeederToggleAudioFinishedResult {
      feeder {
        audioEnabled
      }
      __typename
    }
    ... on FeederToggleAudioInProgressResult {
      feeder {
        audioEnabled
      }
      __typename
    }
  }
}"#,
);

/// May fail with `PAYMENTS_SUBSCRIPTION_IS_NOT_ACTIVE` for `FRENZY_MODE`.
pub const UPDATE_POWER_PROFILE: Operation = Operation::new(
    "feederUpdatePowerProfile",
    "feederUpdatePowerProfile",
    r#"mutation feederUpdatePowerProfile($feederId: ID!, $feederUpdatePowerProfileInput: FeederUpdatePowerProfileInput!) {
  feederUpdatePowerProfile(feederId: $feederId, feederUpdatePowerProfileInput: $feederUpdatePowerProfileInput) {
    ... on FeederUpdatePowerProfileFinishedResult {
      feeder {
        powerProfile
      }
      __typename
    }
    ... on FeederUpdatePowerProfileInProgressResult {
      feeder {
        powerProfile
      }
      __typename
    }
  }
}"#,
);

pub const SET_OPTIONS: Operation = Operation::new(
    "feederUpdate",
    "feederUpdate",
    concat!(
        r#"mutation feederUpdate($feederId: ID!, $feederUpdateInput: FeederUpdateInput!) {
  feederUpdate(feederId: $feederId, feederUpdateInput: $feederUpdateInput) {
    ... on FeederForOwner {
      ...ListOwnerFeederFields
      __typename
    }
  }
}"#,
        feeder_owner_fields!()
    ),
);

pub const UPDATE_FIRMWARE: Operation = Operation::new(
    "feederFirmwareUpdateStart",
    "feederFirmwareUpdateStart",
    r#"mutation feederFirmwareUpdateStart($feederId: ID!) {
  feederFirmwareUpdateStart(feederId: $feederId) {
    ... on FeederFirmwareUpdateFailedResult {
      failedReason
      __typename
    }
    ... on FeederFirmwareUpdateProgressResult {
      progress
      __typename
    }
    ... on FeederFirmwareUpdateSucceededResult {
      feeder {
        availableFirmwareVersion
        firmwareVersion
      }
      __typename
    }
  }
}"#,
);

pub const UPDATE_FIRMWARE_PROGRESS: Operation = Operation::new(
    "feederFirmwareUpdateCheckProgress",
    "feederFirmwareUpdateCheckProgress",
    r#"mutation feederFirmwareUpdateCheckProgress($feederId: ID!) {
  feederFirmwareUpdateCheckProgress(feederId: $feederId) {
    ... on FeederFirmwareUpdateFailedResult {
      failedReason
      __typename
    }
    ... on FeederFirmwareUpdateProgressResult {
      feeder {
        state
      }
      progress
      __typename
    }
    ... on FeederFirmwareUpdateSucceededResult {
      feeder {
        availableFirmwareVersion
        firmwareVersion
      }
      __typename
    }
  }
}"#,
);
