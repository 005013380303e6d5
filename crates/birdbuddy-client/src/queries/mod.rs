//! GraphQL operation documents.
//!
//! Shared fragments are macros expanding to string literals so documents
//! can be assembled with `concat!` at compile time.

pub mod auth;
pub mod birds;
pub mod feeder;
pub mod me;

macro_rules! feeder_owner_fields {
    () => {
        r#"
fragment ListFeederFields on FeederForPrivate {
  battery {
    charging
    percentage
    state
    __typename
  }
  food {
    state
    __typename
  }
  id
  name
  signal {
    state
    value
    __typename
  }
  state
  temperature {
    value
    __typename
  }
  __typename
}
fragment ListOwnerFeederFields on FeederForOwner {
  ...ListFeederFields
  availableFirmwareVersion
  firmwareVersion
  serialNumber
  offGrid
  audioEnabled
  powerProfile
  lowBatteryNotification
  lowFoodNotification
  location {
    city
    country
    __typename
  }
  __typename
}"#
    };
}

macro_rules! feeder_member_fields {
    () => {
        r#"
fragment ListMemberFeederFields on FeederForMember {
  ...ListFeederFields
  locationCity
  locationCountry
  ownerName
  __typename
}
fragment FeederForMemberPendingFields on FeederForMemberPending {
  id
  name
  __typename
}"#
    };
}

macro_rules! me_fields {
    () => {
        r#"
fragment MeFields on Me {
  user {
    avatarUrl
    email
    id
    name
    __typename
  }
  feeders {
    ... on FeederForMember {
      ...ListMemberFeederFields
      __typename
    }
    ... on FeederForOwner {
      ...ListOwnerFeederFields
      __typename
    }
    ... on FeederForMemberPending {
      ...FeederForMemberPendingFields
      __typename
    }
    __typename
  }
  __typename
}"#
    };
}

macro_rules! media_fields {
    () => {
        r#"
fragment MediaFullFields on Media {
  id
  createdAt
  thumbnailUrl
  ... on MediaImage {
    contentUrl(size: ORIGINAL)
    __typename
  }
  ... on MediaVideo {
    contentUrl(size: ORIGINAL)
    __typename
  }
  __typename
}"#
    };
}

macro_rules! species_fields {
    () => {
        r#"
fragment SpeciesListFields on Species {
  id
  iconUrl
  name
  __typename
}
fragment SpeciesAnyListFields on AnySpecies {
  ... on SpeciesBird {
    ...SpeciesListFields
    __typename
  }
  ... on SpeciesBirdFamily {
    ...SpeciesListFields
    __typename
  }
  ... on SpeciesBirdGenus {
    ...SpeciesListFields
    __typename
  }
  ... on SpeciesBirdOrder {
    ...SpeciesListFields
    __typename
  }
  __typename
}"#
    };
}

macro_rules! sighting_report_fields {
    () => {
        r#"
fragment SightingReportFields on SightingReport {
  reportToken
  sightings {
    ... on SightingCantDecideWhichBird {
      ...SightingFields
      suggestions {
        isCollected
        media {
          id
          createdAt
          thumbnailUrl
          __typename
        }
        species {
          id
          description
          name
          iconUrl
          __typename
        }
        __typename
      }
      __typename
    }
    ... on SightingNoBird {
      ...SightingFields
      __typename
    }
    ... on SightingNoBirdRecognized {
      ...SightingFields
      __typename
    }
    ... on SightingRecognizedBird {
      ...SightingFields
      species {
        ...SpeciesAnyListFields
        __typename
      }
      __typename
    }
    ... on SightingRecognizedBirdUnlocked {
      ...SightingFields
      species {
        ...SpeciesAnyListFields
        __typename
      }
      __typename
    }
    ... on SightingRecognizedMysteryVisitor {
      ...SightingFields
      __typename
    }
    __typename
  }
  __typename
}
fragment SightingFields on Sighting {
  id
  matchTokens
  __typename
}"#
    };
}

pub(crate) use {
    feeder_member_fields, feeder_owner_fields, me_fields, media_fields, sighting_report_fields,
    species_fields,
};

#[cfg(test)]
mod tests {
    use birdbuddy_core::Operation;

    use super::*;

    const ALL: &[Operation] = &[
        auth::SIGN_IN,
        auth::REFRESH_AUTH_TOKEN,
        me::ME,
        me::FEED,
        me::COLLECTIONS,
        me::COLLECTIONS_MEDIA,
        birds::POSTCARD_TO_SIGHTING,
        birds::FINISH_SIGHTING,
        birds::SIGHTING_CHOOSE_SPECIES,
        birds::SIGHTING_CHOOSE_MYSTERY,
        birds::SHARE_MEDIAS,
        feeder::TOGGLE_OFF_GRID,
        feeder::TOGGLE_AUDIO_ENABLED,
        feeder::UPDATE_POWER_PROFILE,
        feeder::SET_OPTIONS,
        feeder::UPDATE_FIRMWARE,
        feeder::UPDATE_FIRMWARE_PROGRESS,
    ];

    #[test]
    fn test_documents_declare_their_name() {
        for op in ALL {
            let first = op.summary();
            assert!(
                first.starts_with(&format!("query {}", op.name))
                    || first.starts_with(&format!("mutation {}", op.name)),
                "{} starts with {:?}",
                op.name,
                first
            );
            assert!(op.document.contains(op.root), "{} lacks root {}", op.name, op.root);
        }
    }

    #[test]
    fn test_documents_balanced_braces() {
        for op in ALL {
            let open = op.document.matches('{').count();
            let close = op.document.matches('}').count();
            assert_eq!(open, close, "{}", op.name);
        }
    }

    #[test]
    fn test_fragments_are_defined() {
        for op in ALL {
            for spread in op.document.split("...").skip(1) {
                let name: String = spread
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect();
                if name.is_empty() || name == "on" {
                    continue;
                }
                assert!(
                    op.document.contains(&format!("fragment {} on", name)),
                    "{} uses undefined fragment {}",
                    op.name,
                    name
                );
            }
        }
    }

    #[test]
    fn test_fragments_are_used() {
        for op in ALL {
            for definition in op.document.split("fragment ").skip(1) {
                let name: String = definition
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric())
                    .collect();
                assert!(
                    op.document.contains(&format!("...{}\n", name)),
                    "{} defines unused fragment {}",
                    op.name,
                    name
                );
            }
        }
    }

    #[test]
    fn test_only_credentials_are_sensitive() {
        for op in ALL {
            let expected = op.name == "emailSignIn" || op.name == "authRefreshToken";
            assert_eq!(op.sensitive, expected, "{}", op.name);
        }
    }
}
