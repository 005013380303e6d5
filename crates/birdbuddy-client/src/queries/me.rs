//! Account, feed and collection queries.

use birdbuddy_core::Operation;

use super::{feeder_member_fields, feeder_owner_fields, me_fields, media_fields, species_fields};

pub const ME: Operation = Operation::new(
    "me",
    "me",
    concat!(
        r#"query me {
  me {
    ...MeFields
    __typename
  }
}"#,
        me_fields!(),
        feeder_owner_fields!(),
        feeder_member_fields!()
    ),
);

pub const FEED: Operation = Operation::new(
    "meFeed",
    "me",
    concat!(
        r#"query meFeed($first: Int, $after: String) {
  me {
    feed(first: $first, after: $after) {
      edges {
        cursor
        node {
          id
          createdAt
          ... on FeedItemNewPostcard {
            media {
              ...MediaFullFields
              __typename
            }
            __typename
          }
          ... on FeedItemSpeciesSighting {
            media {
              ...MediaFullFields
              __typename
            }
            collection {
              ...CollectionFields
              __typename
            }
            __typename
          }
          ... on FeedItemSpeciesUnlocked {
            media {
              ...MediaFullFields
              __typename
            }
            collection {
              ...CollectionFields
              __typename
            }
            __typename
          }
          ... on FeedItemMysteryVisitorResolved {
            media {
              ...MediaFullFields
              __typename
            }
            __typename
          }
          __typename
        }
        __typename
      }
      pageInfo {
        hasNextPage
        endCursor
        __typename
      }
      __typename
    }
    __typename
  }
}
fragment CollectionFields on CollectionBird {
  id
  species {
    ...SpeciesAnyListFields
    __typename
  }
  __typename
}"#,
        media_fields!(),
        species_fields!()
    ),
);

pub const COLLECTIONS: Operation = Operation::new(
    "meCollections",
    "me",
    concat!(
        r#"query meCollections {
  me {
    collections {
      ... on CollectionBird {
        ...CollectionMainListFields
        species {
          ...SpeciesAnyListFields
          __typename
        }
        __typename
      }
      ... on CollectionMysteryVisitor {
        ...CollectionMainListFields
        __typename
      }
      __typename
    }
    __typename
  }
}
fragment CollectionMainListFields on Collection {
  id
  coverCollectionMedia {
    ...CollectionMediaFields
    __typename
  }
  visitsAllTime
  visitLastTime
  __typename
}
fragment CollectionMediaFields on CollectionMedia {
  id
  feederName
  liked
  isShared
  media {
    ...MediaFullFields
    __typename
  }
  __typename
}"#,
        media_fields!(),
        species_fields!()
    ),
);

pub const COLLECTIONS_MEDIA: Operation = Operation::new(
    "meCollectionsMedia",
    "collection",
    concat!(
        r#"query meCollectionsMedia($collectionId: ID!, $first: Int, $after: String) {
  collection(collectionId: $collectionId) {
    ... on CollectionBird {
      id
      media(first: $first, after: $after) {
        ...CollectionMediaConnectionFields
      }
    }
    ... on CollectionMysteryVisitor {
      id
      media(first: $first, after: $after) {
        ...CollectionMediaConnectionFields
      }
    }
  }
}
fragment CollectionMediaConnectionFields on CollectionMediaConnection {
  edges {
    node {
      id
      feederName
      liked
      isShared
      media {
        ...MediaFullFields
        __typename
      }
    }
  }
  pageInfo {
    hasNextPage
    endCursor
  }
}"#,
        media_fields!()
    ),
);
