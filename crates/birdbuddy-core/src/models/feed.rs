use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, Collection, Media};

server_enum! {
    /// Known feed node types.
    pub enum FeedNodeType ("feed type") {
        GlobalImportant => "FeedGlobalImportantItem",
        GlobalRegular => "FeedGlobalRegularItem",
        InvitationConfirmed => "FeedItemFeederInvitationConfirmed",
        InvitationDeclined => "FeedItemFeederInvitationDeclined",
        MemberDeleted => "FeedItemFeederMemberDeleted",
        MediaLiked => "FeedItemMediaLiked",
        MysteryVisitorNotRecognized => "FeedItemMysteryVisitorNotRecognized",
        MysteryVisitorResolved => "FeedItemMysteryVisitorResolved",
        NewPostcard => "FeedItemNewPostcard",
        SpeciesSighting => "FeedItemSpeciesSighting",
        SpeciesUnlocked => "FeedItemSpeciesUnlocked",
    }
}

/// Parse a GraphQL timestamp such as `2023-01-15T12:30:45.123Z`.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// A single feed item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedNode {
    /// Feed item id; for postcards this is the `feedItemId`.
    pub id: String,
    #[serde(rename = "__typename")]
    pub node_type: FeedNodeType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub media: Option<Media>,
    #[serde(default)]
    pub collection: Option<Collection>,
}

/// A feed edge: a node plus its pagination cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEdge {
    #[serde(default)]
    pub cursor: Option<String>,
    pub node: FeedNode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    /// Cursor for the next (older) page.
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One page of the account feed, most recent items first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<FeedEdge>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_info: PageInfo,
}

impl Feed {
    /// All nodes of the feed edges.
    pub fn nodes(&self) -> impl Iterator<Item = &FeedNode> {
        self.edges.iter().map(|edge| &edge.node)
    }

    /// The cursor used to access the next (older) page.
    pub fn page_end_cursor(&self) -> Option<&str> {
        self.page_info.end_cursor.as_deref()
    }

    /// The edge whose node was created most recently.
    pub fn newest_edge(&self) -> Option<&FeedEdge> {
        self.edges.iter().max_by_key(|edge| edge.node.created_at)
    }

    /// Nodes matching any of `of_types` (all types when empty) and created
    /// strictly after `newer_than` (any time when `None`).
    pub fn filter(
        &self,
        of_types: &[FeedNodeType],
        newer_than: Option<DateTime<Utc>>,
    ) -> Vec<FeedNode> {
        self.nodes()
            .filter(|node| of_types.is_empty() || of_types.contains(&node.node_type))
            .filter(|node| newer_than.map_or(true, |since| node.created_at > since))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_feed() -> Feed {
        serde_json::from_value(json!({
            "edges": [
                {
                    "cursor": "c1",
                    "node": {
                        "id": "n1",
                        "__typename": "FeedItemNewPostcard",
                        "createdAt": "2023-01-15T12:30:45.123Z"
                    }
                },
                {
                    "cursor": "c2",
                    "node": {
                        "id": "n2",
                        "__typename": "FeedItemSpeciesSighting",
                        "createdAt": "2023-01-16T08:00:00.000Z"
                    }
                },
                {
                    "cursor": "c3",
                    "node": {
                        "id": "n3",
                        "__typename": "FeedItemSomethingNew",
                        "createdAt": "2023-01-14T08:00:00.000Z"
                    }
                }
            ],
            "pageInfo": {"hasNextPage": true, "endCursor": "c3"}
        }))
        .unwrap()
    }

    #[test]
    fn test_feed_parse_unknown_type() {
        let feed = sample_feed();
        assert_eq!(feed.edges.len(), 3);
        assert_eq!(
            feed.edges[2].node.node_type,
            FeedNodeType::Unknown("FeedItemSomethingNew".to_string())
        );
        assert_eq!(feed.page_end_cursor(), Some("c3"));
    }

    #[test]
    fn test_newest_edge() {
        let feed = sample_feed();
        assert_eq!(feed.newest_edge().map(|e| e.node.id.as_str()), Some("n2"));
        assert!(Feed::default().newest_edge().is_none());
    }

    #[test]
    fn test_filter_by_type() {
        let feed = sample_feed();
        let postcards = feed.filter(&[FeedNodeType::NewPostcard], None);
        assert_eq!(postcards.len(), 1);
        assert_eq!(postcards[0].id, "n1");
        assert_eq!(feed.filter(&[], None).len(), 3);
    }

    #[test]
    fn test_filter_newer_than_is_strict() {
        let feed = sample_feed();
        let since = parse_datetime("2023-01-15T12:30:45.123Z").unwrap();
        let newer = feed.filter(&[], Some(since));
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].id, "n2");
    }

    #[test]
    fn test_null_edges() {
        let feed: Feed = serde_json::from_value(json!({"edges": null})).unwrap();
        assert!(feed.edges.is_empty());
    }
}
