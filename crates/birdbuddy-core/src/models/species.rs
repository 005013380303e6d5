use serde::{Deserialize, Serialize};

/// Type tag of a concrete bird species.
const SPECIES_BIRD: &str = "SpeciesBird";

/// A bird species (or family/genus/order) known to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    /// Species id, also used as the species code in confidence reports.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    /// `SpeciesBird`, `SpeciesBirdFamily`, `SpeciesBirdGenus`, ...
    #[serde(rename = "__typename", default)]
    pub kind: Option<String>,
}

impl Species {
    /// Whether this is a concrete bird species rather than a broader taxon.
    pub fn is_bird(&self) -> bool {
        self.kind.as_deref() == Some(SPECIES_BIRD)
    }
}
