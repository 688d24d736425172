// Release asset records
// Shape of the mapped almanax file published with each data release

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedMultilangNpcAlmanax {
    #[serde(default)]
    pub offering_receiver: String,
    #[serde(default)]
    pub days: Vec<String>,
    pub offering: MappedMultilangOffering,
    /// Bonus description keyed by language code.
    #[serde(default)]
    pub bonus: HashMap<String, String>,
    pub bonus_type: MappedMultilangBonusType,
    #[serde(default)]
    pub reward_kamas: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedMultilangOffering {
    pub item_id: i64,
    #[serde(default)]
    pub item_name: HashMap<String, String>,
    #[serde(default)]
    pub item_subtype: String,
    pub quantity: i64,
    #[serde(default)]
    pub image_urls: ImageUrls,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageUrls {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sd: String,
    #[serde(default)]
    pub hq: String,
    #[serde(default)]
    pub hd: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedMultilangBonusType {
    /// Language independent slug.
    pub id: String,
    #[serde(default)]
    pub name: HashMap<String, String>,
}

/// Looks up a localized value, falling back to english and then to an empty string.
pub fn localized(values: &HashMap<String, String>, lang: &str) -> String {
    values
        .get(lang)
        .or_else(|| values.get("en"))
        .cloned()
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
}
