// Almanax storage entities
// One struct per table, plus the joined composite returned to clients

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::value_objects::Language;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusType {
    pub id: i64,
    pub name_id: String,
    pub name_en: String,
    pub name_fr: String,
    pub name_es: String,
    pub name_de: String,
    pub name_it: String,
    pub name_pt: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl BonusType {
    pub fn name(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.name_en,
            Language::Fr => &self.name_fr,
            Language::Es => &self.name_es,
            Language::De => &self.name_de,
            Language::Pt => &self.name_pt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    pub id: i64,
    pub bonus_type_id: i64,
    pub description_en: String,
    pub description_fr: String,
    pub description_es: String,
    pub description_de: String,
    pub description_it: String,
    pub description_pt: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Bonus {
    pub fn description(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.description_en,
            Language::Fr => &self.description_fr,
            Language::Es => &self.description_es,
            Language::De => &self.description_de,
            Language::Pt => &self.description_pt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tribute {
    pub id: i64,
    pub item_name_en: String,
    pub item_name_fr: String,
    pub item_name_es: String,
    pub item_name_de: String,
    pub item_name_it: String,
    pub item_name_pt: String,
    pub item_icon: String,
    pub item_sd: String,
    pub item_hq: String,
    pub item_hd: String,
    pub item_ankama_id: i64,
    pub item_subtype: String,
    pub item_doduapi_uri: String,
    pub quantity: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Almanax {
    pub id: i64,
    pub bonus_id: i64,
    pub tribute_id: i64,
    /// yyyy-mm-dd
    pub date: String,
    pub reward_kamas: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

/// Denormalized join of one almanax day with its bonus, bonus type and tribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedAlmanax {
    pub almanax: Almanax,
    pub bonus: Bonus,
    pub bonus_type: BonusType,
    pub tribute: Tribute,
}

// Write-side inputs. Ids and timestamps are assigned by the store.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBonusType {
    pub name_id: String,
    pub name_en: String,
    pub name_fr: String,
    pub name_es: String,
    pub name_de: String,
    pub name_it: String,
    pub name_pt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBonus {
    pub bonus_type_id: i64,
    pub description_en: String,
    pub description_fr: String,
    pub description_es: String,
    pub description_de: String,
    pub description_it: String,
    pub description_pt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTribute {
    pub item_name_en: String,
    pub item_name_fr: String,
    pub item_name_es: String,
    pub item_name_de: String,
    pub item_name_it: String,
    pub item_name_pt: String,
    pub item_icon: String,
    pub item_sd: String,
    pub item_hq: String,
    pub item_hd: String,
    pub item_ankama_id: i64,
    pub item_subtype: String,
    pub item_doduapi_uri: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlmanax {
    pub bonus_id: i64,
    pub tribute_id: i64,
    pub date: String,
    pub reward_kamas: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlmanaxUpdate {
    pub id: i64,
    pub bonus_id: i64,
    pub tribute_id: i64,
    pub date: String,
    pub reward_kamas: i64,
}
