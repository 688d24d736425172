// Bonus catalog listings
// Client-facing pair and its search index projection

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlmanaxBonusListing {
    /// Stable slug shared by every language edition.
    pub id: String,
    pub name: String,
}

/// Search document for one listing. `id` is assigned per sync run and is not
/// stable across full rebuilds; clients only ever see the slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlmanaxBonusListingMeili {
    pub id: String,
    pub slug: String,
    pub name: String,
}

impl From<AlmanaxBonusListingMeili> for AlmanaxBonusListing {
    fn from(doc: AlmanaxBonusListingMeili) -> Self {
        Self {
            id: doc.slug,
            name: doc.name,
        }
    }
}
