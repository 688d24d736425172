use crate::entities::{AlmanaxBonusListing, AlmanaxBonusListingMeili};

/// Turns a fetched listing into search documents. Surrogate ids count up from
/// `first_id` in listing order and are independent of the slug.
pub fn project_listings(
    listings: &[AlmanaxBonusListing],
    first_id: u64,
) -> Vec<AlmanaxBonusListingMeili> {
    listings
        .iter()
        .zip(first_id..)
        .map(|(listing, id)| AlmanaxBonusListingMeili {
            id: id.to_string(),
            slug: listing.id.clone(),
            name: listing.name.clone(),
        })
        .collect()
}

/// True when any of the returned hits carries exactly `name`.
pub fn has_identical_hit(hits: &[AlmanaxBonusListingMeili], name: &str) -> bool {
    hits.iter().any(|hit| hit.name == name)
}
