use async_trait::async_trait;

use crate::entities::{
    AlmanaxUpdate,
    BonusType,
    MappedAlmanax,
    NewAlmanax,
    NewBonus,
    NewBonusType,
    NewTribute,
};
use crate::errors::RepositoryResult;

#[async_trait]
pub trait AlmanaxRepository: Send + Sync {
    /// Non-deleted days in `[from, to]`, ascending by date.
    async fn get_by_date_range(&self, from: &str, to: &str) -> RepositoryResult<Vec<MappedAlmanax>>;
    async fn get_by_date_range_and_bonus_slug(
        &self,
        from: &str,
        to: &str,
        slug: &str,
    ) -> RepositoryResult<Vec<MappedAlmanax>>;
    /// Whether `date` has a non-deleted almanax row, whatever the state of
    /// its bonus or tribute.
    async fn has_live_almanax(&self, date: &str) -> RepositoryResult<bool>;
    async fn create(&self, almanax: &NewAlmanax) -> RepositoryResult<i64>;
    async fn update(&self, almanax: &AlmanaxUpdate) -> RepositoryResult<()>;

    async fn create_bonus_type(&self, bonus_type: &NewBonusType) -> RepositoryResult<i64>;
    async fn list_bonus_types(&self) -> RepositoryResult<Vec<BonusType>>;
    async fn find_bonus_type_id(&self, slug: &str) -> RepositoryResult<Option<i64>>;
    async fn create_bonus(&self, bonus: &NewBonus) -> RepositoryResult<i64>;
    async fn create_tribute(&self, tribute: &NewTribute) -> RepositoryResult<i64>;

    async fn ping(&self) -> RepositoryResult<()>;
}
